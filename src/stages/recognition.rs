//! Recognition stage.
//!
//! Turns raw input into recognized text with a confidence score and a
//! language tag. The trait is async: a real recognizer spends noticeable
//! time per document, and the pipeline suspends here.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::document::RecognitionResult;

/// Errors from the recognition stage. The pipeline treats these as
/// retryable.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("Unreadable input: {0}")]
    Unreadable(String),

    #[error("Recognizer backend failed: {0}")]
    Backend(String),
}

/// A text recognizer. Implementations may suspend for a bounded duration.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError>;
}

const SIMULATED_CONFIDENCE: f64 = 0.98;
const SIMULATED_LANGUAGE: &str = "en";

/// Deterministic stand-in for a real recognizer: sleeps for a configurable
/// latency, then passes the input text through unchanged.
pub struct SimulatedRecognizer {
    latency: Duration,
}

impl SimulatedRecognizer {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    /// Zero-latency variant for tests and synchronous-ish callers.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SimulatedRecognizer {
    fn default() -> Self {
        // Mirrors the latency of a small real recognizer run.
        Self::new(Duration::from_millis(500))
    }
}

#[async_trait]
impl Recognizer for SimulatedRecognizer {
    async fn recognize(&self, text: &str) -> Result<RecognitionResult, RecognitionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(RecognitionResult {
            text: text.to_string(),
            confidence: SIMULATED_CONFIDENCE,
            language: SIMULATED_LANGUAGE.to_string(),
        })
    }
}
