//! Transport-level job and retry policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One delivery unit referencing a document and its raw input.
///
/// A job is created once per document submission and stays the same logical
/// job across retries: redelivery bumps `attempt` and keeps `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub document_id: String,
    /// Input payload, immutable once enqueued.
    pub raw_text: String,
    /// 1-based delivery counter.
    pub attempt: u32,
    pub max_attempts: u32,
}

impl Job {
    pub fn new(
        document_id: impl Into<String>,
        raw_text: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            raw_text: raw_text.into(),
            attempt: 1,
            max_attempts,
        }
    }

    /// The same logical job, one delivery later in the retry series.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// Bounded-retry policy: at most `max_attempts` deliveries per job, with
/// exponential backoff from `base_delay` before each redelivery.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before redelivering after the given (1-based) attempt failed:
    /// `base * 2^(attempt - 1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(2u32.saturating_pow(exp))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }
}
