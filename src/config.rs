//! Runtime settings, loadable from a JSON file with serde defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::queue::RetryPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Worker pool size. Defaults to the CPU count clamped to 3..=5.
    pub worker_count: usize,
    /// Maximum deliveries per job.
    pub max_attempts: u32,
    /// Base delay for exponential backoff before redelivery.
    pub backoff_base_ms: u64,
    /// Simulated recognition latency.
    pub recognition_latency_ms: u64,
    /// Database file path. `None` selects the in-memory store.
    pub database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_attempts: 3,
            backoff_base_ms: 1000,
            recognition_latency_ms: 500,
            database_path: None,
        }
    }
}

fn default_worker_count() -> usize {
    num_cpus::get().clamp(3, 5)
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let settings: Settings = serde_json::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::Validation {
                message: "worker_count must be greater than 0".to_string(),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Validation {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.backoff_base_ms),
        )
    }

    pub fn recognition_latency(&self) -> Duration {
        Duration::from_millis(self.recognition_latency_ms)
    }
}
