use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The job referenced a document id with no row behind it, a
    /// transport/storage desynchronization. Fatal for the job.
    #[error("Document {0} not found")]
    NotFound(String),

    /// Extracted content failed the business rules. Carries the joined
    /// error messages.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Recognition failed: {0}")]
    Recognition(#[from] crate::stages::RecognitionError),

    #[error("Storage failed: {0}")]
    Storage(#[from] crate::db::DatabaseError),
}

impl PipelineError {
    /// Whether another attempt can plausibly change the outcome.
    ///
    /// Validation failures are deterministic (same payload, same extraction,
    /// same errors) and are not retried. A missing document row cannot heal
    /// by retrying either.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Recognition(_) | PipelineError::Storage(_) => true,
            PipelineError::NotFound(_) | PipelineError::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::RecognitionError;

    #[test]
    fn test_retryability_classification() {
        assert!(!PipelineError::NotFound("d1".into()).is_retryable());
        assert!(!PipelineError::Validation("Missing customer".into()).is_retryable());
        assert!(
            PipelineError::Recognition(RecognitionError::Backend("boom".into())).is_retryable()
        );
        assert!(PipelineError::Storage(crate::db::DatabaseError::LockPoisoned).is_retryable());
    }
}
