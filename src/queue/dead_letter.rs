//! Dead-letter record emitted when a job is terminally failed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::DocumentStatus;

/// The payload the job carried, preserved for offline inspection or replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPayload {
    pub document_id: String,
    pub text: String,
}

/// Emitted once per terminally failed job. Not a queryable API; consumed
/// from the dead-letter channel or read from the structured log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterRecord {
    pub document_id: String,
    pub job_id: String,
    pub final_error: String,
    pub total_attempts: u32,
    pub max_attempts: u32,
    /// Document status observed just before finalization. `None` when the
    /// document row was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<DocumentStatus>,
    pub job_payload: JobPayload,
    /// Document creation time, when the row existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub failed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let record = DeadLetterRecord {
            document_id: "d1".to_string(),
            job_id: "j1".to_string(),
            final_error: "Recognition failed: boom".to_string(),
            total_attempts: 3,
            max_attempts: 3,
            previous_state: Some(DocumentStatus::Failed),
            job_payload: JobPayload {
                document_id: "d1".to_string(),
                text: "raw".to_string(),
            },
            created_at: None,
            failed_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"documentId\":\"d1\""));
        assert!(json.contains("\"finalError\""));
        assert!(json.contains("\"totalAttempts\":3"));
        assert!(json.contains("\"previousState\":\"FAILED\""));
        assert!(json.contains("\"jobPayload\""));
        assert!(!json.contains("createdAt"));
    }
}
