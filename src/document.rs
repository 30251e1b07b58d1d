//! The document model tracked through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a document.
///
/// Transitions are monotonic along `Uploaded → Processing → {Validated | Failed}`.
/// A `Failed` row with no `failure_reason` is transient: the next retry
/// attempt overwrites it with `Processing`. Once `failure_reason` is set the
/// document is terminally failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Validated,
    Failed,
}

impl DocumentStatus {
    /// Wire/database representation, matching the JSON serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Uploaded => "UPLOADED",
            DocumentStatus::Processing => "PROCESSING",
            DocumentStatus::Validated => "VALIDATED",
            DocumentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPLOADED" => Some(DocumentStatus::Uploaded),
            "PROCESSING" => Some(DocumentStatus::Processing),
            "VALIDATED" => Some(DocumentStatus::Validated),
            "FAILED" => Some(DocumentStatus::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields extracted from recognized text.
///
/// Always fully populated: missing markers leave the optional fields `None`
/// and `amount` at zero, never a partially written record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceMetadata {
    pub invoice_number: Option<String>,
    pub customer: Option<String>,
    pub amount: f64,
}

/// Output of the recognition stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    /// Recognized text content.
    pub text: String,
    /// Recognizer confidence in `[0, 1]`.
    pub confidence: f64,
    /// Detected language code (e.g. "en").
    pub language: String,
}

/// A document record as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique document identifier (UUID), assigned at creation.
    pub id: String,
    /// Display filename, immutable after creation.
    pub filename: String,
    pub status: DocumentStatus,
    /// Extraction output; written whole on reaching `Validated` (or on a
    /// validation failure, so the failing attempt stays inspectable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InvoiceMetadata>,
    /// Recognition output, written together with `metadata`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognition_result: Option<RecognitionResult>,
    /// Set only when the document is terminally failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a fresh record in the `Uploaded` state.
    pub fn new(filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            filename: filename.into(),
            status: DocumentStatus::Uploaded,
            metadata: None,
            recognition_result: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once the document can no longer change status.
    pub fn is_terminal(&self) -> bool {
        match self.status {
            DocumentStatus::Validated => true,
            DocumentStatus::Failed => self.failure_reason.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DocumentStatus::Uploaded,
            DocumentStatus::Processing,
            DocumentStatus::Validated,
            DocumentStatus::Failed,
        ] {
            assert_eq!(DocumentStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(DocumentStatus::parse("uploaded"), None);
        assert_eq!(DocumentStatus::parse(""), None);
    }

    #[test]
    fn test_status_serde_uses_wire_names() {
        let json = serde_json::to_string(&DocumentStatus::Validated).unwrap();
        assert_eq!(json, "\"VALIDATED\"");
        let parsed: DocumentStatus = serde_json::from_str("\"PROCESSING\"").unwrap();
        assert_eq!(parsed, DocumentStatus::Processing);
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new("invoice.txt");
        assert!(!doc.id.is_empty());
        assert_eq!(doc.filename, "invoice.txt");
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert!(doc.metadata.is_none());
        assert!(doc.recognition_result.is_none());
        assert!(doc.failure_reason.is_none());
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[test]
    fn test_document_json_is_camel_case() {
        let mut doc = Document::new("a.txt");
        doc.metadata = Some(InvoiceMetadata {
            invoice_number: Some("INV-001".to_string()),
            customer: Some("Acme Corp".to_string()),
            amount: 150.0,
        });
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"invoiceNumber\":\"INV-001\""));
        assert!(json.contains("\"createdAt\""));
        // Unset optional fields are omitted entirely.
        assert!(!json.contains("failureReason"));
        assert!(!json.contains("recognitionResult"));
    }

    #[test]
    fn test_is_terminal() {
        let mut doc = Document::new("a.txt");
        assert!(!doc.is_terminal());
        doc.status = DocumentStatus::Failed;
        assert!(!doc.is_terminal(), "FAILED without reason is transient");
        doc.failure_reason = Some("gone".to_string());
        assert!(doc.is_terminal());
        doc.status = DocumentStatus::Validated;
        assert!(doc.is_terminal());
    }
}
