//! Document repository: CRUD and status-transition writes for the
//! `documents` table.
//!
//! Every transition is a single UPDATE, so stage outputs are written whole
//! or not at all. `mark_dead_lettered` is idempotent: a second finalize
//! cannot overwrite an already recorded failure reason.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::document::{Document, DocumentStatus, InvoiceMetadata, RecognitionResult};

use super::{Database, DatabaseError};

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

fn parse_status(s: &str, document_id: &str) -> DocumentStatus {
    DocumentStatus::parse(s).unwrap_or_else(|| {
        log::warn!(
            "Unknown document status '{}' for document {}, defaulting to FAILED",
            s,
            document_id
        );
        DocumentStatus::Failed
    })
}

fn parse_json<T: serde::de::DeserializeOwned>(
    column: &str,
    document_id: &str,
    value: Option<String>,
) -> Option<T> {
    let raw = value?;
    match serde_json::from_str(&raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!(
                "Invalid JSON in column '{}' for document {}: {}",
                column,
                document_id,
                e
            );
            None
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Failed to serialize column value: {}", e);
            None
        }
    }
}

fn from_row(row: &Row<'_>) -> Result<Document, rusqlite::Error> {
    let id: String = row.get("id")?;
    let status: String = row.get("status")?;
    let metadata: Option<String> = row.get("metadata")?;
    let recognition: Option<String> = row.get("recognition_result")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Document {
        filename: row.get("filename")?,
        status: parse_status(&status, &id),
        metadata: parse_json::<InvoiceMetadata>("metadata", &id, metadata),
        recognition_result: parse_json::<RecognitionResult>("recognition_result", &id, recognition),
        failure_reason: row.get("failure_reason")?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
        id,
    })
}

/// Inserts a new document row.
pub fn insert(db: &Database, document: &Document) -> Result<(), DatabaseError> {
    let conn = db.lock()?;
    conn.execute(
        "INSERT INTO documents (id, filename, status, metadata, recognition_result,
         failure_reason, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            document.id,
            document.filename,
            document.status.as_str(),
            document.metadata.as_ref().and_then(to_json),
            document.recognition_result.as_ref().and_then(to_json),
            document.failure_reason,
            document.created_at.to_rfc3339(),
            document.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Finds a document by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Document>, DatabaseError> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], from_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Lists all documents, most recently created first.
pub fn list_all(db: &Database) -> Result<Vec<Document>, DatabaseError> {
    let conn = db.lock()?;
    let mut stmt = conn.prepare("SELECT * FROM documents ORDER BY created_at DESC")?;
    let documents = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(documents)
}

/// Counts all document rows.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    let conn = db.lock()?;
    let count = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    Ok(count)
}

/// Claims a document for processing. Returns false when no row with the
/// given id exists (a transport/storage desynchronization).
pub fn mark_processing(
    db: &Database,
    id: &str,
    updated_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let conn = db.lock()?;
    let affected = conn.execute(
        "UPDATE documents SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![
            id,
            DocumentStatus::Processing.as_str(),
            updated_at.to_rfc3339()
        ],
    )?;
    Ok(affected > 0)
}

/// Records a successful pipeline run: status, extraction output and
/// recognition output land in one write.
pub fn mark_validated(
    db: &Database,
    id: &str,
    metadata: &InvoiceMetadata,
    recognition: &RecognitionResult,
    updated_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let conn = db.lock()?;
    conn.execute(
        "UPDATE documents SET status = ?2, metadata = ?3, recognition_result = ?4,
         updated_at = ?5 WHERE id = ?1",
        params![
            id,
            DocumentStatus::Validated.as_str(),
            to_json(metadata),
            to_json(recognition),
            updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Records a failed attempt. Does not touch `failure_reason`, so the row
/// stays transient until the coordinator finalizes it. Stage outputs from
/// the failing attempt are kept when available.
pub fn mark_failed(
    db: &Database,
    id: &str,
    metadata: Option<&InvoiceMetadata>,
    recognition: Option<&RecognitionResult>,
    updated_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    let conn = db.lock()?;
    match (metadata, recognition) {
        (None, None) => {
            conn.execute(
                "UPDATE documents SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![
                    id,
                    DocumentStatus::Failed.as_str(),
                    updated_at.to_rfc3339()
                ],
            )?;
        }
        (metadata, recognition) => {
            conn.execute(
                "UPDATE documents SET status = ?2, metadata = ?3, recognition_result = ?4,
                 updated_at = ?5 WHERE id = ?1",
                params![
                    id,
                    DocumentStatus::Failed.as_str(),
                    metadata.and_then(to_json),
                    recognition.and_then(to_json),
                    updated_at.to_rfc3339(),
                ],
            )?;
        }
    }
    Ok(())
}

/// Terminal failure write. `COALESCE` keeps the first recorded reason if a
/// redelivery somehow finalizes the same document twice.
pub fn mark_dead_lettered(
    db: &Database,
    id: &str,
    failure_reason: &str,
    updated_at: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let conn = db.lock()?;
    let affected = conn.execute(
        "UPDATE documents SET status = ?2, failure_reason = COALESCE(failure_reason, ?3),
         updated_at = ?4 WHERE id = ?1",
        params![
            id,
            DocumentStatus::Failed.as_str(),
            failure_reason,
            updated_at.to_rfc3339(),
        ],
    )?;
    Ok(affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn test_db() -> Database {
        Database::open_in_memory().expect("Failed to create test database")
    }

    fn sample_metadata() -> InvoiceMetadata {
        InvoiceMetadata {
            invoice_number: Some("INV-001".to_string()),
            customer: Some("Acme Corp".to_string()),
            amount: 150.0,
        }
    }

    fn sample_recognition() -> RecognitionResult {
        RecognitionResult {
            text: "Invoice #INV-001".to_string(),
            confidence: 0.98,
            language: "en".to_string(),
        }
    }

    #[test]
    fn test_insert_and_find() {
        let db = test_db();
        let doc = Document::new("test.txt");
        insert(&db, &doc).unwrap();

        let found = find_by_id(&db, &doc.id).unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.filename, "test.txt");
        assert_eq!(found.status, DocumentStatus::Uploaded);
        assert!(found.metadata.is_none());
    }

    #[test]
    fn test_find_nonexistent() {
        let db = test_db();
        let found = find_by_id(&db, "nonexistent").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_list_all_newest_first() {
        let db = test_db();
        for i in 0..3 {
            let mut doc = Document::new(format!("doc{}.txt", i));
            doc.created_at = parse_timestamp(&format!("2026-01-0{}T00:00:00Z", i + 1));
            insert(&db, &doc).unwrap();
        }

        let docs = list_all(&db).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].filename, "doc2.txt");
        assert_eq!(docs[2].filename, "doc0.txt");
    }

    #[test]
    fn test_count() {
        let db = test_db();
        assert_eq!(count(&db).unwrap(), 0);
        insert(&db, &Document::new("a.txt")).unwrap();
        insert(&db, &Document::new("b.txt")).unwrap();
        assert_eq!(count(&db).unwrap(), 2);
    }

    #[test]
    fn test_mark_processing() {
        let db = test_db();
        let doc = Document::new("a.txt");
        insert(&db, &doc).unwrap();

        assert!(mark_processing(&db, &doc.id, Utc::now()).unwrap());
        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Processing);
    }

    #[test]
    fn test_mark_processing_missing_row() {
        let db = test_db();
        assert!(!mark_processing(&db, "ghost", Utc::now()).unwrap());
    }

    #[test]
    fn test_mark_validated_writes_all_fields_together() {
        let db = test_db();
        let doc = Document::new("a.txt");
        insert(&db, &doc).unwrap();

        mark_validated(
            &db,
            &doc.id,
            &sample_metadata(),
            &sample_recognition(),
            Utc::now(),
        )
        .unwrap();

        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Validated);
        let metadata = found.metadata.unwrap();
        assert_eq!(metadata.invoice_number.as_deref(), Some("INV-001"));
        assert_eq!(metadata.amount, 150.0);
        let recognition = found.recognition_result.unwrap();
        assert_eq!(recognition.confidence, 0.98);
        assert_eq!(recognition.language, "en");
    }

    #[test]
    fn test_mark_failed_is_transient() {
        let db = test_db();
        let doc = Document::new("a.txt");
        insert(&db, &doc).unwrap();

        mark_failed(&db, &doc.id, None, None, Utc::now()).unwrap();

        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Failed);
        assert!(found.failure_reason.is_none());
        // A retry claims the document again.
        assert!(mark_processing(&db, &doc.id, Utc::now()).unwrap());
        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Processing);
    }

    #[test]
    fn test_mark_failed_keeps_stage_outputs() {
        let db = test_db();
        let doc = Document::new("a.txt");
        insert(&db, &doc).unwrap();

        mark_failed(
            &db,
            &doc.id,
            Some(&sample_metadata()),
            Some(&sample_recognition()),
            Utc::now(),
        )
        .unwrap();

        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Failed);
        assert!(found.metadata.is_some());
        assert!(found.recognition_result.is_some());
    }

    #[test]
    fn test_mark_dead_lettered_is_idempotent() {
        let db = test_db();
        let doc = Document::new("a.txt");
        insert(&db, &doc).unwrap();

        assert!(mark_dead_lettered(&db, &doc.id, "first reason", Utc::now()).unwrap());
        assert!(mark_dead_lettered(&db, &doc.id, "second reason", Utc::now()).unwrap());

        let found = find_by_id(&db, &doc.id).unwrap().unwrap();
        assert_eq!(found.status, DocumentStatus::Failed);
        assert_eq!(found.failure_reason.as_deref(), Some("first reason"));
    }

    #[test]
    fn test_mark_dead_lettered_missing_row() {
        let db = test_db();
        assert!(!mark_dead_lettered(&db, "ghost", "reason", Utc::now()).unwrap());
    }
}
