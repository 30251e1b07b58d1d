//! Service surface over the store and the queue: submit, status query,
//! listing and health. Request parsing and response shaping beyond these
//! contracts belong to whatever transport embeds the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{document_repo, Database, DatabaseError};
use crate::document::{Document, DocumentStatus};
use crate::error::WorkerError;
use crate::queue::JobQueue;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Document {0} not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] DatabaseError),

    #[error("Queue unavailable: {0}")]
    Queue(#[from] WorkerError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub document_id: String,
    pub status: DocumentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_processed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct DocumentService {
    db: Database,
    queue: JobQueue,
}

impl DocumentService {
    pub fn new(db: Database, queue: JobQueue) -> Self {
        Self { db, queue }
    }

    /// Creates the document record and enqueues its processing job.
    pub fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, ApiError> {
        if request.text.is_empty() {
            return Err(ApiError::BadRequest("Text content is required".to_string()));
        }

        let filename = request
            .filename
            .unwrap_or_else(|| "document.txt".to_string());
        let document = Document::new(filename);
        document_repo::insert(&self.db, &document)?;
        self.queue.enqueue(&document.id, &request.text)?;

        log::info!("Document {} queued for processing", document.id);

        Ok(SubmitResponse {
            document_id: document.id,
            status: DocumentStatus::Uploaded,
            message: "Document uploaded and queued for processing".to_string(),
        })
    }

    /// Returns the latest durably written state of a document.
    pub fn status(&self, id: &str) -> Result<Document, ApiError> {
        document_repo::find_by_id(&self.db, id)?
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    /// All documents, most recently created first.
    pub fn list(&self) -> Result<Vec<Document>, ApiError> {
        Ok(document_repo::list_all(&self.db)?)
    }

    /// Reports unhealthy when the store is unreachable.
    pub fn health(&self) -> Health {
        match document_repo::count(&self.db) {
            Ok(count) => Health {
                status: "healthy",
                timestamp: Utc::now(),
                documents_processed: Some(count),
                error: None,
            },
            Err(e) => {
                log::error!("Health check failed: {}", e);
                Health {
                    status: "unhealthy",
                    timestamp: Utc::now(),
                    documents_processed: None,
                    error: Some("Database connection failed".to_string()),
                }
            }
        }
    }
}
