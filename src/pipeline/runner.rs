//! Runs one document's pipeline to completion or failure.
//!
//! Storage writes happen at four points only: the initial PROCESSING claim,
//! the VALIDATED success write, the FAILED validation write, and the
//! best-effort FAILED write before re-signaling a stage error. Each is a
//! single UPDATE.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info_span, Instrument};

use crate::db::{document_repo, Database};
use crate::document::{InvoiceMetadata, RecognitionResult};
use crate::queue::Job;
use crate::stages::{validate, MetadataExtractor, Recognizer};

use super::error::PipelineError;

pub struct Pipeline {
    db: Database,
    recognizer: Arc<dyn Recognizer>,
    extractor: MetadataExtractor,
}

impl Pipeline {
    pub fn new(db: Database, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            db,
            recognizer,
            extractor: MetadataExtractor::new(),
        }
    }

    /// Executes Recognition → Extraction → Validation for one job, updating
    /// document status at each boundary. Errors propagate to the coordinator
    /// for the retry-vs-terminal decision.
    pub async fn run(&self, job: &Job) -> Result<(), PipelineError> {
        let span = info_span!(
            "pipeline",
            job_id = %job.id,
            document_id = %job.document_id,
            attempt = job.attempt,
        );
        self.execute(job).instrument(span).await
    }

    async fn execute(&self, job: &Job) -> Result<(), PipelineError> {
        // Step 1: claim the document. A missing row means the transport and
        // the store disagree, which is fatal for this job, not transient.
        if !document_repo::mark_processing(&self.db, &job.document_id, Utc::now())? {
            return Err(PipelineError::NotFound(job.document_id.clone()));
        }
        log::debug!("Processing started for document {}", job.document_id);

        // Step 2: recognition, the only suspension point.
        let recognition = {
            let span = info_span!("recognize");
            match self
                .recognizer
                .recognize(&job.raw_text)
                .instrument(span)
                .await
            {
                Ok(recognition) => recognition,
                Err(e) => {
                    self.record_failure(&job.document_id, None, None);
                    return Err(e.into());
                }
            }
        };

        // Steps 3 and 4 are synchronous and pure.
        let metadata = {
            let _step = info_span!("extract").entered();
            self.extractor.extract(&recognition.text)
        };
        let outcome = {
            let _step = info_span!("validate").entered();
            validate(&metadata)
        };

        if outcome.is_valid {
            if let Err(e) = document_repo::mark_validated(
                &self.db,
                &job.document_id,
                &metadata,
                &recognition,
                Utc::now(),
            ) {
                self.record_failure(&job.document_id, Some(&metadata), Some(&recognition));
                return Err(e.into());
            }
            log::info!("Document {} validated", job.document_id);
            Ok(())
        } else {
            // Content defect. The failing attempt's extraction stays
            // readable; failure_reason is the coordinator's to write.
            document_repo::mark_failed(
                &self.db,
                &job.document_id,
                Some(&metadata),
                Some(&recognition),
                Utc::now(),
            )?;
            let joined = outcome.errors.join(", ");
            log::info!(
                "Document {} failed validation: {}",
                job.document_id,
                joined
            );
            Err(PipelineError::Validation(joined))
        }
    }

    /// Best-effort FAILED write before re-signaling the underlying error.
    fn record_failure(
        &self,
        document_id: &str,
        metadata: Option<&InvoiceMetadata>,
        recognition: Option<&RecognitionResult>,
    ) {
        if let Err(e) =
            document_repo::mark_failed(&self.db, document_id, metadata, recognition, Utc::now())
        {
            log::warn!(
                "Failed to record FAILED status for document {}: {}",
                document_id,
                e
            );
        }
    }
}
