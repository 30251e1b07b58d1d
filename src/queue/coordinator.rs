//! Retry/dead-letter coordinator.
//!
//! Wraps pipeline execution and classifies every failed attempt as
//! retryable or terminal. It is the single place that decides
//! retry-vs-terminal and the only writer of `failure_reason`. The backoff
//! wait itself belongs to the transport.

use chrono::Utc;
use crossbeam_channel::Sender;

use crate::db::{document_repo, Database};
use crate::pipeline::{Pipeline, PipelineError};

use super::dead_letter::{DeadLetterRecord, JobPayload};
use super::job::Job;

/// Outcome of one delivery in a job's attempt series.
///
/// The series runs `Pending → Attempting → {Succeeded | RetryScheduled →
/// Attempting | DeadLettered}`; `Succeeded` and `DeadLettered` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Succeeded,
    /// The transport should redeliver after the backoff delay.
    RetryScheduled,
    DeadLettered,
}

pub struct Coordinator {
    pipeline: Pipeline,
    db: Database,
    dead_letters: Option<Sender<DeadLetterRecord>>,
}

impl Coordinator {
    pub fn new(pipeline: Pipeline, db: Database) -> Self {
        Self {
            pipeline,
            db,
            dead_letters: None,
        }
    }

    /// Wires a channel that receives every emitted dead-letter record.
    pub fn with_dead_letter_sink(mut self, sink: Sender<DeadLetterRecord>) -> Self {
        self.dead_letters = Some(sink);
        self
    }

    /// Runs one attempt and classifies the result.
    pub async fn process(&self, job: &Job) -> AttemptOutcome {
        log::debug!(
            "Attempt {}/{} for document {}",
            job.attempt,
            job.max_attempts,
            job.document_id
        );

        match self.pipeline.run(job).await {
            Ok(()) => AttemptOutcome::Succeeded,
            Err(e) if e.is_retryable() && !job.attempts_exhausted() => {
                // The transient FAILED row is overwritten by the next
                // attempt's PROCESSING claim.
                log::warn!(
                    "Attempt {}/{} failed for document {}: {}, retry scheduled",
                    job.attempt,
                    job.max_attempts,
                    job.document_id,
                    e
                );
                AttemptOutcome::RetryScheduled
            }
            Err(e) => {
                self.dead_letter(job, &e);
                AttemptOutcome::DeadLettered
            }
        }
    }

    /// Terminal classification: durable failure write plus a structured
    /// record for operator visibility.
    fn dead_letter(&self, job: &Job, error: &PipelineError) {
        let failed_at = Utc::now();
        let previous = match document_repo::find_by_id(&self.db, &job.document_id) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!(
                    "Could not read document {} before finalize: {}",
                    job.document_id,
                    e
                );
                None
            }
        };

        // No-op when the row is missing (the NotFound case).
        match document_repo::mark_dead_lettered(
            &self.db,
            &job.document_id,
            &error.to_string(),
            failed_at,
        ) {
            Ok(true) => {}
            Ok(false) => {
                log::warn!(
                    "No document row to finalize for dead-lettered job {}",
                    job.id
                );
            }
            Err(e) => {
                log::error!(
                    "Failed to finalize document {}: {}",
                    job.document_id,
                    e
                );
            }
        }

        let record = DeadLetterRecord {
            document_id: job.document_id.clone(),
            job_id: job.id.clone(),
            final_error: error.to_string(),
            total_attempts: job.attempt,
            max_attempts: job.max_attempts,
            previous_state: previous.as_ref().map(|d| d.status),
            job_payload: JobPayload {
                document_id: job.document_id.clone(),
                text: job.raw_text.clone(),
            },
            created_at: previous.map(|d| d.created_at),
            failed_at,
        };

        tracing::error!(
            document_id = %record.document_id,
            job_id = %record.job_id,
            final_error = %record.final_error,
            total_attempts = record.total_attempts,
            max_attempts = record.max_attempts,
            "Job dead-lettered"
        );

        if let Some(sink) = &self.dead_letters {
            if sink.send(record).is_err() {
                log::warn!("Dead-letter sink disconnected");
            }
        }
    }
}
