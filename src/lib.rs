pub mod api;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod queue;
pub mod stages;
pub mod worker;

pub use api::{ApiError, DocumentService, Health, SubmitRequest, SubmitResponse};
pub use config::Settings;
pub use document::{Document, DocumentStatus, InvoiceMetadata, RecognitionResult};
pub use error::{ConfigError, DocflowError, Result, WorkerError};
pub use pipeline::{Pipeline, PipelineError};
pub use queue::{AttemptOutcome, Coordinator, DeadLetterRecord, Job, JobQueue, RetryPolicy};
pub use stages::{MetadataExtractor, Recognizer, SimulatedRecognizer};
pub use worker::WorkerPool;
