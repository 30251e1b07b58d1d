pub mod coordinator;
pub mod dead_letter;
pub mod job;
pub mod transport;

pub use coordinator::{AttemptOutcome, Coordinator};
pub use dead_letter::{DeadLetterRecord, JobPayload};
pub use job::{Job, RetryPolicy};
pub use transport::JobQueue;
