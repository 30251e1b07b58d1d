//! In-process job transport.
//!
//! At-least-once delivery over a crossbeam channel with per-job attempt
//! counters. Redelivery waits out the policy's backoff on a detached thread
//! so worker slots stay free. At-most-one in-flight attempt per document
//! holds structurally: one job per document, and `redeliver` is only called
//! after the previous attempt's outcome is recorded.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::WorkerError;

use super::job::{Job, RetryPolicy};

#[derive(Clone)]
pub struct JobQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
    policy: RetryPolicy,
}

impl JobQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        let (sender, receiver) = unbounded::<Job>();
        Self {
            sender,
            receiver,
            policy,
        }
    }

    /// Creates and enqueues the job for a freshly submitted document.
    pub fn enqueue(
        &self,
        document_id: &str,
        raw_text: &str,
    ) -> Result<Job, WorkerError> {
        let job = Job::new(document_id, raw_text, self.policy.max_attempts);
        self.sender
            .send(job.clone())
            .map_err(|_| WorkerError::ChannelClosed)?;
        log::debug!(
            "Enqueued job {} for document {}",
            job.id,
            job.document_id
        );
        Ok(job)
    }

    /// Schedules redelivery of a failed job after the backoff delay.
    pub fn redeliver(&self, failed: &Job) {
        let next = failed.next_attempt();
        let delay = self.policy.backoff_delay(failed.attempt);
        let sender = self.sender.clone();
        std::thread::spawn(move || {
            std::thread::sleep(delay);
            log::debug!(
                "Redelivering job {} (attempt {}/{})",
                next.id,
                next.attempt,
                next.max_attempts
            );
            if sender.send(next).is_err() {
                log::warn!("Queue closed before redelivery");
            }
        });
    }

    /// A receiver handle for a worker thread.
    pub fn receiver(&self) -> Receiver<Job> {
        self.receiver.clone()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
