//! Fixed-size worker pool pulling jobs from the transport.
//!
//! One job per worker slot; stages within a job run sequentially. Each
//! worker owns a current-thread tokio runtime; recognition is the only
//! suspension point, so a single-threaded runtime per worker is enough.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use log::{debug, error, info};

use crate::queue::{AttemptOutcome, Coordinator, Job, JobQueue};

pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `worker_count` delivery threads over the given queue.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn start(queue: &JobQueue, coordinator: Arc<Coordinator>, worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");

        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = queue.receiver();
            let worker_queue = queue.clone();
            let worker_coordinator = Arc::clone(&coordinator);
            let shutdown_flag = Arc::clone(&shutdown);

            let handle = thread::spawn(move || {
                run_worker(
                    worker_id,
                    job_rx,
                    worker_queue,
                    worker_coordinator,
                    shutdown_flag,
                );
            });

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Self { workers, shutdown }
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Blocks until every worker thread has exited. Signals shutdown
    /// itself, so a prior `shutdown()` call is not required.
    pub fn wait(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    queue: JobQueue,
    coordinator: Arc<Coordinator>,
    shutdown: Arc<AtomicBool>,
) {
    debug!("Worker {} started", worker_id);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Worker {} failed to build runtime: {}", worker_id, e);
            return;
        }
    };

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(job) => {
                debug!(
                    "Worker {} delivering job {} (attempt {}/{})",
                    worker_id, job.id, job.attempt, job.max_attempts
                );

                let outcome = runtime.block_on(coordinator.process(&job));

                // The outcome must be recorded before the next delivery of
                // this job is scheduled, never concurrently with it.
                if outcome == AttemptOutcome::RetryScheduled {
                    queue.redeliver(&job);
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
