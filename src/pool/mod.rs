//! Fixed-size worker pool draining a bounded job queue.
//!
//! The pool is an explicit, caller-owned object: it is started once, can
//! serve any number of batches, and is stopped with [`WorkerPool::shutdown`].
//!
//! # Concurrency Model
//!
//! - Exactly `size` workers run as Tokio tasks for the life of the pool
//! - The queue holds at most `size` pending jobs; [`WorkerPool::submit`]
//!   waits while it is full, which is the only backpressure
//! - Jobs are dequeued in submission order, but finish in any order
//! - A panicking job is contained; its worker keeps draining the queue
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bulkfetch_core::pool::{JobHandler, WorkerPool};
//!
//! struct Print;
//!
//! #[async_trait]
//! impl JobHandler<String> for Print {
//!     async fn handle(&self, job: String) {
//!         println!("{job}");
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool: WorkerPool<String> = WorkerPool::start(4, Arc::new(Print))?;
//! pool.submit("hello".to_string()).await?;
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod barrier;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use async_trait::async_trait;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

pub use barrier::{BarrierGuard, CompletionBarrier};

/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 1;

/// Largest accepted pool size.
pub const MAX_WORKERS: usize = 1024;

/// Error type for worker pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The worker count is outside `1..=MAX_WORKERS`.
    #[error("invalid worker count {value}: must be between 1 and {MAX_WORKERS}")]
    InvalidSize {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The job queue has been closed.
    #[error("job queue is closed")]
    Closed,
}

/// Work performed by a pool worker for each dequeued job.
///
/// The handler owns the job for the duration of the call and is responsible
/// for recording its outcome.
#[async_trait]
pub trait JobHandler<J: Send + 'static>: Send + Sync {
    /// Runs one job to completion.
    async fn handle(&self, job: J);
}

/// A fixed set of workers consuming jobs of type `J` from a shared queue.
pub struct WorkerPool<J> {
    sender: Sender<J>,
    workers: Vec<JoinHandle<()>>,
}

impl<J> std::fmt::Debug for WorkerPool<J> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.workers.len())
            .field("queued", &self.sender.len())
            .finish_non_exhaustive()
    }
}

impl<J: Send + 'static> WorkerPool<J> {
    /// Starts `size` workers sharing a queue of capacity `size`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidSize`] if `size` is zero or above
    /// [`MAX_WORKERS`].
    #[instrument(level = "debug", skip(handler))]
    pub fn start(size: usize, handler: Arc<dyn JobHandler<J>>) -> Result<Self, PoolError> {
        if !(1..=MAX_WORKERS).contains(&size) {
            return Err(PoolError::InvalidSize { value: size });
        }

        let (sender, receiver) = async_channel::bounded(size);
        let workers = (0..size)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    receiver.clone(),
                    Arc::clone(&handler),
                ))
            })
            .collect();

        debug!(size, "worker pool started");
        Ok(Self { sender, workers })
    }

    /// Returns the number of workers.
    #[must_use]
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of jobs waiting in the queue.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.sender.len()
    }

    /// Enqueues a job, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] if the queue has been closed; the job is
    /// dropped.
    pub async fn submit(&self, job: J) -> Result<(), PoolError> {
        self.sender.send(job).await.map_err(|_| PoolError::Closed)
    }

    /// Closes the queue, lets workers drain what is already queued, and joins
    /// every worker.
    #[instrument(level = "debug", skip(self), fields(size = self.workers.len()))]
    pub async fn shutdown(self) {
        self.sender.close();
        for handle in self.workers {
            // Job panics are caught in the worker loop; a JoinError here
            // means the worker itself was cancelled or panicked.
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task ended abnormally");
            }
        }
        debug!("worker pool stopped");
    }
}

async fn run_worker<J: Send + 'static>(
    worker_id: usize,
    jobs: Receiver<J>,
    handler: Arc<dyn JobHandler<J>>,
) {
    debug!(worker_id, "worker started");
    while let Ok(job) = jobs.recv().await {
        if AssertUnwindSafe(handler.handle(job))
            .catch_unwind()
            .await
            .is_err()
        {
            warn!(worker_id, "job panicked; worker continues");
        }
    }
    debug!(worker_id, "job queue closed; worker exiting");
}
