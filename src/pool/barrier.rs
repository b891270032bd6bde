//! In-flight job counter the producer can wait on.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct BarrierInner {
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Counts submitted-but-unfinished jobs.
///
/// The producer calls [`enter`](Self::enter) before submitting a job and
/// hands the returned [`BarrierGuard`] to the job; the guard releases its
/// slot when dropped, whether the job finished normally or unwound.
/// [`wait`](Self::wait) resolves once the count is back to zero.
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<BarrierInner>,
}

impl CompletionBarrier {
    /// Creates a barrier with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more in-flight job.
    #[must_use = "the job is only released when the guard is dropped"]
    pub fn enter(&self) -> BarrierGuard {
        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        BarrierGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Returns the number of jobs still in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Waits until every entered job has released its guard.
    pub async fn wait(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            // Register before checking so a release between the check and
            // the await is not missed.
            idle.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Releases one in-flight slot of a [`CompletionBarrier`] on drop.
#[derive(Debug)]
pub struct BarrierGuard {
    inner: Arc<BarrierInner>,
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
