//! Atomic outcome counters shared by the producer and every worker.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::download::FailureKind;

/// Counters for one batch run.
///
/// The orchestrator records `total` and `local` as it reads lines; workers
/// record successes and failures as jobs finish. Every line read ends up in
/// exactly one of `local`, `succeeded` or `failed`.
#[derive(Debug, Default)]
pub struct BatchStats {
    total: AtomicUsize,
    local: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    failures_by_kind: [AtomicUsize; FailureKind::ALL.len()],
}

impl BatchStats {
    /// Creates a new stats tracker with zero counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of lines read from the list.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Returns the number of lines satisfied without a download.
    #[must_use]
    pub fn local(&self) -> usize {
        self.local.load(Ordering::SeqCst)
    }

    /// Returns the number of successful downloads.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Returns the number of failed lines, parse errors included.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Returns the number of failures of the given kind.
    #[must_use]
    pub fn failed_with(&self, kind: FailureKind) -> usize {
        self.failures_by_kind[kind.index()].load(Ordering::SeqCst)
    }

    /// Returns the number of lines with a terminal outcome so far.
    #[must_use]
    pub fn settled(&self) -> usize {
        self.local() + self.succeeded() + self.failed()
    }

    pub(crate) fn record_line(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_local(&self) {
        self.local.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_failure(&self, kind: FailureKind) {
        self.failures_by_kind[kind.index()].fetch_add(1, Ordering::SeqCst);
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    /// Counts a job that ended without reporting an outcome. It is not
    /// attributed to any [`FailureKind`].
    pub(crate) fn record_abandoned(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_batch_stats_counts() {
        let stats = BatchStats::new();

        for _ in 0..5 {
            stats.record_line();
        }
        stats.record_local();
        stats.record_success();
        stats.record_success();
        stats.record_failure(FailureKind::Parse);
        stats.record_failure(FailureKind::HttpStatus);

        assert_eq!(stats.total(), 5);
        assert_eq!(stats.local(), 1);
        assert_eq!(stats.succeeded(), 2);
        assert_eq!(stats.failed(), 2);
        assert_eq!(stats.settled(), 5);
        assert_eq!(stats.failed_with(FailureKind::Parse), 1);
        assert_eq!(stats.failed_with(FailureKind::HttpStatus), 1);
        assert_eq!(stats.failed_with(FailureKind::Network), 0);
    }

    #[test]
    fn test_batch_stats_thread_safe() {
        use std::thread;

        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    stats.record_line();
                    stats.record_success();
                    stats.record_line();
                    stats.record_failure(FailureKind::Network);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.total(), 2000);
        assert_eq!(stats.succeeded(), 1000);
        assert_eq!(stats.failed(), 1000);
        assert_eq!(stats.failed_with(FailureKind::Network), 1000);
        assert_eq!(stats.settled(), stats.total());
    }
}
