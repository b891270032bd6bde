//! Batch orchestration: list file in, summary out.
//!
//! [`run_batch`] is the single producer for a [`WorkerPool`](crate::pool::WorkerPool)
//! of [`DownloadJob`]s. For each line it either records a terminal outcome
//! immediately (parse failure, already local), attaches the line to the job
//! already fetching the same destination, or submits a job. It then waits for
//! every submitted job before building a [`BatchSummary`].

mod claim;
mod job;
mod orchestrator;
mod stats;

use std::fmt;
use std::time::Duration;

pub use job::{BatchContext, DownloadJob, HttpJobHandler};
pub use orchestrator::{BatchConfig, BatchError, run_batch};
pub use stats::BatchStats;

use crate::download::FailureKind;

/// Final counts of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lines read from the list.
    pub total: usize,
    /// Lines skipped because the file was already in place.
    pub local: usize,
    /// Successful downloads.
    pub succeeded: usize,
    /// Failed lines, parse errors included.
    pub failed: usize,
    /// Non-zero failure counts, in [`FailureKind::ALL`] order.
    pub failures_by_kind: Vec<(FailureKind, usize)>,
    /// Wall-clock time from opening the list to the last job finishing.
    pub duration: Duration,
}

impl BatchSummary {
    /// Snapshots `stats`.
    #[must_use]
    pub fn from_stats(stats: &BatchStats, duration: Duration) -> Self {
        let failures_by_kind = FailureKind::ALL
            .iter()
            .map(|&kind| (kind, stats.failed_with(kind)))
            .filter(|&(_, count)| count > 0)
            .collect();
        Self {
            total: stats.total(),
            local: stats.local(),
            succeeded: stats.succeeded(),
            failed: stats.failed(),
            failures_by_kind,
            duration,
        }
    }

    /// True when every line reached exactly one outcome.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.local + self.succeeded + self.failed == self.total
    }

    /// True when at least one line was read and none of them succeeded or
    /// was already local.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.total > 0 && self.failed == self.total
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total:    {}", self.total)?;
        writeln!(f, "Local:    {}", self.local)?;
        writeln!(f, "Success:  {}", self.succeeded)?;
        writeln!(f, "Failure:  {}", self.failed)?;
        for (kind, count) in &self.failures_by_kind {
            writeln!(f, "  {kind}: {count}")?;
        }
        write!(f, "Duration: {:.3}s", self.duration.as_secs_f64())
    }
}
