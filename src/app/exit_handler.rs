//! Exit code logic for the bulkfetch process.
//!
//! Single responsibility: map batch outcome counts to the process exit outcome.

use bulkfetch_core::BatchSummary;

use crate::ProcessExit;

/// Determines the process exit outcome from a batch summary.
///
/// Lines that were already local count as satisfied, so a batch where
/// everything was local succeeds.
pub(crate) fn determine_exit_outcome(summary: &BatchSummary) -> ProcessExit {
    let satisfied = summary.succeeded + summary.local;
    if summary.failed == 0 {
        ProcessExit::Success
    } else if satisfied > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}
