//! Outcome sharing between list lines that target the same destination.
//!
//! Only the first line for a destination is downloaded. Later lines for the
//! same destination follow it: each one is recorded with whatever outcome the
//! claiming job ends with.

use std::sync::{Mutex, PoisonError};

use super::stats::BatchStats;
use crate::download::FailureKind;

/// Terminal outcome of a download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Succeeded,
    Failed(FailureKind),
    /// The job ended without reporting; counted as failed with no kind.
    Abandoned,
}

impl JobOutcome {
    fn record(self, stats: &BatchStats) {
        match self {
            Self::Succeeded => stats.record_success(),
            Self::Failed(kind) => stats.record_failure(kind),
            Self::Abandoned => stats.record_abandoned(),
        }
    }
}

#[derive(Debug)]
enum ClaimState {
    Pending { followers: usize },
    Settled(JobOutcome),
}

/// A destination claimed by one job of the current batch.
#[derive(Debug)]
pub(crate) struct DestinationClaim {
    state: Mutex<ClaimState>,
}

impl Default for DestinationClaim {
    fn default() -> Self {
        Self {
            state: Mutex::new(ClaimState::Pending { followers: 0 }),
        }
    }
}

impl DestinationClaim {
    /// Registers one more line for this destination. If the claiming job
    /// already finished, its outcome is recorded for the line right away.
    pub(crate) fn follow(&self, stats: &BatchStats) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *state {
            ClaimState::Pending { followers } => *followers += 1,
            ClaimState::Settled(outcome) => outcome.record(stats),
        }
    }

    /// Records `outcome` for the claiming line and every follower so far.
    pub(crate) fn settle(&self, stats: &BatchStats, outcome: JobOutcome) {
        let followers = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match std::mem::replace(&mut *state, ClaimState::Settled(outcome)) {
                ClaimState::Pending { followers } => followers,
                // Settling twice is a no-op.
                ClaimState::Settled(previous) => {
                    *state = ClaimState::Settled(previous);
                    return;
                }
            }
        };
        for _ in 0..=followers {
            outcome.record(stats);
        }
    }
}
