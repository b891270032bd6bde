//! Reads the job list and feeds the worker pool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument, warn};

use super::BatchSummary;
use super::claim::DestinationClaim;
use super::job::{BatchContext, DownloadJob};
use crate::download::{FailureKind, RequestOptions, destination_path, is_local_duplicate};
use crate::parser::parse_line;
use crate::pool::{CompletionBarrier, PoolError, WorkerPool};

/// Inputs for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Tab-separated list of `url`, `key`, `size` lines.
    pub list_path: PathBuf,
    /// Directory keys are resolved against.
    pub dest_root: PathBuf,
    /// Proxy and referer applied to every request.
    pub request: RequestOptions,
}

/// Errors that abort a batch.
///
/// Per-line and per-job problems never surface here; they are counted as
/// failures in the [`BatchSummary`].
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The list file could not be opened.
    #[error("failed to open list file {path}: {source}")]
    ListFileOpen {
        /// Path that was given.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The pool stopped accepting jobs mid-batch.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl BatchError {
    /// Creates a list file open error.
    pub fn list_file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ListFileOpen {
            path: path.into(),
            source,
        }
    }
}

/// Runs one batch: every line of `config.list_path` is parsed, checked
/// against the destination, and either counted as local or submitted to
/// `pool`. Returns once every submitted job has finished.
///
/// A line is counted as local (and not downloaded) when the destination file
/// already has the expected size. A line whose destination was already
/// claimed by an earlier line of the same batch is not downloaded either; it
/// is recorded with the outcome of that earlier line's job.
///
/// # Errors
///
/// Returns [`BatchError::ListFileOpen`] if the list cannot be opened, and
/// [`BatchError::Pool`] if the pool has been shut down.
#[instrument(
    skip_all,
    fields(list = %config.list_path.display(), dest = %config.dest_root.display())
)]
pub async fn run_batch(
    pool: &WorkerPool<DownloadJob>,
    config: &BatchConfig,
) -> Result<BatchSummary, BatchError> {
    let started = Instant::now();
    let file = File::open(&config.list_path)
        .await
        .map_err(|e| BatchError::list_file_open(&config.list_path, e))?;
    let mut reader = BufReader::new(file);

    let context = Arc::new(BatchContext::new(
        config.dest_root.clone(),
        config.request.clone(),
    ));
    let barrier = CompletionBarrier::new();
    let mut claimed: HashMap<PathBuf, Arc<DestinationClaim>> = HashMap::new();
    let mut buf = Vec::new();
    let mut line_number = 0_usize;

    info!(workers = pool.size(), "batch started");

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    line = line_number + 1,
                    error = %e,
                    "failed reading list file; no further lines will be read"
                );
                break;
            }
        }
        line_number += 1;
        context.stats.record_line();

        let text = String::from_utf8_lossy(&buf);
        let job_line = match parse_line(&text) {
            Ok(job_line) => job_line,
            Err(e) => {
                warn!(line = line_number, error = %e, "skipping malformed line");
                context.stats.record_failure(FailureKind::Parse);
                continue;
            }
        };

        let destination = destination_path(&context.dest_root, &job_line.key);
        if let Some(claim) = claimed.get(&destination) {
            warn!(
                line = line_number,
                key = %job_line.key,
                "destination already queued earlier in this batch; sharing its outcome"
            );
            claim.follow(&context.stats);
            continue;
        }

        if is_local_duplicate(&context.dest_root, &job_line.key, job_line.expected_size).await {
            debug!(line = line_number, key = %job_line.key, "already present locally");
            context.stats.record_local();
            continue;
        }

        let job = DownloadJob::new(line_number, job_line, Arc::clone(&context), barrier.enter());
        claimed.insert(destination, job.destination());
        pool.submit(job).await?;
    }

    debug!(in_flight = barrier.in_flight(), "list exhausted; draining");
    barrier.wait().await;

    let summary = BatchSummary::from_stats(&context.stats, started.elapsed());
    info!(
        total = summary.total,
        local = summary.local,
        succeeded = summary.succeeded,
        failed = summary.failed,
        duration_ms = u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
        "batch complete"
    );
    Ok(summary)
}
