//! The download job handed to pool workers, and the handler that runs it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::claim::{DestinationClaim, JobOutcome};
use super::stats::BatchStats;
use crate::download::{FailureKind, HttpClient, RequestOptions};
use crate::parser::JobLine;
use crate::pool::{BarrierGuard, JobHandler};

/// State shared by every job of one batch.
#[derive(Debug)]
pub struct BatchContext {
    /// Root directory keys are resolved against.
    pub dest_root: PathBuf,
    /// Proxy and referer settings.
    pub request: RequestOptions,
    /// Outcome counters.
    pub stats: BatchStats,
}

impl BatchContext {
    /// Creates a context with fresh counters.
    #[must_use]
    pub fn new(dest_root: impl Into<PathBuf>, request: RequestOptions) -> Self {
        Self {
            dest_root: dest_root.into(),
            request,
            stats: BatchStats::new(),
        }
    }
}

/// One enqueued download.
///
/// A job records exactly one outcome, applied to its own line and to every
/// later line of the batch with the same destination. Finishing it through
/// [`succeed`](Self::succeed) or [`fail`](Self::fail) records that outcome;
/// a job dropped without either (its handler panicked, or it never left the
/// queue) is counted as failed. The completion slot is released only after
/// the outcome is recorded.
#[derive(Debug)]
pub struct DownloadJob {
    line_number: usize,
    line: JobLine,
    context: Arc<BatchContext>,
    destination: Arc<DestinationClaim>,
    settled: bool,
    _completion: BarrierGuard,
}

impl DownloadJob {
    /// Wraps a parsed line for submission.
    #[must_use]
    pub fn new(
        line_number: usize,
        line: JobLine,
        context: Arc<BatchContext>,
        completion: BarrierGuard,
    ) -> Self {
        Self {
            line_number,
            line,
            context,
            destination: Arc::new(DestinationClaim::default()),
            settled: false,
            _completion: completion,
        }
    }

    /// 1-based line number in the list file.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The parsed line.
    #[must_use]
    pub fn line(&self) -> &JobLine {
        &self.line
    }

    /// The batch this job belongs to.
    #[must_use]
    pub fn context(&self) -> &BatchContext {
        &self.context
    }

    pub(crate) fn destination(&self) -> Arc<DestinationClaim> {
        Arc::clone(&self.destination)
    }

    /// Records a successful download and releases the job.
    pub fn succeed(mut self) {
        self.settle(JobOutcome::Succeeded);
    }

    /// Records a failed download and releases the job.
    pub fn fail(mut self, kind: FailureKind) {
        self.settle(JobOutcome::Failed(kind));
    }

    fn settle(&mut self, outcome: JobOutcome) {
        self.destination.settle(&self.context.stats, outcome);
        self.settled = true;
    }
}

impl Drop for DownloadJob {
    fn drop(&mut self) {
        if !self.settled {
            warn!(
                line = self.line_number,
                key = %self.line.key,
                url = %self.line.url,
                "job ended without an outcome; counting as failed"
            );
            self.settle(JobOutcome::Abandoned);
        }
    }
}

/// Production handler: downloads each job with a shared [`HttpClient`].
#[derive(Debug, Clone)]
pub struct HttpJobHandler {
    client: HttpClient,
}

impl HttpJobHandler {
    /// Creates a handler around a shared client.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobHandler<DownloadJob> for HttpJobHandler {
    #[instrument(skip_all, fields(line = job.line_number()))]
    async fn handle(&self, job: DownloadJob) {
        let context = job.context();
        let line = job.line();
        let result = self
            .client
            .download(&context.dest_root, &line.url, &line.key, &context.request)
            .await;
        match result {
            Ok(file) => {
                debug!(key = %line.key, bytes = file.bytes_written, "job succeeded");
                job.succeed();
            }
            Err(e) => {
                let kind = e.kind();
                warn!(
                    line = job.line_number(),
                    key = %line.key,
                    url = %line.url,
                    kind = %kind,
                    error = %e,
                    "download failed"
                );
                job.fail(kind);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pool::CompletionBarrier;

    fn job_line(key: &str) -> JobLine {
        JobLine {
            url: format!("http://origin.example/{key}"),
            key: key.to_string(),
            expected_size: 1,
        }
    }

    fn context() -> Arc<BatchContext> {
        Arc::new(BatchContext::new("/tmp/unused", RequestOptions::default()))
    }

    #[test]
    fn test_succeed_counts_once_and_releases_barrier() {
        let barrier = CompletionBarrier::new();
        let context = context();
        let job = DownloadJob::new(1, job_line("a"), Arc::clone(&context), barrier.enter());
        assert_eq!(barrier.in_flight(), 1);

        job.succeed();

        assert_eq!(barrier.in_flight(), 0);
        assert_eq!(context.stats.succeeded(), 1);
        assert_eq!(context.stats.failed(), 0);
    }

    #[test]
    fn test_fail_records_kind() {
        let barrier = CompletionBarrier::new();
        let context = context();
        let job = DownloadJob::new(2, job_line("b"), Arc::clone(&context), barrier.enter());

        job.fail(FailureKind::HttpStatus);

        assert_eq!(barrier.in_flight(), 0);
        assert_eq!(context.stats.failed(), 1);
        assert_eq!(context.stats.failed_with(FailureKind::HttpStatus), 1);
    }

    #[test]
    fn test_dropped_job_counts_as_failure() {
        let barrier = CompletionBarrier::new();
        let context = context();
        let job = DownloadJob::new(3, job_line("c"), Arc::clone(&context), barrier.enter());
        assert_eq!(job.line_number(), 3);
        assert_eq!(job.line().key, "c");

        drop(job);

        assert_eq!(barrier.in_flight(), 0);
        assert_eq!(context.stats.failed(), 1);
        assert_eq!(context.stats.succeeded(), 0);
    }

    #[test]
    fn test_lines_following_a_job_share_its_outcome() {
        let barrier = CompletionBarrier::new();
        let context = context();
        let job = DownloadJob::new(4, job_line("d"), Arc::clone(&context), barrier.enter());
        let destination = job.destination();
        destination.follow(&context.stats);

        job.fail(FailureKind::Network);
        destination.follow(&context.stats);

        assert_eq!(context.stats.failed_with(FailureKind::Network), 3);
        assert_eq!(context.stats.local(), 0);
        assert_eq!(barrier.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_handler_invalid_url_fails_without_network() {
        let dest = tempfile::tempdir().unwrap();
        let barrier = CompletionBarrier::new();
        let context = Arc::new(BatchContext::new(dest.path(), RequestOptions::default()));
        let line = JobLine {
            url: "not a url".to_string(),
            key: "x.bin".to_string(),
            expected_size: 1,
        };
        let job = DownloadJob::new(1, line, Arc::clone(&context), barrier.enter());

        let handler = HttpJobHandler::new(HttpClient::new().unwrap());
        handler.handle(job).await;

        assert_eq!(barrier.in_flight(), 0);
        assert_eq!(context.stats.failed_with(FailureKind::InvalidUrl), 1);
        assert!(!dest.path().join("x.bin").exists());
    }
}
