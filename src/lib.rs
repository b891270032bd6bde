//! Bulk File Fetcher Core Library
//!
//! Downloads a list of `(url, key, size)` jobs into a destination directory
//! with a fixed number of concurrent workers, skipping files that are already
//! present with the expected size.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Parsing of tab-separated list lines
//! - [`download`] - Single-file HTTP download and the local duplicate check
//! - [`pool`] - Fixed-size worker pool and completion barrier
//! - [`batch`] - Reads a list, feeds the pool, and summarizes the outcome
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bulkfetch_core::{
//!     BatchConfig, DownloadJob, HttpClient, HttpJobHandler, RequestOptions, WorkerPool, run_batch,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = Arc::new(HttpJobHandler::new(HttpClient::new()?));
//! let pool: WorkerPool<DownloadJob> = WorkerPool::start(8, handler)?;
//! let config = BatchConfig {
//!     list_path: "list.tsv".into(),
//!     dest_root: "mirror".into(),
//!     request: RequestOptions::default(),
//! };
//! let summary = run_batch(&pool, &config).await?;
//! println!("{summary}");
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod download;
pub mod parser;
pub mod pool;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use batch::{
    BatchConfig, BatchContext, BatchError, BatchStats, BatchSummary, DownloadJob, HttpJobHandler,
    run_batch,
};
pub use download::{
    DownloadError, DownloadedFile, FailureKind, HttpClient, RequestOptions, destination_path,
    is_local_duplicate,
};
pub use parser::{JobLine, LineParseError, parse_line};
pub use pool::{
    CompletionBarrier, DEFAULT_WORKERS, JobHandler, MAX_WORKERS, PoolError, WorkerPool,
};
