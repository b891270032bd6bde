//! Single-file HTTP downloads and the local duplicate check that gates them.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Proxy-host rewriting that keeps the original `Host` header
//! - Optional `Referer` header
//! - Structured error types classified into [`FailureKind`]s
//! - Size-based duplicate detection ([`is_local_duplicate`])
//!
//! Each download is a single attempt; there is no retry policy.

mod client;
pub mod constants;
mod duplicate;
mod error;

pub use client::{DownloadedFile, HttpClient, RequestOptions, RequestTarget, build_target};
pub use duplicate::{destination_path, is_local_duplicate};
pub use error::{DownloadError, FailureKind};

// Note: no module-local Result alias; use `Result<T, DownloadError>` explicitly.
