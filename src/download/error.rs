//! Error types for the download module.
//!
//! This module defines structured errors for single-file downloads,
//! providing context-rich error messages for debugging and manual retry.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a single file download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Parent directories for the destination could not be created.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL (or proxy host) is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connecting or reading timed out.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Any response status other than 200.
    #[error("HTTP {status} {reason} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Canonical reason phrase, empty when unknown.
        reason: String,
    },

    /// File system error while creating or writing the destination file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The response body failed mid-stream after the destination was created.
    #[error("failed reading body of {url} into {path}: {source}")]
    BodyRead {
        /// The URL being streamed.
        url: String,
        /// The partially written destination file.
        path: PathBuf,
        /// The underlying body error.
        #[source]
        source: reqwest::Error,
    },
}

/// Coarse classification of a failed job, used for logging and accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Input line did not have the expected shape.
    Parse,
    /// Parent directory creation failed.
    DirectoryCreate,
    /// Source URL or proxy host could not be parsed.
    InvalidUrl,
    /// Transport-level failure or timeout.
    Network,
    /// Server answered with a status other than 200.
    HttpStatus,
    /// Creating the file or copying the body failed.
    StreamCopy,
}

impl FailureKind {
    /// Every kind, in summary display order.
    pub const ALL: [Self; 6] = [
        Self::Parse,
        Self::DirectoryCreate,
        Self::InvalidUrl,
        Self::Network,
        Self::HttpStatus,
        Self::StreamCopy,
    ];

    /// Position of this kind in [`FailureKind::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Parse => 0,
            Self::DirectoryCreate => 1,
            Self::InvalidUrl => 2,
            Self::Network => 3,
            Self::HttpStatus => 4,
            Self::StreamCopy => 5,
        }
    }

    /// Returns a stable label for log output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::DirectoryCreate => "directory_create",
            Self::InvalidUrl => "invalid_url",
            Self::Network => "network",
            Self::HttpStatus => "http_status",
            Self::StreamCopy => "stream_copy",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DownloadError {
    /// Creates a directory creation error.
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error, filling in the canonical reason phrase.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self::HttpStatus {
            url: url.into(),
            status,
            reason,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a mid-stream body read error.
    pub fn body_read(
        url: impl Into<String>,
        path: impl Into<PathBuf>,
        source: reqwest::Error,
    ) -> Self {
        Self::BodyRead {
            url: url.into(),
            path: path.into(),
            source,
        }
    }

    /// Classifies this error into its failure kind.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::DirectoryCreate { .. } => FailureKind::DirectoryCreate,
            Self::InvalidUrl { .. } => FailureKind::InvalidUrl,
            Self::Network { .. } | Self::Timeout { .. } => FailureKind::Network,
            Self::HttpStatus { .. } => FailureKind::HttpStatus,
            Self::Io { .. } | Self::BodyRead { .. } => FailureKind::StreamCopy,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path the source error does not carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_timeout_display() {
        let error = DownloadError::timeout("https://example.com/file.bin");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://example.com/file.bin"));
        assert_eq!(error.kind(), FailureKind::Network);
    }

    #[test]
    fn test_download_error_http_status_display_includes_reason() {
        let error = DownloadError::http_status("https://example.com/file.bin", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("Not Found"), "Expected reason in: {msg}");
        assert!(
            msg.contains("https://example.com/file.bin"),
            "Expected URL in: {msg}"
        );
        assert_eq!(error.kind(), FailureKind::HttpStatus);
    }

    #[test]
    fn test_download_error_http_status_unknown_code_has_empty_reason() {
        let error = DownloadError::http_status("https://example.com/x", 599);
        match error {
            DownloadError::HttpStatus { status, reason, .. } => {
                assert_eq!(status, 599);
                assert!(reason.is_empty());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_download_error_io_is_stream_copy() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = DownloadError::io(PathBuf::from("/tmp/test.bin"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/test.bin"), "Expected path in: {msg}");
        assert_eq!(error.kind(), FailureKind::StreamCopy);
    }

    #[test]
    fn test_download_error_directory_create_kind() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = DownloadError::directory_create("/root/locked", io_error);
        assert!(error.to_string().contains("/root/locked"));
        assert_eq!(error.kind(), FailureKind::DirectoryCreate);
    }

    #[test]
    fn test_download_error_invalid_url_display() {
        let error = DownloadError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert!(msg.contains("not-a-url"), "Expected URL in: {msg}");
        assert_eq!(error.kind(), FailureKind::InvalidUrl);
    }

    #[test]
    fn test_failure_kind_labels_are_stable() {
        assert_eq!(FailureKind::Parse.to_string(), "parse");
        assert_eq!(FailureKind::StreamCopy.as_str(), "stream_copy");
        assert_eq!(FailureKind::HttpStatus.as_str(), "http_status");
    }

    #[test]
    fn test_failure_kind_index_matches_all_order() {
        for (position, kind) in FailureKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position, "{kind}");
        }
    }
}
