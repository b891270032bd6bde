//! HTTP client wrapper for downloading single files.
//!
//! This module provides the `HttpClient` struct which streams one URL to one
//! destination key, with optional proxy-host rewriting and Referer header.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HOST, REFERER};
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::duplicate::destination_path;
use super::error::DownloadError;
use crate::user_agent;

/// Per-batch request options applied to every download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Host (optionally `host:port`) to physically connect to instead of the URL's host.
    pub proxy_host: Option<String>,
    /// Value sent as the `Referer` header.
    pub referer: Option<String>,
}

impl RequestOptions {
    /// Builds options from raw flag values, treating blank strings as unset.
    #[must_use]
    pub fn new(proxy_host: Option<&str>, referer: Option<&str>) -> Self {
        Self {
            proxy_host: non_blank(proxy_host),
            referer: non_blank(referer),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Where a request is physically sent, and which Host it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// URL the connection is made to.
    pub url: Url,
    /// Explicit `Host` header, set only when the authority was rewritten.
    pub host_header: Option<String>,
}

/// Result of a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final output path.
    pub path: PathBuf,
    /// Number of body bytes written.
    pub bytes_written: u64,
}

/// HTTP client for downloading files with streaming support.
///
/// This client is designed to be created once and shared by every worker,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use bulkfetch_core::download::{HttpClient, RequestOptions};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new()?;
/// let file = client
///     .download(
///         Path::new("./mirror"),
///         "https://example.com/pkg/a.tar.gz",
///         "pkg/a.tar.gz",
///         &RequestOptions::default(),
///     )
///     .await?;
/// println!("Downloaded {} bytes to {}", file.bytes_written, file.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Read timeout: 5 minutes without receiving body data
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// A value of `0` disables the corresponding timeout.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    #[instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().user_agent(user_agent::default_download_user_agent());
        if connect_timeout_secs > 0 {
            builder = builder.connect_timeout(Duration::from_secs(connect_timeout_secs));
        }
        if read_timeout_secs > 0 {
            builder = builder.read_timeout(Duration::from_secs(read_timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Downloads `url` to `dest_root/key`.
    ///
    /// Steps, each aborting the download on failure:
    /// 1. Create the parent directories of the destination
    /// 2. Parse the URL and apply the proxy-host rewrite
    /// 3. Send a single GET (no retries)
    /// 4. Require status 200, then create/truncate the file and stream the body
    ///
    /// A body that fails mid-stream leaves the partially written file on disk.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The destination directory cannot be created
    /// - The URL or proxy host is invalid
    /// - The request fails (network error, timeout)
    /// - The server returns any status other than 200
    /// - Creating or writing the file, or reading the body, fails
    #[must_use = "download result contains the path and size of the written file"]
    #[instrument(skip(self, dest_root, options), fields(url = %url, key = %key))]
    pub async fn download(
        &self,
        dest_root: &Path,
        url: &str,
        key: &str,
        options: &RequestOptions,
    ) -> Result<DownloadedFile, DownloadError> {
        let file_path = destination_path(dest_root, key);
        ensure_parent_dir(&file_path).await?;

        let target = build_target(url, options.proxy_host.as_deref())?;

        debug!(key = %key, path = %file_path.display(), target = %target.url, "downloading");

        let mut request = self.client.get(target.url.clone());
        if let Some(host) = &target.host_header {
            request = request.header(HOST, host);
        }
        if let Some(referer) = &options.referer {
            request = request.header(REFERER, referer);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let mut file = File::create(&file_path)
            .await
            .map_err(|e| DownloadError::io(file_path.clone(), e))?;
        let bytes_written = stream_to_file(&mut file, response, url, &file_path).await?;

        info!(
            key = %key,
            path = %file_path.display(),
            bytes = bytes_written,
            "download complete"
        );

        Ok(DownloadedFile {
            path: file_path,
            bytes_written,
        })
    }
}

/// Computes the request target for `url`, rewriting its authority to
/// `proxy_host` when one is given.
///
/// The rewrite replaces only the host and port components; a copy of the
/// original host appearing in the path or query is left untouched. The
/// original authority is returned as the `Host` header value.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidUrl`] when `url` is not an absolute
/// http(s) URL with a host, or when `proxy_host` is not a bare `host[:port]`.
pub fn build_target(url: &str, proxy_host: Option<&str>) -> Result<RequestTarget, DownloadError> {
    let parsed = Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DownloadError::invalid_url(url));
    }
    let Some(original_host) = parsed.host_str() else {
        return Err(DownloadError::invalid_url(url));
    };
    let original_authority = match parsed.port() {
        Some(port) => format!("{original_host}:{port}"),
        None => original_host.to_string(),
    };

    let Some(proxy_host) = proxy_host else {
        return Ok(RequestTarget {
            url: parsed,
            host_header: None,
        });
    };

    let (host, port) = parse_proxy_host(proxy_host)?;
    let mut rewritten = parsed;
    rewritten
        .set_host(Some(&host))
        .map_err(|_| DownloadError::invalid_url(proxy_host))?;
    rewritten
        .set_port(port)
        .map_err(|()| DownloadError::invalid_url(proxy_host))?;

    debug!(
        target = %rewritten,
        host_header = %original_authority,
        "rewrote request authority to proxy host"
    );

    Ok(RequestTarget {
        url: rewritten,
        host_header: Some(original_authority),
    })
}

/// Splits `host[:port]` into its components, rejecting anything else.
fn parse_proxy_host(proxy_host: &str) -> Result<(String, Option<u16>), DownloadError> {
    let probe = Url::parse(&format!("http://{proxy_host}"))
        .map_err(|_| DownloadError::invalid_url(proxy_host))?;
    let bare = probe.username().is_empty()
        && probe.password().is_none()
        && probe.path() == "/"
        && probe.query().is_none()
        && probe.fragment().is_none();
    match probe.host_str() {
        Some(host) if bare => Ok((host.to_string(), probe.port())),
        _ => Err(DownloadError::invalid_url(proxy_host)),
    }
}

/// Creates every missing parent directory of `file_path`.
async fn ensure_parent_dir(file_path: &Path) -> Result<(), DownloadError> {
    let Some(parent) = file_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(super::constants::DIR_MODE);

    builder
        .create(parent)
        .await
        .map_err(|e| DownloadError::directory_create(parent, e))
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::body_read(url, file_path, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
