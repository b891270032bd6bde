//! User-Agent string sent with every download request.

/// Default User-Agent for download requests (identifies the tool and version).
#[must_use]
pub(crate) fn default_download_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("bulkfetch/{version}")
}
