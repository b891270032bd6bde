//! Constants for the download module (timeouts, directory permissions).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle read timeout (5 minutes between body chunks).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Upper bound accepted for either timeout setting (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Permission bits for directories created under the destination root.
#[cfg(unix)]
pub const DIR_MODE: u32 = 0o775;
