//! Error types for list line parsing.

use thiserror::Error;

/// Number of tab-separated fields every list line must have.
pub const FIELD_COUNT: usize = 3;

/// Errors that reject a single list line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineParseError {
    /// Line did not split into exactly three tab-separated fields.
    #[error("expected {FIELD_COUNT} tab-separated fields (url, key, size), found {found}")]
    FieldCount {
        /// Number of fields actually present.
        found: usize,
    },

    /// Size field is not a decimal integer.
    #[error("invalid size '{value}': expected a decimal integer")]
    InvalidSize {
        /// The raw size field.
        value: String,
    },

    /// Destination key is empty.
    #[error("empty destination key")]
    EmptyKey,

    /// Destination key would escape the destination directory.
    #[error("destination key '{key}' must not contain '..' components")]
    UnsafeKey {
        /// The rejected key.
        key: String,
    },
}
