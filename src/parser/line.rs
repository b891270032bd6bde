//! Parsing of a single `url<TAB>key<TAB>size` list line.

use std::path::{Component, Path};

use super::error::LineParseError;

/// One job as described by a list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLine {
    /// Source URL, validated only when the job runs.
    pub url: String,
    /// Destination key, relative to the destination root.
    pub key: String,
    /// Expected size in bytes.
    pub expected_size: i64,
}

/// Parses one list line.
///
/// Surrounding whitespace is trimmed, then the line must split on TAB into
/// exactly three fields. The size field must be a decimal integer with no
/// inner whitespace.
///
/// # Errors
///
/// Returns [`LineParseError`] when the field count is wrong, the size is not
/// an integer, or the key is empty or contains `..`.
///
/// # Example
///
/// ```
/// use bulkfetch_core::parser::parse_line;
///
/// let job = parse_line("https://example.com/a.bin\tdir/a.bin\t1024\n").unwrap();
/// assert_eq!(job.key, "dir/a.bin");
/// assert_eq!(job.expected_size, 1024);
/// ```
pub fn parse_line(line: &str) -> Result<JobLine, LineParseError> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    let [url, key, size] = fields.as_slice() else {
        return Err(LineParseError::FieldCount {
            found: fields.len(),
        });
    };
    let expected_size = size
        .parse::<i64>()
        .map_err(|_| LineParseError::InvalidSize {
            value: (*size).to_string(),
        })?;

    if key.is_empty() {
        return Err(LineParseError::EmptyKey);
    }
    if Path::new(key)
        .components()
        .any(|component| component == Component::ParentDir)
    {
        return Err(LineParseError::UnsafeKey {
            key: (*key).to_string(),
        });
    }

    Ok(JobLine {
        url: (*url).to_string(),
        key: (*key).to_string(),
        expected_size,
    })
}
