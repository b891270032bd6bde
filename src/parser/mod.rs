//! Input parsing for the tab-separated job list.
//!
//! Each non-rejected line of the list becomes a [`JobLine`]:
//!
//! ```text
//! <url>\t<relative destination key>\t<expected size in bytes>
//! ```
//!
//! Lines are judged independently; a rejected line never stops the batch.

mod error;
mod line;

pub use error::{FIELD_COUNT, LineParseError};
pub use line::{JobLine, parse_line};
