//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download every file in a tab-separated list with a fixed worker pool.
///
/// Each list line is `<url>\t<destination key>\t<expected size in bytes>`.
/// Files already present under the destination with the expected size are
/// skipped.
#[derive(Parser, Debug, Clone)]
#[command(name = "bulkfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Number of concurrent workers; values of 0 or less run a single worker [default: 1]
    #[arg(short = 'w', long = "worker", allow_negative_numbers = true)]
    pub worker: Option<i64>,

    /// List file to read jobs from
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Destination directory keys are resolved against
    #[arg(short = 'd', long = "dest")]
    pub dest: Option<PathBuf>,

    /// Connect to HOST[:PORT] instead of each URL's host, keeping the original Host header
    #[arg(long, value_name = "HOST[:PORT]")]
    pub proxy: Option<String>,

    /// Referer header sent with every request
    #[arg(long)]
    pub referer: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}
