use anyhow::{Result, bail};
use bulkfetch_core::download::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use bulkfetch_core::{DEFAULT_WORKERS, MAX_WORKERS};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Args;

/// Which verbosity flags were typed on the command line.
///
/// The remaining flags are `Option`s on [`Args`], so `Some` already means
/// "given on the command line".
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HttpTimeoutSettings {
    pub(crate) connect_secs: u64,
    pub(crate) read_secs: u64,
}

impl Default for HttpTimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

pub(crate) fn parse_cli_with_sources() -> (Args, CliValueSources) {
    let command = Args::command();
    let matches = command.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());

    let sources = CliValueSources {
        verbose: is_commandline_value(&matches, "verbose"),
        quiet: is_commandline_value(&matches, "quiet"),
    };
    (args, sources)
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills flags the user did not pass from the file config.
pub(crate) fn apply_config_defaults(
    mut args: Args,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Args {
    let Some(file_config) = file_config else {
        return args;
    };

    if args.worker.is_none()
        && let Some(worker) = file_config.worker
    {
        args.worker = Some(i64::try_from(worker).unwrap_or(i64::MAX));
    }

    if args.dest.is_none()
        && let Some(dest) = &file_config.dest
    {
        args.dest = Some(dest.clone());
    }

    if args.proxy.is_none()
        && let Some(proxy) = &file_config.proxy
    {
        args.proxy = Some(proxy.clone());
    }

    if args.referer.is_none()
        && let Some(referer) = &file_config.referer
    {
        args.referer = Some(referer.clone());
    }

    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        apply_config_verbosity(&mut args, verbosity);
    }

    args
}

fn apply_config_verbosity(args: &mut Args, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            args.quiet = false;
            args.verbose = 0;
        }
        VerbositySetting::Verbose => {
            args.quiet = false;
            args.verbose = 1;
        }
        VerbositySetting::Quiet => {
            args.quiet = true;
            args.verbose = 0;
        }
        VerbositySetting::Debug => {
            args.quiet = false;
            args.verbose = 2;
        }
    }
}

/// Effective worker count: unset means the default, and anything below one
/// runs a single worker.
pub(crate) fn normalize_worker_count(worker: Option<i64>) -> Result<usize> {
    let count = match worker {
        None => DEFAULT_WORKERS,
        Some(n) if n <= 0 => 1,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    };
    if count > MAX_WORKERS {
        bail!(
            "Invalid worker count: {}. At most {MAX_WORKERS} workers are supported",
            worker.unwrap_or_default()
        );
    }
    Ok(count)
}

pub(crate) fn resolve_http_timeouts(file_config: Option<&FileConfig>) -> HttpTimeoutSettings {
    let mut settings = HttpTimeoutSettings::default();
    let Some(file_config) = file_config else {
        return settings;
    };

    if let Some(value) = file_config.connect_timeout_secs {
        settings.connect_secs = value;
    }
    if let Some(value) = file_config.read_timeout_secs {
        settings.read_secs = value;
    }
    settings
}

pub(crate) fn resolve_default_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}
