//! CLI entry point for the bulkfetch tool.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;

/// How the process ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Nothing failed.
    Success,
    /// Some lines failed, others succeeded or were already local.
    Partial,
    /// Every line failed, or the run could not start.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Partial => ExitCode::from(2),
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_bulkfetch().await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ProcessExit::Failure.into()
        }
    }
}
