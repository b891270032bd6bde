use std::sync::Arc;

use anyhow::{Context, Result};
use bulkfetch_core::{
    BatchConfig, DownloadJob, HttpClient, HttpJobHandler, JobHandler, RequestOptions, WorkerPool,
    run_batch,
};
use tracing::{debug, info};

use crate::ProcessExit;
use crate::app::{config_manager, config_runtime, exit_handler, terminal, validation};

pub(crate) async fn run_bulkfetch() -> Result<ProcessExit> {
    let (args, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(args, &cli_sources)?;

    let default_level = config_runtime::resolve_default_log_level(&resolved.args);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::is_no_color_requested(&resolved.args);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);
    resolved.log_source();

    debug!(args = ?resolved.args, timeouts = ?resolved.http_timeouts, "configuration resolved");

    let list_path = validation::require_list_file(resolved.args.file.as_deref())?;
    let dest_root = validation::require_dest_dir(resolved.args.dest.as_deref())?;
    let workers = config_runtime::normalize_worker_count(resolved.args.worker)?;

    info!(
        workers,
        list = %list_path.display(),
        dest = %dest_root.display(),
        "bulkfetch starting"
    );

    let client = HttpClient::with_timeouts(
        resolved.http_timeouts.connect_secs,
        resolved.http_timeouts.read_secs,
    )
    .context("Failed to build HTTP client")?;
    let handler: Arc<dyn JobHandler<DownloadJob>> = Arc::new(HttpJobHandler::new(client));
    let pool = WorkerPool::start(workers, handler).context("Failed to start worker pool")?;

    let config = BatchConfig {
        list_path,
        dest_root,
        request: RequestOptions::new(
            resolved.args.proxy.as_deref(),
            resolved.args.referer.as_deref(),
        ),
    };
    let result = run_batch(&pool, &config).await;
    pool.shutdown().await;
    let summary = result.context("Batch aborted")?;

    for line in summary.to_string().lines() {
        info!("{line}");
    }

    Ok(exit_handler::determine_exit_outcome(&summary))
}
