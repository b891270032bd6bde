//! Configuration lifecycle: load file config, merge CLI, resolve timeouts.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::app::config_runtime::{self, CliValueSources, HttpTimeoutSettings};
use crate::app_config::{VerbositySetting, load_default_file_config};
use crate::cli::Args;

/// Resolved configuration bundle used by the runtime.
pub(crate) struct ResolvedConfig {
    pub(crate) args: Args,
    pub(crate) http_timeouts: HttpTimeoutSettings,
    /// Config file location that was checked, if one could be resolved.
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) config_loaded: bool,
    pub(crate) config_verbosity: Option<VerbositySetting>,
}

impl ResolvedConfig {
    /// Logs where configuration came from. Call once tracing is installed.
    pub(crate) fn log_source(&self) {
        if let Some(path) = &self.config_path {
            debug!(
                path = %path.display(),
                loaded = self.config_loaded,
                verbosity = self.config_verbosity.map_or("unset", VerbositySetting::as_str),
                "config file lookup"
            );
        }
    }
}

/// Load file config, merge CLI overrides and resolve HTTP timeouts.
pub(crate) fn resolve_config(args: Args, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded_config = load_default_file_config()?;
    let file_config = loaded_config.config.as_ref();
    let args = config_runtime::apply_config_defaults(args, cli_sources, file_config);
    let http_timeouts = config_runtime::resolve_http_timeouts(file_config);
    Ok(ResolvedConfig {
        args,
        http_timeouts,
        config_loaded: file_config.is_some(),
        config_verbosity: file_config.and_then(|config| config.verbosity),
        config_path: loaded_config.path,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::ffi::OsString;
    use std::path::PathBuf;
    use std::sync::{Mutex, PoisonError};

    use clap::Parser;
    use tempfile::TempDir;

    use super::resolve_config;
    use crate::app::config_runtime::CliValueSources;
    use crate::cli::Args;

    // Tests in this module mutate XDG_CONFIG_HOME.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct RestoreEnv {
        key: &'static str,
        prev: Option<OsString>,
    }

    impl RestoreEnv {
        fn set(key: &'static str, value: &std::path::Path) -> Self {
            let prev = std::env::var_os(key);
            // SAFETY: callers hold ENV_LOCK; the previous value is restored on drop.
            unsafe { std::env::set_var(key, value) };
            Self { key, prev }
        }
    }

    impl Drop for RestoreEnv {
        fn drop(&mut self) {
            // SAFETY: see RestoreEnv::set.
            unsafe {
                match &self.prev {
                    Some(value) => std::env::set_var(self.key, value),
                    None => std::env::remove_var(self.key),
                }
            }
        }
    }

    #[test]
    fn test_resolve_config_no_config_file_returns_defaults() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let _restore = RestoreEnv::set("XDG_CONFIG_HOME", temp.path());

        let args = Args::try_parse_from(["bulkfetch", "-f", "list.tsv"]).unwrap();
        let resolved = resolve_config(args, &CliValueSources::default()).unwrap();

        assert!(resolved.args.worker.is_none());
        assert!(resolved.args.dest.is_none());
        assert!(!resolved.config_loaded);
        assert_eq!(resolved.http_timeouts.connect_secs, 30);
        assert_eq!(resolved.http_timeouts.read_secs, 300);
    }

    #[test]
    fn test_resolve_config_reads_xdg_config_file() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bulkfetch");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.toml"),
            "worker = 5\ndest = \"/srv/mirror\"\nread_timeout_secs = 60\n",
        )
        .unwrap();
        let _restore = RestoreEnv::set("XDG_CONFIG_HOME", temp.path());

        let args = Args::try_parse_from(["bulkfetch", "-f", "list.tsv"]).unwrap();
        let resolved = resolve_config(args, &CliValueSources::default()).unwrap();

        assert_eq!(resolved.args.worker, Some(5));
        assert_eq!(resolved.args.dest, Some(PathBuf::from("/srv/mirror")));
        assert_eq!(resolved.http_timeouts.read_secs, 60);
        assert_eq!(resolved.http_timeouts.connect_secs, 30);
        assert!(resolved.config_loaded);
        assert_eq!(
            resolved.config_path,
            Some(temp.path().join("bulkfetch").join("config.toml"))
        );
    }

    #[test]
    fn test_resolve_config_invalid_file_is_error() {
        let _lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bulkfetch");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "bogus = 1\n").unwrap();
        let _restore = RestoreEnv::set("XDG_CONFIG_HOME", temp.path());

        let args = Args::try_parse_from(["bulkfetch"]).unwrap();
        let err = resolve_config(args, &CliValueSources::default())
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("Unknown configuration key"));
    }
}
