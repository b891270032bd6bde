//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bulkfetch_core::download::constants::MAX_TIMEOUT_SECS;

/// TOML-backed file configuration for bulkfetch defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default worker count.
    pub worker: Option<usize>,
    /// Default destination directory.
    pub dest: Option<PathBuf>,
    /// Default proxy host (`host` or `host:port`).
    pub proxy: Option<String>,
    /// Default referer header.
    pub referer: Option<String>,
    /// Connect timeout in seconds, `0` disables.
    pub connect_timeout_secs: Option<u64>,
    /// Per-read idle timeout in seconds, `0` disables.
    pub read_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

/// Upper bound for the `worker` config key.
pub const MAX_CONFIG_WORKERS: usize = bulkfetch_core::MAX_WORKERS;

impl FileConfig {
    /// Validates config values against runtime constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(worker) = self.worker
            && !(1..=MAX_CONFIG_WORKERS).contains(&worker)
        {
            bail!(
                "Invalid config value for `worker`: {worker}. Expected range: 1..={MAX_CONFIG_WORKERS}"
            );
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > MAX_TIMEOUT_SECS {
        bail!(
            "Invalid config value for `{field}`: {value}. Expected range: 0..={MAX_TIMEOUT_SECS}"
        );
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/bulkfetch/config.toml`
/// 2. `$HOME/.config/bulkfetch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("bulkfetch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("bulkfetch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "worker" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `worker` value on line {line_number}"))?;
                let worker = usize::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("worker out of range for usize"))?;
                cfg.worker = Some(worker);
            }
            "dest" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `dest` value on line {line_number}"))?;
                cfg.dest = Some(PathBuf::from(parsed));
            }
            "proxy" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `proxy` value on line {line_number}"))?;
                cfg.proxy = Some(parsed);
            }
            "referer" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `referer` value on line {line_number}"))?;
                cfg.referer = Some(parsed);
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_number}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_number}")
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_number}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_number}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
