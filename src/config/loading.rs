//! Configuration loading from files and environment variables
//!
//! Environment variables take precedence over the file, so container
//! deployments can override single values without editing `config.toml`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use super::types::Config;
use crate::types::{HostName, MaxFileBytes, Port, RequestCeiling};

/// Sandbox root directory
pub const ENV_ROOT: &str = "GOPHER_ROOT";
/// Listen and advertised port
pub const ENV_PORT: &str = "GOPHER_PORT";
/// Hostname advertised in menus
pub const ENV_HOSTNAME: &str = "GOPHER_HOSTNAME";
/// Listen address
pub const ENV_BIND_HOST: &str = "GOPHER_BIND_HOST";
/// File size ceiling in bytes
pub const ENV_MAX_FILE_BYTES: &str = "GOPHER_MAX_FILE_BYTES";
/// Requests per client per window
pub const ENV_MAX_REQUESTS: &str = "GOPHER_MAX_REQUESTS";
/// Rate-limit window in milliseconds
pub const ENV_RATE_WINDOW_MS: &str = "GOPHER_RATE_WINDOW_MS";
/// Connection idle timeout in milliseconds
pub const ENV_CONNECTION_TIMEOUT_MS: &str = "GOPHER_CONNECTION_TIMEOUT_MS";

const ENV_VARS: [&str; 8] = [
    ENV_ROOT,
    ENV_PORT,
    ENV_HOSTNAME,
    ENV_BIND_HOST,
    ENV_MAX_FILE_BYTES,
    ENV_MAX_REQUESTS,
    ENV_RATE_WINDOW_MS,
    ENV_CONNECTION_TIMEOUT_MS,
];

/// Where the active configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Loaded from an existing TOML file
    File,
    /// Built from `GOPHER_*` environment variables
    Environment,
    /// No file or env vars; defaults were written to the requested path
    DefaultCreated,
}

impl ConfigSource {
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::File => "configuration file",
            Self::Environment => "environment variables",
            Self::DefaultCreated => "default configuration (created)",
        }
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", key, value, e))
}

fn parse_nonzero<T>(key: &str, value: &str, build: impl FnOnce(u64) -> Option<T>) -> Result<T> {
    let raw: u64 = parse_env(key, value)?;
    build(raw).ok_or_else(|| anyhow::anyhow!("{} must be greater than 0", key))
}

/// Apply overrides using `lookup` to read variables
///
/// Returns whether any variable was present.
pub(crate) fn apply_env_overrides_with(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<bool> {
    let mut applied = false;

    if let Some(root) = lookup(ENV_ROOT) {
        config.server.root = PathBuf::from(root);
        applied = true;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = parse_env::<Port>(ENV_PORT, &port)?;
        applied = true;
    }
    if let Some(hostname) = lookup(ENV_HOSTNAME) {
        config.server.hostname = HostName::new(hostname)
            .with_context(|| format!("Invalid value for {}", ENV_HOSTNAME))?;
        applied = true;
    }
    if let Some(bind_host) = lookup(ENV_BIND_HOST) {
        config.server.bind_host = bind_host;
        applied = true;
    }
    if let Some(max) = lookup(ENV_MAX_FILE_BYTES) {
        config.limits.max_file_bytes = parse_nonzero(ENV_MAX_FILE_BYTES, &max, MaxFileBytes::new)?;
        applied = true;
    }
    if let Some(max) = lookup(ENV_MAX_REQUESTS) {
        config.rate_limit.max_requests = parse_nonzero(ENV_MAX_REQUESTS, &max, |v| {
            u32::try_from(v).ok().and_then(RequestCeiling::new)
        })?;
        applied = true;
    }
    if let Some(ms) = lookup(ENV_RATE_WINDOW_MS) {
        config.rate_limit.window = Duration::from_millis(parse_env(ENV_RATE_WINDOW_MS, &ms)?);
        applied = true;
    }
    if let Some(ms) = lookup(ENV_CONNECTION_TIMEOUT_MS) {
        config.limits.connection_timeout =
            Duration::from_millis(parse_env(ENV_CONNECTION_TIMEOUT_MS, &ms)?);
        applied = true;
    }

    Ok(applied)
}

/// Apply `GOPHER_*` environment overrides to `config`
pub fn apply_env_overrides(config: &mut Config) -> Result<bool> {
    apply_env_overrides_with(config, |key| std::env::var(key).ok())
}

/// Whether any `GOPHER_*` configuration variable is set
#[must_use]
pub fn has_env_vars() -> bool {
    ENV_VARS.iter().any(|key| std::env::var_os(key).is_some())
}

/// Load configuration from a TOML file, with environment variable overrides
pub fn load_config(config_path: &str) -> Result<Config> {
    let config_content = std::fs::read_to_string(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", config_path, e))?;

    let mut config: Config = toml::from_str(&config_content)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", config_path, e))?;

    if apply_env_overrides(&mut config)? {
        tracing::info!("Applied GOPHER_* environment overrides on top of config file");
    }

    config.validate()?;
    Ok(config)
}

/// Build configuration purely from defaults plus environment variables
pub fn load_config_from_env() -> Result<Config> {
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Default configuration written when nothing else is available
#[must_use]
pub fn create_default_config() -> Config {
    Config::default()
}

/// Load config from file, else environment, else write defaults to `config_path`
pub fn load_config_with_fallback(config_path: &str) -> Result<(Config, ConfigSource)> {
    if Path::new(config_path).exists() {
        return Ok((load_config(config_path)?, ConfigSource::File));
    }

    if has_env_vars() {
        return Ok((load_config_from_env()?, ConfigSource::Environment));
    }

    let config = create_default_config();
    let content =
        toml::to_string_pretty(&config).context("Failed to serialize default configuration")?;
    std::fs::write(config_path, content)
        .with_context(|| format!("Failed to write default config to '{}'", config_path))?;
    tracing::warn!(
        "Config file '{}' not found; wrote defaults (edit server.root before serving)",
        config_path
    );
    Ok((config, ConfigSource::DefaultCreated))
}
