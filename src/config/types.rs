//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::types::{
    HostName, MaxFileBytes, MaxRequestBytes, Port, RequestCeiling, ThreadCount,
    duration_millis_serde,
};

/// Top-level configuration as read from `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Listener, advertised address and sandbox root
    #[serde(default)]
    pub server: Server,
    /// Request, file and timeout ceilings
    #[serde(default)]
    pub limits: Limits,
    /// Per-client request budget
    #[serde(default)]
    pub rate_limit: RateLimit,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Address the listener binds to
    #[serde(default = "defaults::bind_host")]
    pub bind_host: String,
    /// Hostname advertised in menu lines
    #[serde(default)]
    pub hostname: HostName,
    /// Listen port, also advertised in menu lines
    #[serde(default = "default_port")]
    pub port: Port,
    /// Directory served as `/`
    #[serde(default = "defaults::root")]
    pub root: PathBuf,
    /// Tokio worker threads (1 = current-thread runtime)
    #[serde(default)]
    pub threads: ThreadCount,
}

fn default_port() -> Port {
    Port::GOPHER
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind_host: defaults::bind_host(),
            hostname: HostName::default(),
            port: Port::GOPHER,
            root: defaults::root(),
            threads: ThreadCount::default(),
        }
    }
}

/// `[limits]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub max_request_bytes: MaxRequestBytes,
    /// Idle/read timeout per connection
    #[serde(
        rename = "connection_timeout_ms",
        with = "duration_millis_serde",
        default = "defaults::connection_timeout"
    )]
    pub connection_timeout: Duration,
    #[serde(default)]
    pub max_file_bytes: MaxFileBytes,
    /// Extensions refused on read, compared case-insensitively
    #[serde(default)]
    pub forbidden_extensions: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_request_bytes: MaxRequestBytes::default(),
            connection_timeout: defaults::connection_timeout(),
            max_file_bytes: MaxFileBytes::default(),
            forbidden_extensions: Vec::new(),
        }
    }
}

/// `[rate_limit]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Requests allowed per client address per window
    #[serde(default)]
    pub max_requests: RequestCeiling,
    #[serde(
        rename = "window_ms",
        with = "duration_millis_serde",
        default = "defaults::rate_window"
    )]
    pub window: Duration,
    #[serde(
        rename = "sweep_interval_ms",
        with = "duration_millis_serde",
        default = "defaults::sweep_interval"
    )]
    pub sweep_interval: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: RequestCeiling::default(),
            window: defaults::rate_window(),
            sweep_interval: defaults::sweep_interval(),
        }
    }
}

/// Immutable per-process serving configuration
///
/// Built once at startup by [`Config::sandbox`] and shared behind an `Arc`
/// with every connection. `root` is always absolute and canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxConfig {
    pub root: PathBuf,
    pub bind_host: String,
    pub hostname: HostName,
    pub port: Port,
    pub max_request_bytes: MaxRequestBytes,
    pub connection_timeout: Duration,
    pub max_file_bytes: MaxFileBytes,
    pub forbidden_extensions: Vec<String>,
    pub rate_limit: RateLimit,
}

impl SandboxConfig {
    /// Default limits serving `root`, which must be an existing directory
    pub fn for_root(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut config = Config::default();
        config.server.root = root.as_ref().to_path_buf();
        config.sandbox()
    }

    /// Listener address for log lines, bracketing IPv6 literals
    #[must_use]
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        }
    }
}
