//! Configuration validation
//!
//! Zero and empty values are already rejected by the validated newtypes at
//! deserialization time. This checks the remaining semantic constraints and
//! builds the canonical [`SandboxConfig`].

use anyhow::{Context, Result};
use std::time::Duration;

use super::types::{Config, SandboxConfig};

/// Timeouts below this are legal but likely to drop slow clients
const MIN_RECOMMENDED_TIMEOUT: Duration = Duration::from_secs(1);

impl Config {
    /// Validate configuration for correctness
    ///
    /// - sandbox root is set
    /// - connection timeout and rate window are non-zero
    /// - request ceiling leaves room for at least one byte plus a newline
    pub fn validate(&self) -> Result<()> {
        if self.server.root.as_os_str().is_empty() {
            anyhow::bail!("server.root must not be empty");
        }
        if self.server.bind_host.trim().is_empty() {
            anyhow::bail!("server.bind_host must not be empty");
        }
        if self.limits.connection_timeout.is_zero() {
            anyhow::bail!("limits.connection_timeout_ms must be greater than 0");
        }
        if self.rate_limit.window.is_zero() {
            anyhow::bail!("rate_limit.window_ms must be greater than 0");
        }
        if self.rate_limit.sweep_interval.is_zero() {
            anyhow::bail!("rate_limit.sweep_interval_ms must be greater than 0");
        }
        if self.limits.max_request_bytes.get() < 2 {
            anyhow::bail!("limits.max_request_bytes must be at least 2");
        }

        if self.limits.connection_timeout < MIN_RECOMMENDED_TIMEOUT {
            tracing::warn!(
                "limits.connection_timeout_ms is {:?} (< {:?}); slow clients will be dropped",
                self.limits.connection_timeout,
                MIN_RECOMMENDED_TIMEOUT
            );
        }

        Ok(())
    }

    /// Validate and build the immutable serving configuration
    ///
    /// The root is canonicalized, so it must exist and be a directory.
    pub fn sandbox(&self) -> Result<SandboxConfig> {
        self.validate()?;

        let root = std::fs::canonicalize(&self.server.root).with_context(|| {
            format!(
                "Sandbox root '{}' is not accessible",
                self.server.root.display()
            )
        })?;
        if !root.is_dir() {
            anyhow::bail!("Sandbox root '{}' is not a directory", root.display());
        }

        Ok(SandboxConfig {
            root,
            bind_host: self.server.bind_host.clone(),
            hostname: self.server.hostname.clone(),
            port: self.server.port,
            max_request_bytes: self.limits.max_request_bytes,
            connection_timeout: self.limits.connection_timeout,
            max_file_bytes: self.limits.max_file_bytes,
            forbidden_extensions: self.limits.forbidden_extensions.clone(),
            rate_limit: self.rate_limit.clone(),
        })
    }
}
