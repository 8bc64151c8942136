//! Command-line arguments for the `gopher-server` binary
//!
//! Every flag can also be set through the environment; flags override values
//! from the configuration file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::types::{HostName, Port, ThreadCount};

/// Parse port from command line argument
fn parse_port(s: &str) -> Result<Port, String> {
    s.parse::<Port>().map_err(|e| format!("Invalid port: {e}"))
}

fn parse_hostname(s: &str) -> Result<HostName, String> {
    HostName::new(s.to_string()).map_err(|e| e.to_string())
}

/// Sandboxed Gopher server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (created with defaults if missing)
    #[arg(short, long, default_value = "config.toml", env = "GOPHER_CONFIG")]
    pub config: String,

    /// Port to listen on and advertise (overrides config file)
    #[arg(short, long, env = "GOPHER_PORT", value_parser = parse_port)]
    pub port: Option<Port>,

    /// Address to bind to (overrides config file)
    #[arg(long, env = "GOPHER_BIND_HOST")]
    pub bind_host: Option<String>,

    /// Hostname advertised in menu lines (overrides config file)
    #[arg(long, env = "GOPHER_HOSTNAME", value_parser = parse_hostname)]
    pub hostname: Option<HostName>,

    /// Directory served as the root selector (overrides config file)
    #[arg(short, long, env = "GOPHER_ROOT")]
    pub root: Option<PathBuf>,

    /// Number of worker threads (default: 1, use 0 for CPU cores)
    #[arg(short, long, env = "GOPHER_THREADS")]
    pub threads: Option<ThreadCount>,

    /// Also write logs to this file
    #[arg(long, env = "GOPHER_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Copy every flag that was given onto `config`
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.bind_host {
            config.server.bind_host.clone_from(host);
        }
        if let Some(hostname) = &self.hostname {
            config.server.hostname = hostname.clone();
        }
        if let Some(root) = &self.root {
            config.server.root.clone_from(root);
        }
        if let Some(threads) = self.threads {
            config.server.threads = threads;
        }
    }

    /// Worker threads: flag first, then the config file
    #[must_use]
    pub fn effective_threads(&self, config: &Config) -> ThreadCount {
        self.threads.unwrap_or(config.server.threads)
    }
}
