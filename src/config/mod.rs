//! Configuration module
//!
//! TOML configuration, `GOPHER_*` environment overrides, and the validated
//! [`SandboxConfig`] handed to the server.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{
    ConfigSource, ENV_BIND_HOST, ENV_CONNECTION_TIMEOUT_MS, ENV_HOSTNAME, ENV_MAX_FILE_BYTES,
    ENV_MAX_REQUESTS, ENV_PORT, ENV_RATE_WINDOW_MS, ENV_ROOT, apply_env_overrides,
    create_default_config, has_env_vars, load_config, load_config_from_env,
    load_config_with_fallback,
};
pub use types::{Config, Limits, RateLimit, SandboxConfig, Server};
