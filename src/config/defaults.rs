//! Default values for configuration fields
//!
//! Used by serde `default = "..."` attributes and the `Default` impls.

use std::path::PathBuf;
use std::time::Duration;

/// Listen on every interface
#[inline]
pub fn bind_host() -> String {
    "0.0.0.0".to_string()
}

/// Default sandbox root
#[inline]
pub fn root() -> PathBuf {
    PathBuf::from("/var/gopher")
}

/// Idle/read timeout per connection (30 seconds)
#[inline]
pub fn connection_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Rate-limit window (1 minute)
#[inline]
pub fn rate_window() -> Duration {
    Duration::from_secs(60)
}

/// How often expired rate-limit windows are swept (1 minute)
#[inline]
pub fn sweep_interval() -> Duration {
    Duration::from_secs(60)
}
