//! Liveness reporting

use serde::{Deserialize, Serialize};

/// Point-in-time server health
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Accept loop is running
    pub listening: bool,
    /// Connections currently being served
    pub open_connections: usize,
    /// Seconds since the listener started, 0 when stopped
    pub uptime_seconds: f64,
}

impl HealthSnapshot {
    /// Snapshot of a server that is not listening
    #[must_use]
    pub const fn stopped() -> Self {
        Self {
            listening: false,
            open_connections: 0,
            uptime_seconds: 0.0,
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.listening
    }
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self::stopped()
    }
}
