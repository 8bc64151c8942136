//! Core value types shared across the server
//!
//! Validated configuration newtypes live in [`config`] and [`validated`];
//! per-connection identifiers live here.

pub mod config;
pub mod validated;

pub use config::{
    MaxFileBytes, MaxRequestBytes, Port, RequestCeiling, ThreadCount, duration_millis_serde,
};
pub use validated::{HostName, ValidationError};

use uuid::Uuid;

/// Unique identifier for a single client connection
///
/// Used to correlate the log lines of one request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new unique session ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short form for log lines (first 8 hex characters)
    #[must_use]
    pub fn short(&self) -> String {
        crate::formatting::short_id(&self.0)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
