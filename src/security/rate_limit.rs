//! Per-client request rate limiting
//!
//! Fixed windows keyed by client IP. Each window opens on the first request
//! after the previous one expired; expired windows are reset lazily on the
//! next request and evicted in bulk by [`RateLimiter::purge_expired`].
//!
//! Check and increment happen under the DashMap entry lock, so concurrent
//! connections from one address cannot both slip under the ceiling.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::GopherError;
use crate::types::RequestCeiling;

/// Counter for one client's current window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateState {
    pub count: u32,
    pub window_reset_at: Instant,
}

impl RateState {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.window_reset_at
    }
}

/// Shared, cloneable rate limiter
///
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    entries: Arc<DashMap<IpAddr, RateState>>,
    max_requests: RequestCeiling,
    window: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_requests: RequestCeiling, window: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_requests,
            window,
        }
    }

    #[must_use]
    pub fn max_requests(&self) -> RequestCeiling {
        self.max_requests
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `client`, rejecting it once the ceiling is hit
    pub fn check(&self, client: IpAddr) -> Result<(), GopherError> {
        self.check_at(client, Instant::now())
    }

    pub(crate) fn check_at(&self, client: IpAddr, now: Instant) -> Result<(), GopherError> {
        let max = self.max_requests.get();
        let mut entry = self.entries.entry(client).or_insert(RateState {
            count: 0,
            window_reset_at: now + self.window,
        });
        let state = entry.value_mut();

        if state.is_expired(now) {
            state.count = 1;
            state.window_reset_at = now + self.window;
            return Ok(());
        }

        if state.count >= max {
            debug!(client = %client, requests = state.count, max, "Rate limit exceeded");
            return Err(GopherError::RateLimitExceeded { client });
        }

        state.count += 1;
        Ok(())
    }

    /// Drop every entry whose window has expired, returning how many went
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, state| !state.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of client addresses currently tracked
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Spawn a task that purges expired windows every `interval`
    ///
    /// The caller owns the handle and aborts it on shutdown.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let purged = limiter.purge_expired();
                if purged > 0 {
                    debug!(
                        purged,
                        remaining = limiter.tracked_clients(),
                        "Purged expired rate-limit windows"
                    );
                }
            }
        })
    }
}
