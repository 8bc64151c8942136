//! Accept loop, connection tracking and drain
//!
//! Each connection task registers itself in a [`ConnectionRegistry`] and is
//! removed by its guard on exit, however the task ends. Shutdown is a watch
//! channel flip: the accept loop stops and every connection task drops its
//! socket mid-request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Notify, watch};
use tracing::{Instrument, debug, info_span, warn};

use crate::engine::ProtocolEngine;
use crate::session::{ClientSession, ErrorClassifier, SessionOutcome};

/// Pause after a failed accept (e.g. file descriptor exhaustion)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Set of live connections, shared between the accept loop and the server
#[derive(Debug, Clone, Default)]
pub(super) struct ConnectionRegistry {
    entries: Arc<DashMap<u64, SocketAddr>>,
    next_id: Arc<AtomicU64>,
    drained: Arc<Notify>,
}

impl ConnectionRegistry {
    pub(super) fn register(&self, addr: SocketAddr) -> ConnectionGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(id, addr);
        ConnectionGuard {
            id,
            registry: self.clone(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wait until every connection has closed or `grace` elapses
    ///
    /// Returns the number of connections still open.
    pub(super) async fn wait_drained(&self, grace: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + grace;
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_empty() {
                return 0;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.len();
            }
        }
    }
}

/// Removes its connection from the registry when dropped
pub(super) struct ConnectionGuard {
    id: u64,
    registry: ConnectionRegistry,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.entries.remove(&self.id);
        if self.registry.entries.is_empty() {
            self.registry.drained.notify_waiters();
        }
    }
}

/// Accept connections until shutdown is signalled
pub(super) async fn accept_loop(
    listener: TcpListener,
    engine: ProtocolEngine,
    registry: ConnectionRegistry,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                debug!("Shutdown initiated, stopping accept loop");
                break;
            }

            accept_result = listener.accept() => match accept_result {
                Ok((stream, addr)) => {
                    spawn_connection(stream, addr, engine.clone(), &registry, shutdown_rx.clone());
                }
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            },
        }
    }
}

fn spawn_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    engine: ProtocolEngine,
    registry: &ConnectionRegistry,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let guard = registry.register(addr);
    let session = ClientSession::new(addr, engine);
    let span = info_span!("session", id = %session.id().short(), client = %addr);

    tokio::spawn(
        async move {
            let _guard = guard;
            debug!(event = "connection_opened", "Connection opened");

            if *shutdown_rx.borrow_and_update() {
                return;
            }

            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("Closing connection for shutdown");
                }
                result = session.handle(&mut stream) => match result {
                    Ok(SessionOutcome::Responded { bytes, status }) => {
                        debug!(
                            event = "connection_closed",
                            bytes,
                            status,
                            sent = %crate::formatting::format_bytes(bytes as u64),
                            "Connection closed"
                        );
                    }
                    Ok(outcome) => {
                        debug!(event = "connection_closed", ?outcome, "Connection closed");
                    }
                    Err(e) if ErrorClassifier::is_expected(&e) => {
                        debug!(event = "connection_closed", error = %e, "Client went away");
                    }
                    Err(e) => {
                        warn!(event = "connection_closed", error = %e, "Connection failed");
                    }
                },
            }
        }
        .instrument(span),
    );
}
