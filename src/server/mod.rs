//! Gopher server implementation
//!
//! [`GopherServer`] owns the sandbox configuration, the shared rate limiter
//! and the listener lifecycle.
//!
//! ## Module structure
//!
//! - [`lifecycle`]: accept loop, connection registry and drain

mod lifecycle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{Config, SandboxConfig};
use crate::constants::network::SHUTDOWN_GRACE;
use crate::engine::ProtocolEngine;
use crate::health::HealthSnapshot;
use crate::security::RateLimiter;

use lifecycle::ConnectionRegistry;

/// Background tasks and bookkeeping for one start/stop cycle
#[derive(Debug)]
struct Running {
    local_addr: SocketAddr,
    started_at: Instant,
    accept_task: JoinHandle<()>,
    sweeper_task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct GopherServer {
    sandbox: Arc<SandboxConfig>,
    rate_limiter: RateLimiter,
    engine: ProtocolEngine,
    connections: ConnectionRegistry,
    shutdown_tx: watch::Sender<bool>,
    listening: AtomicBool,
    running: Mutex<Option<Running>>,
}

impl GopherServer {
    /// Create a server for an already validated sandbox
    #[must_use]
    pub fn new(sandbox: SandboxConfig) -> Self {
        let sandbox = Arc::new(sandbox);
        let rate_limiter = RateLimiter::new(
            sandbox.rate_limit.max_requests,
            sandbox.rate_limit.window,
        );
        let engine = ProtocolEngine::new(Arc::clone(&sandbox), rate_limiter.clone());
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            sandbox,
            rate_limiter,
            engine,
            connections: ConnectionRegistry::default(),
            shutdown_tx,
            listening: AtomicBool::new(false),
            running: Mutex::new(None),
        }
    }

    /// Validate `config` and create a server from it
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use gopher_server::{GopherServer, config::load_config};
    /// # #[tokio::main]
    /// # async fn main() -> anyhow::Result<()> {
    /// let config = load_config("config.toml")?;
    /// let server = GopherServer::from_config(&config)?;
    /// let addr = server.start().await?;
    /// println!("serving on {addr}");
    /// server.stop().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.sandbox()?))
    }

    #[must_use]
    pub fn sandbox(&self) -> &SandboxConfig {
        &self.sandbox
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Bind the configured address and start serving
    ///
    /// Bind failures are returned to the caller and are fatal for the
    /// process.
    pub async fn start(&self) -> Result<SocketAddr> {
        let host = self.sandbox.bind_host.as_str();
        let port = self.sandbox.port.get();
        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind {}", self.sandbox.bind_address()))?;
        self.start_with_listener(listener).await
    }

    /// Start serving on a pre-bound listener
    pub async fn start_with_listener(&self, listener: TcpListener) -> Result<SocketAddr> {
        let local_addr = listener
            .local_addr()
            .context("Failed to read listener address")?;

        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            anyhow::bail!("Server is already running");
        }

        self.shutdown_tx.send_replace(false);
        let accept_task = tokio::spawn(lifecycle::accept_loop(
            listener,
            self.engine.clone(),
            self.connections.clone(),
            self.shutdown_tx.subscribe(),
        ));
        let sweeper_task = self
            .rate_limiter
            .spawn_sweeper(self.sandbox.rate_limit.sweep_interval);

        *running = Some(Running {
            local_addr,
            started_at: Instant::now(),
            accept_task,
            sweeper_task,
        });
        self.listening.store(true, Ordering::Release);

        info!(
            event = "server_started",
            address = %local_addr,
            hostname = %self.sandbox.hostname,
            root = %self.sandbox.root.display(),
            "Gopher server listening"
        );
        Ok(local_addr)
    }

    /// Address the listener is bound to, while running
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|r| r.local_addr)
    }

    /// Stop accepting, close every open connection, and wait for them to go
    ///
    /// In-flight requests are dropped, not drained. Calling `stop` on a
    /// server that is not running does nothing.
    pub async fn stop(&self) {
        let Some(running) = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        self.listening.store(false, Ordering::Release);
        self.shutdown_tx.send_replace(true);
        running.sweeper_task.abort();

        if tokio::time::timeout(SHUTDOWN_GRACE, running.accept_task)
            .await
            .is_err()
        {
            warn!("Accept loop did not stop within {:?}", SHUTDOWN_GRACE);
        }

        let remaining = self.connections.wait_drained(SHUTDOWN_GRACE).await;
        if remaining > 0 {
            warn!(remaining, "Connections still open after shutdown grace period");
        }

        info!(
            event = "server_stopped",
            address = %running.local_addr,
            uptime_secs = running.started_at.elapsed().as_secs(),
            "Gopher server stopped"
        );
    }

    /// Liveness snapshot
    #[must_use]
    pub fn health(&self) -> HealthSnapshot {
        let uptime_seconds = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0.0, |r| r.started_at.elapsed().as_secs_f64());

        HealthSnapshot {
            listening: self.listening.load(Ordering::Acquire),
            open_connections: self.connections.len(),
            uptime_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn server() -> (TempDir, GopherServer) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hi\n").unwrap();
        let mut sandbox = SandboxConfig::for_root(dir.path()).unwrap();
        sandbox.bind_host = "127.0.0.1".into();
        (dir, GopherServer::new(sandbox))
    }

    async fn bound() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_health_before_start() {
        let (_dir, server) = server();
        let health = server.health();
        assert!(!health.listening);
        assert_eq!(health.open_connections, 0);
        assert_eq!(health.uptime_seconds, 0.0);
        assert!(server.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_start_serve_stop() {
        let (_dir, server) = server();
        let addr = server.start_with_listener(bound().await).await.unwrap();
        assert!(server.health().listening);
        assert_eq!(server.local_addr(), Some(addr));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"/hello.txt\r\n").await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"hi\n.\r\n");

        server.stop().await;
        assert!(!server.health().listening);
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_double_start_rejected() {
        let (_dir, server) = server();
        server.start_with_listener(bound().await).await.unwrap();
        let err = server.start_with_listener(bound().await).await.unwrap_err();
        assert!(err.to_string().contains("already running"));
        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let (_dir, server) = server();
        server.stop().await;
        server.start_with_listener(bound().await).await.unwrap();
        server.stop().await;
        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_closes_open_connections() {
        let (_dir, server) = server();
        let addr = server.start_with_listener(bound().await).await.unwrap();

        // Connected but silent: held open until the idle timeout
        let mut idle = TcpStream::connect(addr).await.unwrap();
        for _ in 0..100 {
            if server.health().open_connections == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(server.health().open_connections, 1);

        server.stop().await;
        assert_eq!(server.health().open_connections, 0);

        let mut buf = Vec::new();
        let n = idle.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_bind_failure_is_error() {
        let (_dir, server) = server();
        let taken = bound().await;
        let mut sandbox = server.sandbox().clone();
        sandbox.port = crate::types::Port::new(taken.local_addr().unwrap().port()).unwrap();
        let other = GopherServer::new(sandbox);
        let err = other.start().await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind"));
    }
}
