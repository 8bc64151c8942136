//! Per-connection request handling
//!
//! One connection carries one request: read a line, process it, write one
//! response followed by the terminator, close. Every [`GopherError`] becomes
//! an error menu on the wire; only socket failures and idle timeouts end the
//! connection without a response.

pub mod error_classification;
mod reader;

pub use error_classification::ErrorClassifier;
pub use reader::{ReadOutcome, read_request_line};

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{Level, debug, info};

use crate::engine::ProtocolEngine;
use crate::error::GopherError;
use crate::protocol::{Request, Response};
use crate::types::SessionId;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A response was written; `status` is the HTTP-like class of the result
    Responded { bytes: usize, status: u16 },
    /// Client closed before sending anything
    ClosedEarly,
    /// No complete request before the idle timeout
    TimedOut,
}

/// State for one client connection
#[derive(Debug)]
pub struct ClientSession {
    id: SessionId,
    client_addr: SocketAddr,
    engine: ProtocolEngine,
}

impl ClientSession {
    #[must_use]
    pub fn new(client_addr: SocketAddr, engine: ProtocolEngine) -> Self {
        Self {
            id: SessionId::new(),
            client_addr,
            engine,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    /// Serve a single request on `stream`
    ///
    /// Returns an error only for socket failures; the caller decides how
    /// loudly to log them via [`ErrorClassifier`].
    pub async fn handle<S>(&self, stream: &mut S) -> io::Result<SessionOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let sandbox = self.engine.sandbox();
        let timeout = sandbox.connection_timeout;
        let max = sandbox.max_request_bytes.get();

        let read = tokio::time::timeout(timeout, read_request_line(&mut *stream, max)).await;
        let (response, status) = match read {
            Err(_) => {
                debug!(client = %self.client_addr, "Timed out waiting for request");
                return Ok(SessionOutcome::TimedOut);
            }
            Ok(read) => match read? {
                ReadOutcome::Closed => {
                    debug!(client = %self.client_addr, "Client closed before sending a request");
                    return Ok(SessionOutcome::ClosedEarly);
                }
                ReadOutcome::TooLarge => {
                    let err = GopherError::RequestTooLarge { max };
                    self.log_failure(&err, "");
                    (Response::error(&err, sandbox.port), err.suggested_status())
                }
                ReadOutcome::Line(line) => self.respond(&Request::parse_bytes(&line)).await,
            },
        };

        let bytes = write_with_timeout(&mut *stream, &response, timeout).await?;
        // Peer may already be gone; the response is complete either way
        let _ = stream.shutdown().await;
        Ok(SessionOutcome::Responded { bytes, status })
    }

    async fn respond(&self, request: &Request) -> (Response, u16) {
        info!(
            event = "request_received",
            session = %self.id.short(),
            client = %self.client_addr,
            selector = request.selector(),
            search = request.is_search(),
            "Request received"
        );

        match self.engine.process(request, self.client_addr.ip()).await {
            Ok(response) => (response, 200),
            Err(err) => {
                self.log_failure(&err, request.selector());
                let status = err.suggested_status();
                (Response::error(&err, self.engine.sandbox().port), status)
            }
        }
    }

    fn log_failure(&self, err: &GopherError, selector: &str) {
        let kind = err.kind();
        let session = self.id.short();
        let client = self.client_addr;
        let event = if kind.is_security() {
            "security_rejected"
        } else {
            "request_failed"
        };

        macro_rules! emit {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    event,
                    kind = %kind,
                    session = %session,
                    client = %client,
                    selector,
                    error = %err,
                    "Request rejected"
                )
            };
        }

        match err.log_level() {
            Level::ERROR => emit!(Level::ERROR),
            Level::WARN => emit!(Level::WARN),
            Level::INFO => emit!(Level::INFO),
            _ => emit!(Level::DEBUG),
        }
    }
}

async fn write_with_timeout<S>(
    stream: &mut S,
    response: &Response,
    timeout: Duration,
) -> io::Result<usize>
where
    S: AsyncWrite + Unpin,
{
    match tokio::time::timeout(timeout, response.write_to(stream)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "timed out writing response",
        )),
    }
}
