//! # gopher-server
//!
//! A sandboxed Gopher (RFC 1436) server built on tokio.
//!
//! Each connection carries one request: a selector line, optionally followed
//! by a TAB and search terms. The server answers with a menu, a file, or a
//! one-item error menu, always terminated by a lone `.` line, then closes.
//!
//! ## Request pipeline
//!
//! 1. [`protocol::Request::parse`] splits selector and search terms
//! 2. [`security::SecurityValidator`] rejects traversal, rate-limit and
//!    malformed selectors, in that order
//! 3. [`filesystem::FileSystem`] resolves the selector under the sandbox root
//!    and reads files or lists directories
//! 4. [`protocol::Response`] renders the wire bytes
//!
//! ## Quick start
//!
//! ```no_run
//! use gopher_server::{GopherServer, SandboxConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let sandbox = SandboxConfig::for_root("/srv/gopher")?;
//! let server = GopherServer::new(sandbox);
//! let addr = server.start().await?;
//! println!("listening on {addr}");
//! server.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod filesystem;
pub mod formatting;
pub mod health;
pub mod logging;
pub mod protocol;
pub mod runtime;
pub mod security;
pub mod server;
pub mod session;
pub mod types;

pub use config::{
    Config, ConfigSource, SandboxConfig, create_default_config, load_config,
    load_config_with_fallback,
};
pub use engine::ProtocolEngine;
pub use error::{ErrorKind, GopherError};
pub use health::HealthSnapshot;
pub use server::GopherServer;
