//! Request processing
//!
//! Takes a parsed request through authorization, path resolution and the
//! file/directory/search branch, producing exactly one [`Response`] or one
//! [`GopherError`].

use std::net::IpAddr;
use std::sync::Arc;

use tracing::debug;

use crate::config::SandboxConfig;
use crate::constants::protocol::PARENT_LABEL;
use crate::error::GopherError;
use crate::filesystem::{DirectoryLister, FileSystem};
use crate::protocol::{Item, Request, Response};
use crate::security::{RateLimiter, SecurityValidator};

/// Shared request processor; cheap to clone per connection
#[derive(Debug, Clone)]
pub struct ProtocolEngine {
    sandbox: Arc<SandboxConfig>,
    fs: FileSystem,
    lister: DirectoryLister,
    validator: SecurityValidator,
}

impl ProtocolEngine {
    #[must_use]
    pub fn new(sandbox: Arc<SandboxConfig>, rate_limiter: RateLimiter) -> Self {
        let fs = FileSystem::new(
            sandbox.root.clone(),
            sandbox.max_file_bytes,
            sandbox.forbidden_extensions.clone(),
        );
        let lister = DirectoryLister::new(sandbox.hostname.clone(), sandbox.port);
        Self {
            sandbox,
            fs,
            lister,
            validator: SecurityValidator::new(rate_limiter),
        }
    }

    #[must_use]
    pub fn sandbox(&self) -> &SandboxConfig {
        &self.sandbox
    }

    /// Handle one request from `client`
    pub async fn process(&self, request: &Request, client: IpAddr) -> Result<Response, GopherError> {
        self.validator.authorize(request, client)?;

        let path = self.fs.resolve(request.selector())?;
        let stat = self.fs.stat(&path).await?;

        if !stat.is_directory {
            if request.is_search() {
                debug!(selector = request.selector(), "Ignoring search terms on file");
            }
            return Ok(Response::File(self.fs.read(&path).await?));
        }

        let items = self.lister.list(&self.fs, &path).await?;
        Ok(Response::Directory(match request.search_terms() {
            Some(terms) => filter_items(items, terms),
            None => items,
        }))
    }
}

/// Keep items whose label or selector contains every term, ignoring case
///
/// The parent entry always survives.
#[must_use]
pub fn filter_items(items: Vec<Item>, terms: &[String]) -> Vec<Item> {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    items
        .into_iter()
        .filter(|item| {
            if item.display() == PARENT_LABEL && item.item_type().is_directory() {
                return true;
            }
            let label = item.display().to_lowercase();
            let selector = item.selector().to_lowercase();
            terms
                .iter()
                .all(|term| label.contains(term.as_str()) || selector.contains(term.as_str()))
        })
        .collect()
}
