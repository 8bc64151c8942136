//! Directory menus

use std::path::Path;

use tracing::debug;

use super::FileSystem;
use super::classifier::classify;
use crate::constants::filesystem::HIDDEN_PREFIX;
use crate::constants::protocol::PARENT_LABEL;
use crate::error::GopherError;
use crate::protocol::{Item, ItemType};
use crate::types::{HostName, Port};

/// Builds menu items for a directory, advertising the server's own address
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    hostname: HostName,
    port: Port,
}

impl DirectoryLister {
    #[must_use]
    pub fn new(hostname: HostName, port: Port) -> Self {
        Self { hostname, port }
    }

    /// List the direct children of `dir`
    ///
    /// Hidden entries are skipped. Directories come before files, each group
    /// ordered by label. Below the root, a `..` entry pointing at the parent
    /// is placed first.
    pub async fn list(&self, fs: &FileSystem, dir: &Path) -> Result<Vec<Item>, GopherError> {
        let selector = fs.relative_selector(dir);
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?;

        let mut entries: Vec<(bool, String, Item)> = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(HIDDEN_PREFIX) {
                continue;
            }

            let path = entry.path();
            // Follows symlinks; dangling links are left out
            let is_directory = match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() || meta.is_file() => meta.is_dir(),
                Ok(_) => {
                    debug!(entry = %name, "Skipping non-regular entry");
                    continue;
                }
                Err(e) => {
                    debug!(entry = %name, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let item = Item::new(
                classify(&path, is_directory),
                &name,
                &fs.relative_selector(&path),
                &self.hostname,
                self.port,
            );
            entries.push((is_directory, name, item));
        }

        entries.sort_by(|(a_dir, a_name, _), (b_dir, b_name, _)| {
            b_dir.cmp(a_dir).then_with(|| a_name.cmp(b_name))
        });

        let mut items = Vec::with_capacity(entries.len() + 1);
        if !fs.is_root(dir)
            && let Some(parent) = dir.parent()
        {
            items.push(Item::new(
                ItemType::Directory,
                PARENT_LABEL,
                &fs.relative_selector(parent),
                &self.hostname,
                self.port,
            ));
        }
        items.extend(entries.into_iter().map(|(_, _, item)| item));
        Ok(items)
    }
}
