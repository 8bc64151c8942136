//! Sandboxed filesystem access
//!
//! Every path handed out by [`FileSystem::resolve`] is the sandbox root
//! joined with a normalized selector and is checked to remain below the
//! root. [`FileSystem::stat`] repeats the check on the canonical path so a
//! symlink cannot lead outside the sandbox.

mod classifier;
mod listing;

pub use classifier::{classify, is_binary};
pub use listing::DirectoryLister;

use std::path::{Component, Path, PathBuf};

use tokio::io::AsyncReadExt;

use crate::constants::protocol::ROOT_SELECTOR;
use crate::error::GopherError;
use crate::protocol::Payload;
use crate::types::MaxFileBytes;

/// Result of [`FileSystem::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub is_directory: bool,
    pub size: u64,
}

/// Read-only view of the sandbox root
#[derive(Debug, Clone)]
pub struct FileSystem {
    root: PathBuf,
    max_file_bytes: MaxFileBytes,
    forbidden_extensions: Vec<String>,
}

impl FileSystem {
    /// `root` must already be absolute and canonical
    #[must_use]
    pub fn new(root: PathBuf, max_file_bytes: MaxFileBytes, forbidden_extensions: Vec<String>) -> Self {
        Self {
            root,
            max_file_bytes,
            forbidden_extensions,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Map a selector onto an absolute path below the root
    ///
    /// Empty and `.` segments are dropped; a `..` segment fails outright.
    ///
    /// # Examples
    /// ```
    /// use std::path::PathBuf;
    /// use gopher_server::filesystem::FileSystem;
    /// use gopher_server::types::MaxFileBytes;
    ///
    /// let fs = FileSystem::new(PathBuf::from("/srv/gopher"), MaxFileBytes::DEFAULT, vec![]);
    /// assert_eq!(fs.resolve("/docs//./a.txt").unwrap(), PathBuf::from("/srv/gopher/docs/a.txt"));
    /// assert!(fs.resolve("/docs/../../etc").is_err());
    /// ```
    pub fn resolve(&self, selector: &str) -> Result<PathBuf, GopherError> {
        let mut path = self.root.clone();
        for segment in selector.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(traversal(selector)),
                s => path.push(s),
            }
        }

        // Joining a segment that is itself absolute would replace the root
        if !path.starts_with(&self.root)
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(traversal(selector));
        }
        Ok(path)
    }

    /// Root-relative, slash-separated selector for a path below the root
    #[must_use]
    pub fn relative_selector(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return ROOT_SELECTOR.to_string();
        };

        let mut selector = String::new();
        for component in relative.components() {
            selector.push('/');
            selector.push_str(&component.as_os_str().to_string_lossy());
        }
        if selector.is_empty() {
            selector.push_str(ROOT_SELECTOR);
        }
        selector
    }

    /// Metadata for `path`, following symlinks only within the sandbox
    pub async fn stat(&self, path: &Path) -> Result<FileStat, GopherError> {
        let selector = self.relative_selector(path);
        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?;

        if !canonical.starts_with(&self.root) {
            return Err(traversal(&selector));
        }

        let metadata = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?;

        // Opening a FIFO or device would block or stream forever
        if !metadata.is_dir() && !metadata.is_file() {
            return Err(GopherError::ForbiddenFileType { selector });
        }

        Ok(FileStat {
            is_directory: metadata.is_dir(),
            size: metadata.len(),
        })
    }

    /// Read a file's contents, enforcing the size ceiling and type policy
    ///
    /// Files with a binary extension come back as [`Payload::Binary`];
    /// everything else is [`Payload::Text`] whatever its encoding.
    pub async fn read(&self, path: &Path) -> Result<Payload, GopherError> {
        let selector = self.relative_selector(path);

        if classifier::is_forbidden(path, &self.forbidden_extensions) {
            return Err(GopherError::ForbiddenFileType { selector });
        }

        let max = self.max_file_bytes.get();
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?
            .len();
        if size > max {
            return Err(GopherError::FileTooLarge {
                selector,
                size,
                max,
            });
        }

        // The file may grow between the size check and the read
        let mut bytes = Vec::with_capacity(size as usize);
        file.take(max + 1)
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| GopherError::from_io(e, selector.clone()))?;
        if bytes.len() as u64 > max {
            return Err(GopherError::FileTooLarge {
                selector,
                size: bytes.len() as u64,
                max,
            });
        }

        Ok(if is_binary(path) {
            Payload::Binary(bytes)
        } else {
            Payload::Text(bytes)
        })
    }
}

fn traversal(selector: &str) -> GopherError {
    GopherError::PathTraversal {
        selector: selector.to_string(),
    }
}
