//! Error taxonomy for the request pipeline
//!
//! Every failure a request can hit maps to exactly one [`GopherError`]
//! variant. The connection handler turns it into a one-item error menu, so
//! nothing here ever reaches the wire as a raw message: clients only see
//! [`GopherError::client_message`], never host paths or OS error text.

use std::fmt;
use std::io;

use thiserror::Error;

/// Errors produced while handling a single request
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GopherError {
    /// Selector tried to escape the sandbox root
    #[error("path traversal attempt in selector {selector:?}")]
    PathTraversal { selector: String },

    /// Selector longer than the protocol maximum
    #[error("selector is {len} bytes, maximum is {max}")]
    SelectorTooLong { len: usize, max: usize },

    /// Selector contains characters outside the printable ASCII range
    #[error("selector contains invalid characters")]
    InvalidSelector,

    /// Client exceeded its request budget for the current window
    #[error("rate limit exceeded for {client}")]
    RateLimitExceeded { client: std::net::IpAddr },

    /// Resource does not exist
    #[error("resource not found: {selector}")]
    NotFound { selector: String },

    /// OS refused access to the resource
    #[error("permission denied: {selector}")]
    PermissionDenied { selector: String },

    /// File is larger than the configured ceiling
    #[error("file {selector} is {size} bytes, maximum is {max}")]
    FileTooLarge { selector: String, size: u64, max: u64 },

    /// File extension is on the forbidden list
    #[error("file type not allowed: {selector}")]
    ForbiddenFileType { selector: String },

    /// Any other filesystem failure
    #[error("filesystem error on {selector}: {source}")]
    Filesystem {
        selector: String,
        #[source]
        source: io::Error,
    },

    /// Request line exceeded the configured byte ceiling
    #[error("request exceeds {max} bytes")]
    RequestTooLarge { max: usize },

    /// Anything unclassified
    #[error("internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`GopherError`], cheap to copy into log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PathTraversal,
    SelectorTooLong,
    InvalidSelector,
    RateLimitExceeded,
    NotFound,
    PermissionDenied,
    FileTooLarge,
    ForbiddenFileType,
    FilesystemError,
    RequestTooLarge,
    InternalError,
}

impl ErrorKind {
    /// Stable name used in structured log fields
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PathTraversal => "PathTraversal",
            Self::SelectorTooLong => "SelectorTooLong",
            Self::InvalidSelector => "InvalidSelector",
            Self::RateLimitExceeded => "RateLimitExceeded",
            Self::NotFound => "NotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::FileTooLarge => "FileTooLarge",
            Self::ForbiddenFileType => "ForbiddenFileType",
            Self::FilesystemError => "FilesystemError",
            Self::RequestTooLarge => "RequestTooLarge",
            Self::InternalError => "InternalError",
        }
    }

    /// Whether this kind comes from the security validator
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal
                | Self::SelectorTooLong
                | Self::InvalidSelector
                | Self::RateLimitExceeded
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GopherError {
    /// Map an I/O error on `selector` into the taxonomy
    #[must_use]
    pub fn from_io(err: io::Error, selector: impl Into<String>) -> Self {
        let selector = selector.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { selector },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { selector },
            _ => Self::Filesystem {
                selector,
                source: err,
            },
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PathTraversal { .. } => ErrorKind::PathTraversal,
            Self::SelectorTooLong { .. } => ErrorKind::SelectorTooLong,
            Self::InvalidSelector => ErrorKind::InvalidSelector,
            Self::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::ForbiddenFileType { .. } => ErrorKind::ForbiddenFileType,
            Self::Filesystem { .. } => ErrorKind::FilesystemError,
            Self::RequestTooLarge { .. } => ErrorKind::RequestTooLarge,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Human-readable text placed in the error menu item
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::PathTraversal { .. } => "Access denied: path traversal detected".to_string(),
            Self::SelectorTooLong { max, .. } => {
                format!("Selector too long (maximum {} characters)", max)
            }
            Self::InvalidSelector => "Invalid characters in selector".to_string(),
            Self::RateLimitExceeded { .. } => {
                "Rate limit exceeded, please try again later".to_string()
            }
            Self::NotFound { selector } => format!("Resource not found: {}", selector),
            Self::PermissionDenied { .. } => "Permission denied".to_string(),
            Self::FileTooLarge { max, .. } => {
                format!("File too large (maximum {})", crate::formatting::format_bytes(*max))
            }
            Self::ForbiddenFileType { .. } => "File type not allowed".to_string(),
            Self::Filesystem { .. } => "Filesystem error".to_string(),
            Self::RequestTooLarge { max } => format!("Request too large (maximum {} bytes)", max),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// HTTP-style status describing the failure class
    #[must_use]
    pub const fn suggested_status(&self) -> u16 {
        match self {
            Self::SelectorTooLong { .. } | Self::InvalidSelector => 400,
            Self::PathTraversal { .. }
            | Self::PermissionDenied { .. }
            | Self::ForbiddenFileType { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::FileTooLarge { .. } | Self::RequestTooLarge { .. } => 413,
            Self::RateLimitExceeded { .. } => 429,
            Self::Filesystem { .. } | Self::Internal(_) => 500,
        }
    }

    /// Log level appropriate for this error
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        match self {
            // Probing and abuse deserve attention
            Self::PathTraversal { .. } | Self::RateLimitExceeded { .. } => tracing::Level::WARN,
            Self::Filesystem { .. } | Self::Internal(_) => tracing::Level::ERROR,
            Self::SelectorTooLong { .. } | Self::InvalidSelector => tracing::Level::INFO,
            // Ordinary client mistakes
            _ => tracing::Level::DEBUG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_from_io_not_found() {
        let err = GopherError::from_io(io::Error::from(io::ErrorKind::NotFound), "/missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.client_message(), "Resource not found: /missing");
        assert_eq!(err.suggested_status(), 404);
    }

    #[test]
    fn test_from_io_permission_denied() {
        let err = GopherError::from_io(
            io::Error::from(io::ErrorKind::PermissionDenied),
            "/secret",
        );
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.suggested_status(), 403);
    }

    #[test]
    fn test_from_io_other_keeps_source() {
        let err = GopherError::from_io(io::Error::other("disk on fire"), "/data");
        assert_eq!(err.kind(), ErrorKind::FilesystemError);
        assert!(err.source().is_some());
        // OS detail stays out of the client message
        assert!(!err.client_message().contains("disk on fire"));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_security_kinds() {
        assert!(ErrorKind::PathTraversal.is_security());
        assert!(ErrorKind::RateLimitExceeded.is_security());
        assert!(ErrorKind::SelectorTooLong.is_security());
        assert!(ErrorKind::InvalidSelector.is_security());
        assert!(!ErrorKind::NotFound.is_security());
        assert!(!ErrorKind::RequestTooLarge.is_security());
    }

    #[test]
    fn test_statuses() {
        let cases = [
            (GopherError::InvalidSelector, 400),
            (GopherError::SelectorTooLong { len: 300, max: 255 }, 400),
            (
                GopherError::PathTraversal {
                    selector: "/../etc".into(),
                },
                403,
            ),
            (GopherError::RequestTooLarge { max: 1024 }, 413),
            (
                GopherError::RateLimitExceeded {
                    client: "127.0.0.1".parse().unwrap(),
                },
                429,
            ),
            (GopherError::Internal("boom".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.suggested_status(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_file_too_large_message_is_human_readable() {
        let err = GopherError::FileTooLarge {
            selector: "/big.iso".into(),
            size: 20 * 1024 * 1024,
            max: 10 * 1024 * 1024,
        };
        assert_eq!(err.client_message(), "File too large (maximum 10.00 MB)");
    }

    #[test]
    fn test_log_levels() {
        let traversal = GopherError::PathTraversal {
            selector: "..".into(),
        };
        assert_eq!(traversal.log_level(), tracing::Level::WARN);
        assert_eq!(
            GopherError::Internal("x".into()).log_level(),
            tracing::Level::ERROR
        );
        assert_eq!(GopherError::InvalidSelector.log_level(), tracing::Level::INFO);
        assert_eq!(
            GopherError::NotFound {
                selector: "/x".into()
            }
            .log_level(),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::FilesystemError.to_string(), "FilesystemError");
        assert_eq!(ErrorKind::InternalError.as_str(), "InternalError");
    }
}
