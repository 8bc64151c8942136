//! Constants used throughout the Gopher server
//!
//! This module centralizes protocol literals and operational limits.

use std::time::Duration;

/// Wire-level protocol constants (RFC 1436)
pub mod protocol {
    /// Line terminator for every menu line and the end marker
    pub const CRLF: &[u8] = b"\r\n";

    /// End-of-response marker: a lone `.` line
    pub const TERMINATOR_STR: &str = ".\r\n";

    /// [`TERMINATOR_STR`] as bytes
    pub const TERMINATOR: &[u8] = TERMINATOR_STR.as_bytes();

    /// Field separator inside requests and menu lines
    pub const TAB: char = '\t';

    /// Selector that names the sandbox root
    pub const ROOT_SELECTOR: &str = "/";

    /// Selector and hostname used on error items
    pub const ERROR_SELECTOR: &str = "error";

    /// Label of the synthetic parent-directory entry
    pub const PARENT_LABEL: &str = "..";

    /// Longest display label before truncation
    pub const MAX_DISPLAY_LABEL: usize = 67;
}

/// Security validation limits
pub mod security {
    /// Longest selector accepted, in bytes
    pub const MAX_SELECTOR_LENGTH: usize = 255;

    /// Literal or encoded sequences rejected before path resolution
    ///
    /// Matched case-insensitively against the raw selector.
    pub const TRAVERSAL_PATTERNS: &[&str] = &[
        "..",
        "%2e%2e",
        "%2e.",
        ".%2e",
        "%2f",
        "%5c",
        "%00",
        "\\",
        "\0",
    ];
}

/// Filesystem policy
pub mod filesystem {
    /// Names beginning with this are never listed
    pub const HIDDEN_PREFIX: char = '.';

    /// Extensions read and sent as opaque binary
    ///
    /// Images, archives, executables, documents and media.
    pub const BINARY_EXTENSIONS: &[&str] = &[
        // images
        "gif", "jpg", "jpeg", "png", "bmp", "ico", "webp", "tif", "tiff",
        // archives
        "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar",
        // executables
        "exe", "bin", "dll", "so", "dmg", "iso",
        // documents
        "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt",
        // media
        "mp3", "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv",
    ];
}

/// Network and lifecycle defaults
pub mod network {
    use super::Duration;

    /// Read chunk size while accumulating a request line
    pub const READ_CHUNK: usize = 512;

    /// How long `stop()` waits for the accept loop to notice shutdown
    pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
}
