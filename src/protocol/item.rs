//! Menu items and their single-character type tags

use std::fmt;

use crate::constants::protocol::{ERROR_SELECTOR, MAX_DISPLAY_LABEL, TAB};
use crate::formatting::{sanitize_field, truncate_label};
use crate::types::{HostName, Port};

/// Closed set of item types this server emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    /// `0` plain text file
    File,
    /// `1` directory / submenu
    Directory,
    /// `3` error
    Error,
    /// `9` binary file
    Binary,
    /// `g` GIF image
    Gif,
    /// `I` other image
    Image,
    /// `h` HTML document
    Html,
    /// `7` search server
    Search,
    /// `i` informational line
    Info,
}

impl ItemType {
    /// All tags, in wire-code order
    pub const ALL: [Self; 9] = [
        Self::File,
        Self::Directory,
        Self::Error,
        Self::Binary,
        Self::Gif,
        Self::Image,
        Self::Html,
        Self::Search,
        Self::Info,
    ];

    /// Wire code
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::File => '0',
            Self::Directory => '1',
            Self::Error => '3',
            Self::Binary => '9',
            Self::Gif => 'g',
            Self::Image => 'I',
            Self::Html => 'h',
            Self::Search => '7',
            Self::Info => 'i',
        }
    }

    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One line of a directory menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    item_type: ItemType,
    display: String,
    selector: String,
    hostname: String,
    port: Port,
}

impl Item {
    /// Create an item, truncating the label and scrubbing framing characters
    pub fn new(
        item_type: ItemType,
        display: &str,
        selector: &str,
        hostname: &HostName,
        port: Port,
    ) -> Self {
        Self {
            item_type,
            display: truncate_label(&sanitize_field(display), MAX_DISPLAY_LABEL),
            selector: sanitize_field(selector),
            hostname: hostname.to_string(),
            port,
        }
    }

    /// Error item carrying `message`, addressed to the `error` pseudo-host
    pub fn error(message: &str, port: Port) -> Self {
        Self {
            item_type: ItemType::Error,
            display: truncate_label(&sanitize_field(message), MAX_DISPLAY_LABEL),
            selector: ERROR_SELECTOR.to_string(),
            hostname: ERROR_SELECTOR.to_string(),
            port,
        }
    }

    #[must_use]
    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    #[must_use]
    pub fn port(&self) -> Port {
        self.port
    }

    /// Render as `<tag><label>\t<selector>\t<host>\t<port>\r\n`
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}{}{TAB}{}{TAB}{}{TAB}{}\r\n",
            self.item_type, self.display, self.selector, self.hostname, self.port
        )
    }
}
