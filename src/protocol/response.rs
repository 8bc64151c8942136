//! Responses and their wire encoding
//!
//! Every response, menu or file, ends with the lone `.` terminator line.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::constants::protocol::{CRLF, TERMINATOR, TERMINATOR_STR};
use crate::error::GopherError;
use crate::types::Port;

use super::item::Item;

/// File contents as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text in whatever encoding the file uses, dot-stuffed on the wire
    Text(Vec<u8>),
    /// Opaque bytes, sent verbatim
    Binary(Vec<u8>),
}

impl Payload {
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Raw bytes without any wire escaping
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(bytes) | Self::Binary(bytes) => bytes,
        }
    }
}

/// The single response produced for a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A menu (directory listing, search result, or error)
    Directory(Vec<Item>),
    /// File contents
    File(Payload),
}

impl Response {
    /// One-item error menu for `err`, advertising `port`
    #[must_use]
    pub fn error(err: &GopherError, port: Port) -> Self {
        Self::Directory(vec![Item::error(&err.client_message(), port)])
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Menu items, if this is a menu
    #[must_use]
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            Self::Directory(items) => Some(items),
            Self::File(_) => None,
        }
    }

    /// Full wire encoding including the terminator
    #[must_use]
    pub fn to_wire(&self) -> Vec<u8> {
        match self {
            Self::Directory(items) => format_menu(items).into_bytes(),
            Self::File(payload) => encode_payload(payload),
        }
    }

    /// Write the full wire encoding and flush
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let wire = self.to_wire();
        writer.write_all(&wire).await?;
        writer.flush().await?;
        Ok(wire.len())
    }
}

/// Render menu lines followed by the terminator
///
/// # Examples
/// ```
/// use gopher_server::protocol::{Item, format_menu};
/// use gopher_server::types::{HostName, Port};
///
/// let host = HostName::new("localhost".to_string()).unwrap();
/// let items = vec![Item::new(gopher_server::protocol::ItemType::File, "a", "/a", &host, Port::GOPHER)];
/// assert_eq!(format_menu(&items), "0a\t/a\tlocalhost\t70\r\n.\r\n");
/// ```
#[must_use]
pub fn format_menu(items: &[Item]) -> String {
    let mut out = String::with_capacity(items.len() * 64 + TERMINATOR_STR.len());
    for item in items {
        out.push_str(&item.to_line());
    }
    out.push_str(TERMINATOR_STR);
    out
}

/// Encode a file payload for the wire
///
/// Text lines starting with `.` get a second `.` so no line can be read as
/// the terminator. A CRLF is added when the payload does not end with a
/// newline, keeping the terminator on its own line.
#[must_use]
pub fn encode_payload(payload: &Payload) -> Vec<u8> {
    let mut out = match payload {
        Payload::Text(text) => dot_stuff(text),
        Payload::Binary(bytes) => {
            let mut out = Vec::with_capacity(bytes.len() + CRLF.len() + TERMINATOR.len());
            out.extend_from_slice(bytes);
            out
        }
    };

    if !out.is_empty() && !out.ends_with(b"\n") {
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(TERMINATOR);
    out
}

fn dot_stuff(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 8);
    for line in text.split_inclusive(|&b| b == b'\n') {
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
    }
    out
}
