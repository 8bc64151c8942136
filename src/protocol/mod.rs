//! Gopher protocol handling module
//!
//! Request parsing, menu items, and response framing for RFC 1436.

mod item;
mod request;
mod response;

pub use item::{Item, ItemType};
pub use request::Request;
pub use response::{Payload, Response, encode_payload, format_menu};
