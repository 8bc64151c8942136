//! Item type classification by extension

use std::path::Path;

use crate::constants::filesystem::BINARY_EXTENSIONS;
use crate::protocol::ItemType;

/// Lowercased extension of `path`, if it has one
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Map a path to the item type advertised in menus
///
/// Directories are always [`ItemType::Directory`]. Unknown or missing
/// extensions fall back to [`ItemType::File`].
///
/// # Examples
/// ```
/// use std::path::Path;
/// use gopher_server::filesystem::classify;
/// use gopher_server::protocol::ItemType;
///
/// assert_eq!(classify(Path::new("cat.gif"), false), ItemType::Gif);
/// assert_eq!(classify(Path::new("notes.xyz"), false), ItemType::File);
/// assert_eq!(classify(Path::new("photos.png"), true), ItemType::Directory);
/// ```
#[must_use]
pub fn classify(path: &Path, is_directory: bool) -> ItemType {
    if is_directory {
        return ItemType::Directory;
    }

    match extension(path).as_deref() {
        Some("txt" | "md" | "readme") => ItemType::File,
        Some("gif") => ItemType::Gif,
        Some("jpg" | "jpeg" | "png" | "bmp") => ItemType::Image,
        Some("html" | "htm") => ItemType::Html,
        Some("exe" | "zip" | "tar" | "gz" | "pdf") => ItemType::Binary,
        _ => ItemType::File,
    }
}

/// Whether the file is read and sent as opaque bytes
#[must_use]
pub fn is_binary(path: &Path) -> bool {
    extension(path).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}

/// Whether the extension of `path` is in `forbidden` (case-insensitive)
pub(crate) fn is_forbidden(path: &Path, forbidden: &[String]) -> bool {
    extension(path).is_some_and(|ext| {
        forbidden
            .iter()
            .any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(&ext))
    })
}
