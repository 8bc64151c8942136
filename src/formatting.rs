//! Text formatting utilities for logs and menu lines

/// Format bytes in human-readable format (KB, MB, GB)
#[inline]
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Shorten UUID to first 8 characters for log readability
#[inline]
pub fn short_id(uuid: &uuid::Uuid) -> String {
    let s = uuid.to_string();
    s[..8].to_owned()
}

/// Truncate a display label to at most `max` characters
///
/// Labels that fit are returned unchanged; longer ones keep their first
/// `max - 3` characters followed by `...`. Counts characters, not bytes,
/// so multi-byte names are never split mid-character.
pub fn truncate_label(label: &str, max: usize) -> String {
    const ELLIPSIS: &str = "...";

    if label.chars().count() <= max {
        return label.to_string();
    }

    let keep = max.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = label.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Replace characters that would break tab-delimited menu framing
///
/// TAB, CR and LF become spaces.
pub fn sanitize_field(field: &str) -> String {
    if !field.contains(['\t', '\r', '\n']) {
        return field.to_string();
    }
    field.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_short_id() {
        let uuid = uuid::Uuid::parse_str("34925aee-7f65-4670-9adc-d2e95ac97b26").unwrap();
        assert_eq!(short_id(&uuid), "34925aee");
    }

    #[test]
    fn test_truncate_label_short_unchanged() {
        assert_eq!(truncate_label("readme.txt", 67), "readme.txt");
    }

    #[test]
    fn test_truncate_label_exact_fit() {
        let label = "a".repeat(67);
        assert_eq!(truncate_label(&label, 67), label);
    }

    #[test]
    fn test_truncate_label_long() {
        let label = "b".repeat(100);
        let truncated = truncate_label(&label, 67);
        assert_eq!(truncated.chars().count(), 67);
        assert!(truncated.ends_with("..."));
        assert!(truncated.starts_with(&"b".repeat(64)));
    }

    #[test]
    fn test_truncate_label_multibyte() {
        let label = "é".repeat(80);
        let truncated = truncate_label(&label, 67);
        assert_eq!(truncated.chars().count(), 67);
    }

    #[test]
    fn test_sanitize_field() {
        assert_eq!(sanitize_field("plain"), "plain");
        assert_eq!(sanitize_field("a\tb\r\nc"), "a b  c");
    }
}
