//! Property-based tests using proptest
//!
//! These tests verify the invariants the request pipeline relies on:
//! sandbox confinement, total classification, parser robustness, listing
//! order and the response terminator.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use gopher_server::filesystem::{DirectoryLister, FileSystem, classify};
use gopher_server::protocol::{Item, ItemType, Payload, Request, encode_payload, format_menu};
use gopher_server::security::detect_traversal;
use gopher_server::types::{HostName, MaxFileBytes, Port};
use proptest::prelude::*;

fn host() -> HostName {
    HostName::new("localhost".to_string()).unwrap()
}

// =============================================================================
// 1. FileSystem::resolve - confinement
// =============================================================================

proptest! {
    #[test]
    fn prop_resolve_stays_under_root(
        segments in prop::collection::vec(r"(\.{1,3}|[a-z]{1,6})?", 0..8)
    ) {
        let root = PathBuf::from("/srv/gopher");
        let fs = FileSystem::new(root.clone(), MaxFileBytes::DEFAULT, vec![]);
        let selector = format!("/{}", segments.join("/"));

        match fs.resolve(&selector) {
            Ok(path) => {
                prop_assert!(path.starts_with(&root), "{} escaped to {}", selector, path.display());
                prop_assert!(!segments.iter().any(|s| s == ".."));
            }
            Err(_) => prop_assert!(segments.iter().any(|s| s == "..")),
        }
    }

    #[test]
    fn prop_resolve_never_panics(selector in ".*") {
        let fs = FileSystem::new(PathBuf::from("/srv/gopher"), MaxFileBytes::DEFAULT, vec![]);
        if let Ok(path) = fs.resolve(&selector) {
            prop_assert!(path.starts_with("/srv/gopher"));
        }
    }

    #[test]
    fn prop_dotdot_segment_always_traversal(
        prefix in r"[a-z/]{0,10}",
        suffix in r"[a-z/]{0,10}"
    ) {
        let selector = format!("{}/../{}", prefix, suffix);
        prop_assert!(detect_traversal(&selector).is_err());
    }
}

// =============================================================================
// 2. classify - totality
// =============================================================================

proptest! {
    #[test]
    fn prop_classify_total(name in r"[A-Za-z0-9._ -]{0,24}", is_dir in any::<bool>()) {
        let kind = classify(Path::new(&name), is_dir);
        prop_assert!(ItemType::ALL.contains(&kind));
        if is_dir {
            prop_assert_eq!(kind, ItemType::Directory);
        } else {
            prop_assert!(matches!(
                kind,
                ItemType::File | ItemType::Gif | ItemType::Image | ItemType::Html | ItemType::Binary
            ));
        }
    }

    #[test]
    fn prop_classify_case_insensitive(stem in r"[a-z]{1,8}", ext in r"(txt|gif|png|html|zip|pdf|jpg)") {
        let lower = classify(Path::new(&format!("{stem}.{ext}")), false);
        let upper = classify(Path::new(&format!("{stem}.{}", ext.to_uppercase())), false);
        prop_assert_eq!(lower, upper);
    }
}

// =============================================================================
// 3. Request::parse - robustness
// =============================================================================

proptest! {
    #[test]
    fn prop_parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..600)) {
        let _ = Request::parse_bytes(&bytes);
    }

    #[test]
    fn prop_parse_selector_shape(line in "[^\r\n]{0,300}") {
        let request = Request::parse(&line);
        prop_assert!(!request.selector().is_empty());
        prop_assert!(!request.selector().contains('\t'));
        if let Some(terms) = request.search_terms() {
            prop_assert!(!terms.is_empty());
            prop_assert!(terms.iter().all(|t| !t.is_empty() && !t.contains(char::is_whitespace)));
        }
    }

    #[test]
    fn prop_parse_line_ending_independent(line in "[^\r\n]{0,100}") {
        let bare = Request::parse(&line);
        prop_assert_eq!(&Request::parse(&format!("{line}\r\n")), &bare);
        prop_assert_eq!(&Request::parse(&format!("{line}\n")), &bare);
    }
}

// =============================================================================
// 4. DirectoryLister::list - ordering
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_listing_dirs_first_then_sorted(
        dirs in prop::collection::btree_set(r"[a-zA-Z0-9]{1,8}", 0..6),
        files in prop::collection::btree_set(r"[a-zA-Z0-9]{1,8}\.(txt|gif|md)", 0..6),
    ) {
        let tmp = tempfile::TempDir::new().unwrap();
        let root = tmp.path().canonicalize().unwrap();
        for dir in &dirs {
            std::fs::create_dir(root.join(dir)).unwrap();
        }
        for file in &files {
            std::fs::write(root.join(file), b"x").unwrap();
        }

        let fs = FileSystem::new(root.clone(), MaxFileBytes::DEFAULT, vec![]);
        let lister = DirectoryLister::new(host(), Port::GOPHER);
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let items = rt.block_on(lister.list(&fs, &root)).unwrap();

        let expected: Vec<&String> = dirs.iter().chain(files.iter()).collect();
        let actual: Vec<&str> = items.iter().map(Item::display).collect();
        prop_assert_eq!(actual, expected.iter().map(|s| s.as_str()).collect::<Vec<_>>());

        let dir_names: BTreeSet<&str> = dirs.iter().map(String::as_str).collect();
        for item in &items {
            prop_assert_eq!(
                item.item_type() == ItemType::Directory,
                dir_names.contains(item.display())
            );
        }
    }
}

// =============================================================================
// 5. Wire encoding - terminator
// =============================================================================

proptest! {
    #[test]
    fn prop_text_payload_has_single_terminator(text in "(\\PC|\n|\r){0,200}") {
        let wire = encode_payload(&Payload::Text(text.into_bytes()));
        prop_assert!(wire.ends_with(b".\r\n"));

        let body = &wire[..wire.len() - 3];
        prop_assert!(body.is_empty() || body.ends_with(b"\n"));
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            prop_assert_ne!(line, b".".as_slice());
        }
    }

    #[test]
    fn prop_binary_payload_verbatim(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let wire = encode_payload(&Payload::Binary(bytes.clone()));
        prop_assert!(wire.starts_with(&bytes));
        prop_assert!(wire.ends_with(b".\r\n"));
    }

    #[test]
    fn prop_menu_line_count(labels in prop::collection::vec(r"[ -~]{0,80}", 0..20)) {
        let items: Vec<Item> = labels
            .iter()
            .map(|label| Item::new(ItemType::File, label, "/x", &host(), Port::GOPHER))
            .collect();
        let menu = format_menu(&items);

        prop_assert!(menu.ends_with(".\r\n"));
        prop_assert_eq!(menu.matches("\r\n").count(), items.len() + 1);
        for line in menu.split_terminator("\r\n").take(items.len()) {
            prop_assert_eq!(line.matches('\t').count(), 3);
        }
    }
}
