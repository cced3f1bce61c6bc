//! Property-based tests for the key-file codec and the store.
//!
//! These tests use proptest to verify that whatever the store accepts comes
//! back unchanged from disk.

use std::time::Duration;

use proptest::prelude::*;

use caja_metadata::core::keyfile::KeyFile;
use caja_metadata::core::metadata::{AttributeValue, CachedFile, MetadataStore, STRV_TERMINATOR};

/// Strategy for value characters, biased toward the ones that need escaping.
fn value_char() -> impl Strategy<Value = char> {
    prop_oneof![
        4 => prop::char::range('a', 'z'),
        1 => Just(' '),
        1 => Just(';'),
        1 => Just('\\'),
        1 => Just('\n'),
        1 => Just('\t'),
        1 => Just('\r'),
        1 => Just('='),
        1 => Just('#'),
        1 => Just('['),
        1 => Just('é'),
    ]
}

fn value() -> impl Strategy<Value = String> {
    prop::collection::vec(value_char(), 0..24).prop_map(|chars| chars.into_iter().collect())
}

/// Strategy for keys the key-file format can represent.
fn key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

/// Strategy for group names, which may contain spaces and dots.
fn group() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ._-]{0,20}"
}

proptest! {
    #[test]
    fn non_empty_scalars_survive_the_codec(group in group(), key in key(), value in value()) {
        prop_assume!(!value.is_empty());

        let mut keyfile = KeyFile::new();
        keyfile.set_string(&group, &key, &value).unwrap();

        let reloaded = KeyFile::parse(&keyfile.to_data()).unwrap();
        prop_assert_eq!(reloaded, keyfile);
    }

    #[test]
    fn lists_survive_the_codec(
        group in group(),
        key in key(),
        values in prop::collection::vec(value(), 2..6),
    ) {
        let mut keyfile = KeyFile::new();
        keyfile.set_string_list(&group, &key, &values).unwrap();

        let reloaded = KeyFile::parse(&keyfile.to_data()).unwrap();
        prop_assert_eq!(reloaded.get(&group, &key), Some(values.as_slice()));
    }

    #[test]
    fn store_lists_reload_as_lists(
        key in key(),
        values in prop::collection::vec(value(), 1..5),
    ) {
        prop_assume!(values.last().map(String::as_str) != Some(STRV_TERMINATOR));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desktop-metadata");
        let mut store = MetadataStore::with_path(&path, Duration::ZERO);
        let mut file = CachedFile::new("home");

        store.set_string_list(&mut file, "home", &key, &values);
        store.flush_now().unwrap();

        let reloaded = MetadataStore::with_path(&path, Duration::ZERO);
        prop_assert_eq!(reloaded.get("home", &key), Some(AttributeValue::StringV(values)));
    }

    #[test]
    fn parse_never_panics(data in "\\PC*") {
        let _ = KeyFile::parse(&data);
    }
}
