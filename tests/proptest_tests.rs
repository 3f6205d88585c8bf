// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property-based tests using proptest.
//!
//! These tests use property-based testing to verify that the flattening
//! engine behaves consistently for arbitrary key paths and values.

use cloudconfig::domain::{tree, PropertySource};
use proptest::prelude::*;
use serde_json::json;

fn single_source(entries: Vec<(String, serde_json::Value)>) -> PropertySource {
    PropertySource {
        name: "application.yml".to_string(),
        source: entries.into_iter().collect(),
    }
}

// Test that flattening well-formed dotted keys always succeeds and is deterministic
proptest! {
    #[test]
    fn test_flatten_dotted_keys_deterministic(
        keys in prop::collection::vec("[a-z]{1,6}(\\.[a-z]{1,6}){0,3}", 1..8),
        value in "[a-zA-Z0-9]{0,12}",
    ) {
        let entries: Vec<(String, serde_json::Value)> = keys
            .iter()
            .map(|key| (key.clone(), json!(value)))
            .collect();
        let sources = vec![single_source(entries)];
        let first = tree::flatten(&sources);
        prop_assert!(first.is_ok());
        let second = tree::flatten(&sources);
        prop_assert_eq!(first.unwrap(), second.unwrap());
    }
}

// Test that the first property source always wins for a contested key
proptest! {
    #[test]
    fn test_first_source_wins_for_any_key(
        key in "[a-z]{1,6}(\\.[a-z]{1,6}){0,3}",
        first_value in "[a-zA-Z0-9]{1,12}",
        second_value in "[a-zA-Z0-9]{1,12}",
    ) {
        let sources = vec![
            single_source(vec![(key.clone(), json!(first_value.clone()))]),
            single_source(vec![(key.clone(), json!(second_value))]),
        ];
        let tree = tree::flatten(&sources).unwrap();
        let flattened = tree.to_json();

        let mut current = &flattened;
        for component in key.split('.') {
            current = &current[component];
        }
        prop_assert_eq!(current, &json!(first_value));
    }
}

// Test that an indexed key grows the array to exactly index + 1 elements
proptest! {
    #[test]
    fn test_indexed_key_grows_array(index in 0usize..50) {
        let key = format!("items[{index}]");
        let sources = vec![single_source(vec![(key, json!("v"))])];
        let tree = tree::flatten(&sources).unwrap();
        let flattened = tree.to_json();

        let items = flattened["items"].as_array().unwrap();
        prop_assert_eq!(items.len(), index + 1);
        prop_assert_eq!(&items[index], &json!("v"));
    }
}

// Test that components with brackets either parse as a single index or fail
proptest! {
    #[test]
    fn test_bracketed_components_never_panic(component in "[a-z]{1,4}(\\[[0-9x]{1,3}\\]){1,2}") {
        let sources = vec![single_source(vec![(component, json!("v"))])];
        // either a clean tree or a typed UnsupportedKey error, never a panic
        let _ = tree::flatten(&sources);
    }
}
