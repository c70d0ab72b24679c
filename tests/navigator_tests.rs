// tests/navigator_tests.rs
//
// The JSON structural navigator/mutator: path compilation, match
// collection, parent re-derivation, and the append/replace/remove edits.
// Mutators consume and return the root; every assertion here uses the
// returned value.

use serde_json::json;
use weir_lang::navigator::{JsonPath, PathToken};

fn store() -> serde_json::Value {
    json!({
        "store": {
            "book": [
                {"title": "Sayings", "price": 8},
                {"title": "Moby Dick", "price": 9}
            ],
            "bicycle": {"color": "red"}
        }
    })
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn test_compile_token_sequence() {
    let path = JsonPath::compile("$.store.book[1]['title']").unwrap();
    assert_eq!(
        path.tokens(),
        &[
            PathToken::Key("store".to_string()),
            PathToken::Key("book".to_string()),
            PathToken::Index(1),
            PathToken::Key("title".to_string()),
        ]
    );
}

#[test]
fn test_compile_accepts_bare_leading_member() {
    let path = JsonPath::compile("store.bicycle").unwrap();
    assert_eq!(
        path.tokens(),
        &[
            PathToken::Key("store".to_string()),
            PathToken::Key("bicycle".to_string()),
        ]
    );
}

#[test]
fn test_untokenizable_paths_are_hard_errors() {
    for bad in ["", "$..a", "$[?]", "$.a[", "$.a]", "!x"] {
        assert!(JsonPath::compile(bad).is_err(), "'{}' should not compile", bad);
    }
}

#[test]
fn test_definiteness() {
    assert!(JsonPath::compile("$.store.book[0]").unwrap().is_definite());
    assert!(!JsonPath::compile("$.store.book[*]").unwrap().is_definite());
    assert!(!JsonPath::compile("$.store.*").unwrap().is_definite());
    assert!(JsonPath::compile("$").unwrap().is_definite());
}

// ============================================================================
// Find
// ============================================================================

#[test]
fn test_find_single_match() {
    let path = JsonPath::compile("$.store.book[0].title").unwrap();
    assert_eq!(path.find(&store()), vec![json!("Sayings")]);
    assert_eq!(path.find_one(&store()), Some(json!("Sayings")));
}

#[test]
fn test_find_many_with_wildcard() {
    let path = JsonPath::compile("$.store.book[*].price").unwrap();
    assert_eq!(path.find(&store()), vec![json!(8), json!(9)]);
}

#[test]
fn test_find_misses_are_empty_not_errors() {
    let path = JsonPath::compile("$.store.magazine").unwrap();
    assert!(path.find(&store()).is_empty());
    assert_eq!(path.find_one(&store()), None);
}

#[test]
fn test_root_path_short_circuits_to_whole_body() {
    let path = JsonPath::compile("$").unwrap();
    assert_eq!(path.find(&store()), vec![store()]);
}

// ============================================================================
// Parent Resolution
// ============================================================================

#[test]
fn test_parent_re_derivation() {
    let path = JsonPath::compile("$.store.book[1].title").unwrap();
    let parent = path.parent().unwrap();
    assert_eq!(parent.source(), "$.store.book[1]");
    assert_eq!(
        parent.find_one(&store()),
        Some(json!({"title": "Moby Dick", "price": 9}))
    );
    assert!(JsonPath::compile("$").unwrap().parent().is_none());
}

// ============================================================================
// Append
// ============================================================================

#[test]
fn test_append_scalar_target_becomes_pair_list() {
    let path = JsonPath::compile("$.a").unwrap();
    let root = path.append(json!({"a": "old"}), json!("new"), false);
    assert_eq!(root, json!({"a": ["old", "new"]}));
}

#[test]
fn test_append_to_list_pushes() {
    let path = JsonPath::compile("$.a").unwrap();
    let root = path.append(json!({"a": [1]}), json!(2), false);
    assert_eq!(root, json!({"a": [1, 2]}));
}

#[test]
fn test_sibling_append_forces_list_conversion() {
    let path = JsonPath::compile("$.a").unwrap();
    let root = path.append(json!({"a": [1, 2]}), json!(3), true);
    assert_eq!(root, json!({"a": [[1, 2], 3]}));
}

#[test]
fn test_append_under_nested_parent() {
    let path = JsonPath::compile("$.store.bicycle.color").unwrap();
    let root = path.append(store(), json!("blue"), false);
    assert_eq!(
        root["store"]["bicycle"]["color"],
        json!(["red", "blue"])
    );
}

// ============================================================================
// Replace
// ============================================================================

#[test]
fn test_replace_map_member() {
    let path = JsonPath::compile("$.store.bicycle.color").unwrap();
    let root = path.replace(store(), json!("green"));
    assert_eq!(root["store"]["bicycle"]["color"], json!("green"));
}

#[test]
fn test_replace_list_element_in_place() {
    let path = JsonPath::compile("$.store.book[0]").unwrap();
    let root = path.replace(store(), json!({"title": "Replacement"}));
    assert_eq!(root["store"]["book"][0], json!({"title": "Replacement"}));
    assert_eq!(root["store"]["book"][1]["title"], json!("Moby Dick"));
}

#[test]
fn test_replace_every_wildcard_match() {
    let path = JsonPath::compile("$.store.book[*].price").unwrap();
    let root = path.replace(store(), json!(0));
    assert_eq!(root["store"]["book"][0]["price"], json!(0));
    assert_eq!(root["store"]["book"][1]["price"], json!(0));
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn test_remove_map_member_keeps_order() {
    let path = JsonPath::compile("$.store.bicycle").unwrap();
    let root = path.remove(store());
    assert_eq!(root, json!({"store": {"book": [
        {"title": "Sayings", "price": 8},
        {"title": "Moby Dick", "price": 9}
    ]}}));
}

#[test]
fn test_remove_list_element_splices() {
    let path = JsonPath::compile("$.store.book[0]").unwrap();
    let root = path.remove(store());
    assert_eq!(root["store"]["book"], json!([{"title": "Moby Dick", "price": 9}]));
}

#[test]
fn test_remove_miss_is_a_no_op() {
    let path = JsonPath::compile("$.store.magazine").unwrap();
    assert_eq!(path.remove(store()), store());
}

#[test]
fn test_remove_root_empties_the_document() {
    let path = JsonPath::compile("$").unwrap();
    assert_eq!(path.remove(store()), json!(null));
}
