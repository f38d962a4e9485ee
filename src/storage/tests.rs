//! Tests for JsonStore

use super::*;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn test_in_memory_store() {
    let store = JsonStore::in_memory();
    assert!(store.is_in_memory());
    assert!(store.json_get("args").unwrap().is_none());

    store.json_set("args", json!({"target": "summary"})).unwrap();
    assert_eq!(
        store.json_get("args").unwrap(),
        Some(json!({"target": "summary"}))
    );
}

#[test]
fn test_set_replaces_value() {
    let store = JsonStore::in_memory();
    store.json_set("k", json!(1)).unwrap();
    store.json_set("k", json!(2)).unwrap();
    assert_eq!(store.json_get("k").unwrap(), Some(json!(2)));
    assert_eq!(store.keys().unwrap(), vec!["k".to_string()]);
}

#[test]
fn test_clone_shares_contents() {
    let store = JsonStore::in_memory();
    let other = store.clone();
    store.json_set("shared", json!(true)).unwrap();
    assert_eq!(other.json_get("shared").unwrap(), Some(json!(true)));
}

#[test]
fn test_file_store_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join("summarizer.json");

    let store = JsonStore::new(&path);
    store
        .json_set("args", json!({"using": {"column": "text"}}))
        .unwrap();
    assert!(path.exists());

    let reloaded = JsonStore::from_file(&path).unwrap();
    assert_eq!(
        reloaded.json_get("args").unwrap(),
        Some(json!({"using": {"column": "text"}}))
    );
}

#[test]
fn test_from_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let store = JsonStore::from_file(dir.path().join("absent.json")).unwrap();
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn test_from_file_rejects_non_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "[1, 2]").unwrap();
    assert!(JsonStore::from_file(&path).is_err());
}
