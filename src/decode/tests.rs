//! Tests for record extraction

use super::*;
use serde_json::json;

#[test]
fn test_extract_records_default_path() {
    let body = json!({"type": "list", "data": [{"id": "1"}, {"id": "2"}]});
    let records = extract_records(&body, Some("data")).unwrap();
    assert_eq!(records, vec![json!({"id": "1"}), json!({"id": "2"})]);
}

#[test]
fn test_extract_records_without_path() {
    assert_eq!(
        extract_records(&json!([{"id": 1}]), None).unwrap(),
        vec![json!({"id": 1})]
    );
    assert_eq!(
        extract_records(&json!({"id": 1}), None).unwrap(),
        vec![json!({"id": 1})]
    );
    assert!(extract_records(&json!(null), None).unwrap().is_empty());
}

#[test]
fn test_extract_records_missing_path() {
    let body = json!({"data": []});
    assert!(extract_records(&body, Some("items")).unwrap().is_empty());
    assert!(extract_records(&body, Some("data")).unwrap().is_empty());
}

#[test]
fn test_extract_records_nested_and_prefixed() {
    let body = json!({"result": {"articles": [{"id": 1}]}});
    assert_eq!(
        extract_records(&body, Some("$.result.articles")).unwrap(),
        vec![json!({"id": 1})]
    );
}

#[test]
fn test_extract_records_wildcard() {
    let body = json!({"groups": [{"items": [{"id": 1}]}, {"items": [{"id": 2}]}]});
    let records = extract_records(&body, Some("$.groups[*].items[*]")).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_extract_value_indexing() {
    let body = json!({"generations": [{"text": "first"}, {"text": "last"}]});
    assert_eq!(
        extract_value(&body, "generations[0].text"),
        Some(json!("first"))
    );
    assert_eq!(
        extract_value(&body, "generations[-1].text"),
        Some(json!("last"))
    );
    assert_eq!(extract_value(&body, "generations[5].text"), None);
    assert_eq!(extract_value(&body, "generations[-5].text"), None);
}
