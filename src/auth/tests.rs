//! Tests for the auth module

use super::*;
use crate::storage::{JsonStore, KeyValueStore};
use base64::Engine;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn build(auth: &Authenticator) -> reqwest::Request {
    let client = reqwest::Client::new();
    auth.apply(client.get("https://example.com/api"))
        .build()
        .unwrap()
}

#[test]
fn test_no_auth() {
    let built = build(&Authenticator::new(AuthConfig::None));
    assert!(built.headers().get("Authorization").is_none());
}

#[test]
fn test_api_key_header() {
    let auth = Authenticator::new(AuthConfig::ApiKey {
        location: Location::Header,
        header_name: Some("X-API-Key".to_string()),
        query_param: None,
        prefix: None,
        value: "test-key-123".to_string(),
    });

    let built = build(&auth);
    assert_eq!(built.headers().get("X-API-Key").unwrap(), "test-key-123");
}

#[test]
fn test_api_key_query() {
    let auth = Authenticator::new(AuthConfig::ApiKey {
        location: Location::Query,
        header_name: None,
        query_param: Some("apikey".to_string()),
        prefix: None,
        value: "secret123".to_string(),
    });

    let built = build(&auth);
    assert!(built.url().query().unwrap().contains("apikey=secret123"));
}

#[test]
fn test_basic_auth() {
    let auth = Authenticator::new(AuthConfig::Basic {
        username: "user".to_string(),
        password: "pass".to_string(),
    });

    let built = build(&auth);
    let auth_header = built
        .headers()
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let encoded = auth_header.strip_prefix("Basic ").unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();
    assert_eq!(String::from_utf8(decoded).unwrap(), "user:pass");
}

#[test]
fn test_bearer_auth() {
    let built = build(&Authenticator::new(AuthConfig::bearer("my-bearer-token")));
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer my-bearer-token"
    );
}

#[test]
fn test_custom_headers() {
    let mut headers = HashMap::new();
    headers.insert("Intercom-Version".to_string(), "2.10".to_string());
    let built = build(&Authenticator::new(AuthConfig::CustomHeaders { headers }));
    assert_eq!(built.headers().get("Intercom-Version").unwrap(), "2.10");
}

#[test]
fn test_extract_jsonpath() {
    let body = json!({"pages": {"next": {"starting_after": "abc"}, "page": 2}});
    assert_eq!(
        extract_jsonpath(&body, "pages.next.starting_after"),
        Some("abc".to_string())
    );
    assert_eq!(extract_jsonpath(&body, "$.pages.page"), Some("2".to_string()));
    assert_eq!(extract_jsonpath(&body, "pages.missing"), None);
    assert_eq!(extract_jsonpath(&body, "pages.next"), None);
}

// ============================================================================
// Credential Tests
// ============================================================================

#[test]
fn test_static_credentials() {
    assert_eq!(
        StaticCredentials::new("k").get_api_key("cohere", &json!({})),
        Some("k".to_string())
    );
    assert_eq!(StaticCredentials::new("").get_api_key("cohere", &json!({})), None);
    assert_eq!(StaticCredentials::none().get_api_key("cohere", &json!({})), None);
}

#[test]
fn test_default_credentials_from_args() {
    let resolver = DefaultCredentials::new();

    let args = json!({"using": {"column": "text", "api_key": "from-using"}});
    assert_eq!(
        resolver.get_api_key("cohere", &args),
        Some("from-using".to_string())
    );

    let args = json!({"cohere_api_key": "from-top"});
    assert_eq!(
        resolver.get_api_key("cohere", &args),
        Some("from-top".to_string())
    );

    assert_eq!(resolver.get_api_key("cohere", &json!({})), None);
}

#[test]
fn test_default_credentials_from_engine_storage() {
    let storage = Arc::new(JsonStore::in_memory());
    storage
        .json_set("args", json!({"cohere_api_key": "engine-key"}))
        .unwrap();

    let resolver = DefaultCredentials::new().with_engine_storage(storage);
    assert_eq!(
        resolver.get_api_key("cohere", &json!({"using": {}})),
        Some("engine-key".to_string())
    );

    // Model arguments win over the engine
    assert_eq!(
        resolver.get_api_key("cohere", &json!({"api_key": "model-key"})),
        Some("model-key".to_string())
    );
}

#[test]
fn test_default_credentials_configured_key_after_args() {
    let storage = Arc::new(JsonStore::in_memory());
    let resolver = DefaultCredentials::new()
        .with_engine_storage(storage.clone())
        .with_configured_key("configured-key");

    assert_eq!(
        resolver.get_api_key("cohere", &json!({"using": {"column": "text"}})),
        Some("configured-key".to_string())
    );
    assert_eq!(
        resolver.get_api_key("cohere", &json!({"using": {"api_key": "model-key"}})),
        Some("model-key".to_string())
    );

    storage
        .json_set("args", json!({"cohere_api_key": "engine-key"}))
        .unwrap();
    assert_eq!(
        resolver.get_api_key("cohere", &json!({})),
        Some("engine-key".to_string())
    );

    let empty = DefaultCredentials::new().with_configured_key("");
    assert_eq!(empty.get_api_key("cohere", &json!({})), None);
}

#[test]
fn test_default_credentials_from_env() {
    std::env::set_var("SQLBRIDGE_TEST_PROVIDER_API_KEY", "env-key");

    let resolver = DefaultCredentials::new().with_env();
    assert_eq!(
        resolver.get_api_key("sqlbridge_test_provider", &json!({})),
        Some("env-key".to_string())
    );

    let resolver = DefaultCredentials::new();
    assert_eq!(
        resolver.get_api_key("sqlbridge_test_provider", &json!({})),
        None
    );
}
