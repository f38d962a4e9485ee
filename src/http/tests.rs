//! Tests for the HTTP client module

use super::*;
use crate::auth::AuthConfig;
use crate::error::Error;
use crate::types::{BackoffType, Method, StringMap};
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("sqlbridge/"));
}

#[test]
fn test_request_config_builder() {
    let mut params = StringMap::new();
    params.insert("per_page".to_string(), "50".to_string());

    let config = RequestConfig::new()
        .query("page", "1")
        .query_params(&params)
        .header("X-Request-Id", "abc123")
        .json(json!({"key": "value"}))
        .retries(2);

    assert_eq!(config.query.get("page"), Some(&"1".to_string()));
    assert_eq!(config.query.get("per_page"), Some(&"50".to_string()));
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert!(config.body.is_some());
    assert_eq!(config.max_retries, Some(2));
}

#[tokio::test]
async fn test_http_client_get_with_auth_and_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(header("Authorization", "Bearer token-1"))
        .and(header("Intercom-Version", "2.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .header("Intercom-Version", "2.10")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::bearer("token-1")).unwrap();

    let response = client.get("/articles").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_404_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).get("/articles/9").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_http_client_retry_on_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let response = client_for(&server).get("/flaky").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_rate_limit_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = client_for(&server).get("/limited").await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_http_client_max_retries_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/always-fail"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client_for(&server).get("/always-fail").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_http_client_full_url_bypasses_base() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://unused.invalid")
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let response = client
        .get(&format!("{}/next", server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[test_case(BackoffType::Constant, &[100, 100, 100] ; "constant")]
#[test_case(BackoffType::Linear, &[100, 200, 300] ; "linear")]
#[test_case(BackoffType::Exponential, &[100, 200, 400] ; "exponential")]
fn test_calculate_backoff(backoff: BackoffType, expected_ms: &[u64]) {
    let config = HttpClientConfig::builder()
        .backoff(backoff, Duration::from_millis(100), Duration::from_secs(10))
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config).unwrap();

    for (attempt, ms) in expected_ms.iter().enumerate() {
        assert_eq!(
            client.calculate_backoff(attempt as u32),
            Duration::from_millis(*ms)
        );
    }
}

#[test]
fn test_calculate_backoff_respects_max() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();
    assert!(client.has_rate_limiter());
    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
}

// ============================================================================
// Facade Tests
// ============================================================================

#[tokio::test]
async fn test_facade_get_with_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "1"}]})))
        .mount(&server)
        .await;

    let mut params = StringMap::new();
    params.insert("per_page".to_string(), "50".to_string());

    let body = client_for(&server)
        .call(ApiRequest::get("/articles").with_params(params))
        .await
        .unwrap();
    assert_eq!(body, json!({"data": [{"id": "1"}]}));
}

#[tokio::test]
async fn test_facade_post_and_put_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/articles"))
        .and(body_json(json!({"title": "New Article"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "7"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/articles/7"))
        .and(body_json(json!({"title": "Renamed"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .call(ApiRequest::post("/articles", json!({"title": "New Article"})))
        .await
        .unwrap();
    assert_eq!(created["id"], "7");

    let updated = client
        .call(ApiRequest::put("/articles/7", json!({"title": "Renamed"})))
        .await
        .unwrap();
    assert_eq!(updated, serde_json::Value::Null);
}

#[test]
fn test_api_request_builders() {
    let req = ApiRequest::put("/articles/1", json!({"title": "x"}));
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.endpoint, "/articles/1");
    assert_eq!(req.data, Some(json!({"title": "x"})));
    assert!(req.params.is_empty());
}
