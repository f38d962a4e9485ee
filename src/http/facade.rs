//! API client facade used by table and model handlers

use super::client::{HttpClient, RequestConfig};
use crate::error::Result;
use crate::types::{Method, StringMap};
use async_trait::async_trait;
use serde_json::Value;

/// One call against a remote API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path relative to the API base URL
    pub endpoint: String,
    pub method: Method,
    /// Query string parameters
    pub params: StringMap,
    /// JSON body
    pub data: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            params: StringMap::new(),
            data: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, data: Value) -> Self {
        Self::new(Method::POST, endpoint).with_data(data)
    }

    pub fn put(endpoint: impl Into<String>, data: Value) -> Self {
        Self::new(Method::PUT, endpoint).with_data(data)
    }

    #[must_use]
    pub fn with_params(mut self, params: StringMap) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Raw JSON calls against an authenticated API
#[async_trait]
pub trait ApiFacade: Send + Sync {
    /// Perform the call and return the decoded JSON body (`null` if empty)
    async fn call(&self, request: ApiRequest) -> Result<Value>;
}

#[async_trait]
impl ApiFacade for HttpClient {
    async fn call(&self, request: ApiRequest) -> Result<Value> {
        let mut config = RequestConfig::new().query_params(&request.params);
        if let Some(data) = request.data {
            config = config.json(data);
        }
        self.request_value(request.method.into(), &request.endpoint, config)
            .await
    }
}
