//! Intercom help center articles as a table

use super::rest::RestHandler;
use crate::auth::AuthConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
use crate::pagination::{PaginationConfig, StopCondition};
use crate::resource::{ResourceSchema, DEFAULT_PAGE_SIZE};
use std::sync::Arc;

pub const INTERCOM_BASE_URL: &str = "https://api.intercom.io";

/// Value sent in the `Intercom-Version` header
pub const INTERCOM_API_VERSION: &str = "2.10";

/// Article fields in the order the table exposes them
pub const ARTICLE_COLUMNS: [&str; 15] = [
    "type",
    "id",
    "workspace_id",
    "title",
    "description",
    "body",
    "author_id",
    "state",
    "created_at",
    "updated_at",
    "url",
    "parent_id",
    "parent_ids",
    "parent_type",
    "statistics",
];

/// `articles` table: `/articles`, paged with `page`/`per_page` until `pages.total_pages`
pub fn articles_schema() -> ResourceSchema {
    ResourceSchema::new("articles", "/articles", ARTICLE_COLUMNS)
        .with_page_size(DEFAULT_PAGE_SIZE)
        .with_pagination(PaginationConfig::PageNumber {
            page_param: "page".to_string(),
            start_page: 1,
            page_size_param: Some("per_page".to_string()),
            stop_condition: StopCondition::total_pages("pages.total_pages"),
        })
}

/// Client configuration for the Intercom REST API
pub fn client_config(base_url: &str) -> HttpClientConfig {
    with_headers(HttpClientConfig::builder().base_url(base_url)).build()
}

/// Add the headers every Intercom request carries
pub fn with_headers(builder: HttpClientConfigBuilder) -> HttpClientConfigBuilder {
    builder
        .header("Accept", "application/json")
        .header("Intercom-Version", INTERCOM_API_VERSION)
}

/// Handler exposing `articles`, authenticated with a bearer access token
pub fn handler(name: impl Into<String>, access_token: &str) -> Result<RestHandler> {
    handler_with_config(name, client_config(INTERCOM_BASE_URL), access_token)
}

pub fn handler_with_config(
    name: impl Into<String>,
    config: HttpClientConfig,
    access_token: &str,
) -> Result<RestHandler> {
    let client = HttpClient::with_auth(config, AuthConfig::bearer(access_token))?;
    Ok(RestHandler::new(name, Arc::new(client), [articles_schema()]))
}
