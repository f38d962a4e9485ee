//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use super::strategies::{
    CursorPaginator, NextUrlPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator,
};
use crate::auth::extract_jsonpath;
use crate::types::StringMap;
use serde::Deserialize;
use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq)]
pub enum NextPage {
    /// More pages available
    Continue {
        /// Query parameters for the next request (replace the previous ones)
        params: StringMap,
        /// Absolute URL to fetch instead of the resource endpoint
        url: Option<String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    pub fn with_params(params: StringMap) -> Self {
        Self::Continue { params, url: None }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue {
            params: StringMap::new(),
            url: Some(url.into()),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Pagination settings as they appear in handler configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// Single request
    #[default]
    None,

    /// Cursor taken from the response body (e.g. `?starting_after=...`)
    Cursor {
        cursor_param: String,
        /// Path to the cursor in the response
        cursor_path: String,
        #[serde(default)]
        page_size_param: Option<String>,
        #[serde(default)]
        stop_condition: StopCondition,
    },

    /// `?offset=..&limit=..`
    Offset {
        offset_param: String,
        limit_param: String,
        #[serde(default)]
        stop_condition: StopCondition,
    },

    /// `?page=..&per_page=..`
    PageNumber {
        page_param: String,
        #[serde(default = "default_start_page")]
        start_page: u32,
        #[serde(default)]
        page_size_param: Option<String>,
        #[serde(default)]
        stop_condition: StopCondition,
    },

    /// Next page URL in the response body
    NextUrl {
        path: String,
        #[serde(default)]
        page_size_param: Option<String>,
    },
}

fn default_start_page() -> u32 {
    1
}

impl PaginationConfig {
    /// Cursor pagination stopping when the cursor disappears
    pub fn cursor(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self::Cursor {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            page_size_param: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Page number pagination stopping on an empty page
    pub fn page_number(page_param: impl Into<String>, start_page: u32) -> Self {
        Self::PageNumber {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    /// Build the paginator for this configuration
    pub fn build(&self) -> Box<dyn Paginator> {
        match self.clone() {
            Self::None => Box::new(NoPaginator),
            Self::Cursor {
                cursor_param,
                cursor_path,
                page_size_param,
                stop_condition,
            } => Box::new(CursorPaginator {
                cursor_param,
                cursor_path,
                page_size_param,
                stop_condition,
            }),
            Self::Offset {
                offset_param,
                limit_param,
                stop_condition,
            } => Box::new(OffsetPaginator {
                offset_param,
                limit_param,
                stop_condition,
            }),
            Self::PageNumber {
                page_param,
                start_page,
                page_size_param,
                stop_condition,
            } => Box::new(PageNumberPaginator {
                page_param,
                start_page,
                page_size_param,
                stop_condition,
            }),
            Self::NextUrl {
                path,
                page_size_param,
            } => Box::new(NextUrlPaginator {
                path,
                page_size_param,
            }),
        }
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopCondition {
    /// Stop when page is empty (no records)
    #[default]
    EmptyPage,

    /// Stop when a field has a specific value
    Field { path: String, value: Value },

    /// Stop when the fetched count reaches a total
    TotalCount { path: String },

    /// Stop when the page number reaches the total page count
    TotalPages { path: String },
}

impl StopCondition {
    pub fn field(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Field {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn total_count(path: impl Into<String>) -> Self {
        Self::TotalCount { path: path.into() }
    }

    pub fn total_pages(path: impl Into<String>) -> Self {
        Self::TotalPages { path: path.into() }
    }

    /// Whether pagination should stop after this response
    pub fn should_stop(&self, body: &Value, records_count: usize, state: &PaginationState) -> bool {
        match self {
            Self::EmptyPage => records_count == 0,
            Self::Field { path, value } => lookup(body, path).is_some_and(|v| v == value),
            Self::TotalCount { path } => extract_jsonpath(body, path)
                .and_then(|s| s.parse::<u64>().ok())
                .is_some_and(|total| state.total_fetched >= total),
            Self::TotalPages { path } => extract_jsonpath(body, path)
                .and_then(|s| s.parse::<u32>().ok())
                .is_some_and(|total| state.page >= total),
        }
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    /// Current page number (for page-based pagination)
    pub page: u32,
    /// Current offset (for offset-based pagination)
    pub offset: u64,
    /// Current cursor value
    pub cursor: Option<String>,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn add_fetched(&mut self, count: usize) {
        self.total_fetched += count as u64;
    }
}

/// Core trait for pagination strategies
///
/// The caller supplies the page size; strategies decide how it is sent.
pub trait Paginator: Send + Sync {
    /// Query parameters for the first request
    fn first_params(&self, page_size: u32, state: &mut PaginationState) -> StringMap;

    /// Inspect a response and decide whether there is a next page
    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage;
}

/// Walk a dotted path (optionally `$.`-prefixed) to a JSON value
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .try_fold(value, |current, part| current.as_object()?.get(part))
}
