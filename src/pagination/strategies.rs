//! Pagination strategy implementations
//!
//! Each strategy handles a specific pagination pattern.

use super::types::{NextPage, PaginationState, Paginator, StopCondition};
use crate::auth::extract_jsonpath;
use crate::types::StringMap;
use serde_json::Value;

fn page_size_params(param: Option<&String>, page_size: u32) -> StringMap {
    let mut params = StringMap::new();
    if let Some(param) = param {
        params.insert(param.clone(), page_size.to_string());
    }
    params
}

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor-based pagination (e.g., Intercom, Stripe)
///
/// Uses a cursor value from the response to fetch the next page.
/// Common patterns:
/// - `?starting_after=WzE2...`
/// - `?cursor=abc123`
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Path to the cursor in the response
    pub cursor_path: String,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
    pub stop_condition: StopCondition,
}

impl CursorPaginator {
    pub fn new(cursor_param: impl Into<String>, cursor_path: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            cursor_path: cursor_path.into(),
            page_size_param: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_page_size_param(mut self, param: impl Into<String>) -> Self {
        self.page_size_param = Some(param.into());
        self
    }
}

impl Paginator for CursorPaginator {
    fn first_params(&self, page_size: u32, state: &mut PaginationState) -> StringMap {
        let mut params = page_size_params(self.page_size_param.as_ref(), page_size);
        if let Some(cursor) = &state.cursor {
            params.insert(self.cursor_param.clone(), cursor.clone());
        }
        params
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count);

        if self.stop_condition.should_stop(body, records_count, state) {
            state.mark_done();
            return NextPage::Done;
        }

        match extract_jsonpath(body, &self.cursor_path) {
            Some(cursor) if !cursor.is_empty() => {
                let mut params = page_size_params(self.page_size_param.as_ref(), page_size);
                params.insert(self.cursor_param.clone(), cursor.clone());
                state.cursor = Some(cursor);
                NextPage::with_params(params)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// Common patterns:
/// - `?offset=100&limit=50`
/// - `?skip=100&take=50`
#[derive(Debug, Clone)]
pub struct OffsetPaginator {
    pub offset_param: String,
    pub limit_param: String,
    pub stop_condition: StopCondition,
}

impl OffsetPaginator {
    fn params(&self, offset: u64, page_size: u32) -> StringMap {
        let mut params = StringMap::new();
        params.insert(self.offset_param.clone(), offset.to_string());
        params.insert(self.limit_param.clone(), page_size.to_string());
        params
    }
}

impl Paginator for OffsetPaginator {
    fn first_params(&self, page_size: u32, state: &mut PaginationState) -> StringMap {
        self.params(state.offset, page_size)
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count);

        // A short page is the last one
        if self.stop_condition.should_stop(body, records_count, state)
            || records_count < page_size as usize
        {
            state.mark_done();
            return NextPage::Done;
        }

        state.offset += u64::from(page_size);
        NextPage::with_params(self.params(state.offset, page_size))
    }
}

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// Common patterns:
/// - `?page=2`
/// - `?page=2&per_page=50`
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u32,
    pub page_size_param: Option<String>,
    pub stop_condition: StopCondition,
}

impl PageNumberPaginator {
    pub fn new(page_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            stop_condition: StopCondition::EmptyPage,
        }
    }

    #[must_use]
    pub fn with_page_size_param(mut self, param: impl Into<String>) -> Self {
        self.page_size_param = Some(param.into());
        self
    }

    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = condition;
        self
    }

    fn params(&self, page: u32, page_size: u32) -> StringMap {
        let mut params = page_size_params(self.page_size_param.as_ref(), page_size);
        params.insert(self.page_param.clone(), page.to_string());
        params
    }
}

impl Paginator for PageNumberPaginator {
    fn first_params(&self, page_size: u32, state: &mut PaginationState) -> StringMap {
        state.page = self.start_page;
        self.params(state.page, page_size)
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count);

        if self.stop_condition.should_stop(body, records_count, state) {
            state.mark_done();
            return NextPage::Done;
        }

        // Fewer records than requested means this was the last page
        if self.page_size_param.is_some() && records_count < page_size as usize {
            state.mark_done();
            return NextPage::Done;
        }

        state.page += 1;
        NextPage::with_params(self.params(state.page, page_size))
    }
}

// ============================================================================
// Next URL Pagination
// ============================================================================

/// Next URL pagination (URL in response body)
///
/// Common patterns:
/// - `{ "next": "https://api.example.com/items?page=2" }`
/// - `{ "pages": { "next": "..." } }`
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Path to the next URL in the response
    pub path: String,
    pub page_size_param: Option<String>,
}

impl NextUrlPaginator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            page_size_param: None,
        }
    }
}

impl Paginator for NextUrlPaginator {
    fn first_params(&self, page_size: u32, _state: &mut PaginationState) -> StringMap {
        page_size_params(self.page_size_param.as_ref(), page_size)
    }

    fn next_page(
        &self,
        body: &Value,
        records_count: usize,
        _page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count);

        match extract_jsonpath(body, &self.path) {
            Some(next_url) if !next_url.is_empty() && records_count > 0 => {
                state.page += 1;
                NextPage::with_url(next_url)
            }
            _ => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}

// ============================================================================
// No Pagination
// ============================================================================

/// No pagination - single request
#[derive(Debug, Clone, Default)]
pub struct NoPaginator;

impl Paginator for NoPaginator {
    fn first_params(&self, _page_size: u32, _state: &mut PaginationState) -> StringMap {
        StringMap::new()
    }

    fn next_page(
        &self,
        _body: &Value,
        records_count: usize,
        _page_size: u32,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_fetched(records_count);
        state.mark_done();
        NextPage::Done
    }
}
