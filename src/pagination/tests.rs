//! Tests for pagination strategies

use super::*;
use crate::types::StringMap;
use serde_json::json;

fn params(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

// ============================================================================
// Cursor Pagination Tests
// ============================================================================

#[test]
fn test_cursor_paginator_follows_cursor() {
    let paginator =
        CursorPaginator::new("starting_after", "pages.next.starting_after").with_page_size_param("per_page");
    let mut state = PaginationState::new();

    assert_eq!(
        paginator.first_params(50, &mut state),
        params(&[("per_page", "50")])
    );

    let body = json!({"data": [{"id": "1"}], "pages": {"next": {"starting_after": "abc"}}});
    let next = paginator.next_page(&body, 1, 50, &mut state);

    assert_eq!(
        next,
        NextPage::with_params(params(&[("per_page", "50"), ("starting_after", "abc")]))
    );
    assert_eq!(state.cursor, Some("abc".to_string()));
    assert_eq!(state.total_fetched, 1);
}

#[test]
fn test_cursor_paginator_stops_without_cursor() {
    let paginator = CursorPaginator::new("starting_after", "pages.next.starting_after");
    let mut state = PaginationState::new();

    let body = json!({"data": [{"id": "1"}], "pages": {}});
    assert!(paginator.next_page(&body, 1, 50, &mut state).is_done());
    assert!(state.done);
}

#[test]
fn test_cursor_paginator_stops_on_empty_page() {
    let paginator = CursorPaginator::new("cursor", "next");
    let mut state = PaginationState::new();

    let body = json!({"data": [], "next": "still-here"});
    assert!(paginator.next_page(&body, 0, 50, &mut state).is_done());
}

// ============================================================================
// Offset Pagination Tests
// ============================================================================

#[test]
fn test_offset_paginator() {
    let paginator = OffsetPaginator {
        offset_param: "offset".to_string(),
        limit_param: "limit".to_string(),
        stop_condition: StopCondition::EmptyPage,
    };
    let mut state = PaginationState::new();

    assert_eq!(
        paginator.first_params(2, &mut state),
        params(&[("limit", "2"), ("offset", "0")])
    );

    let next = paginator.next_page(&json!({}), 2, 2, &mut state);
    assert_eq!(
        next,
        NextPage::with_params(params(&[("limit", "2"), ("offset", "2")]))
    );

    // Short page ends pagination
    assert!(paginator.next_page(&json!({}), 1, 2, &mut state).is_done());
    assert_eq!(state.total_fetched, 3);
}

// ============================================================================
// Page Number Pagination Tests
// ============================================================================

#[test]
fn test_page_number_paginator_does_not_refetch_first_page() {
    let paginator = PageNumberPaginator::new("page", 1).with_page_size_param("per_page");
    let mut state = PaginationState::new();

    assert_eq!(
        paginator.first_params(2, &mut state),
        params(&[("page", "1"), ("per_page", "2")])
    );

    let next = paginator.next_page(&json!({}), 2, 2, &mut state);
    assert_eq!(
        next,
        NextPage::with_params(params(&[("page", "2"), ("per_page", "2")]))
    );

    let next = paginator.next_page(&json!({}), 2, 2, &mut state);
    assert_eq!(
        next,
        NextPage::with_params(params(&[("page", "3"), ("per_page", "2")]))
    );
}

#[test]
fn test_page_number_paginator_zero_based() {
    let paginator = PageNumberPaginator::new("page", 0);
    let mut state = PaginationState::new();

    assert_eq!(paginator.first_params(10, &mut state), params(&[("page", "0")]));
    assert_eq!(
        paginator.next_page(&json!({}), 10, 10, &mut state),
        NextPage::with_params(params(&[("page", "1")]))
    );
}

#[test]
fn test_page_number_paginator_total_pages() {
    let paginator = PageNumberPaginator::new("page", 1)
        .with_stop_condition(StopCondition::total_pages("pages.total_pages"));
    let mut state = PaginationState::new();
    paginator.first_params(50, &mut state);

    let body = json!({"pages": {"page": 1, "total_pages": 2}});
    assert!(!paginator.next_page(&body, 50, 50, &mut state).is_done());

    let body = json!({"pages": {"page": 2, "total_pages": 2}});
    assert!(paginator.next_page(&body, 50, 50, &mut state).is_done());
}

#[test]
fn test_page_number_paginator_short_page() {
    let paginator = PageNumberPaginator::new("page", 1).with_page_size_param("per_page");
    let mut state = PaginationState::new();
    paginator.first_params(50, &mut state);

    assert!(paginator.next_page(&json!({}), 7, 50, &mut state).is_done());
}

// ============================================================================
// Next URL / No Pagination Tests
// ============================================================================

#[test]
fn test_next_url_paginator() {
    let paginator = NextUrlPaginator::new("pages.next");
    let mut state = PaginationState::new();

    let body = json!({"pages": {"next": "https://api.example.com/articles?page=2"}});
    assert_eq!(
        paginator.next_page(&body, 5, 50, &mut state),
        NextPage::with_url("https://api.example.com/articles?page=2")
    );

    let body = json!({"pages": {"next": null}});
    assert!(paginator.next_page(&body, 5, 50, &mut state).is_done());
}

#[test]
fn test_no_paginator() {
    let mut state = PaginationState::new();
    assert!(NoPaginator.first_params(50, &mut state).is_empty());
    assert!(NoPaginator.next_page(&json!({}), 3, 50, &mut state).is_done());
    assert_eq!(state.total_fetched, 3);
}

// ============================================================================
// Stop Conditions & Config
// ============================================================================

#[test]
fn test_stop_conditions() {
    let state = PaginationState {
        total_fetched: 10,
        ..Default::default()
    };

    assert!(StopCondition::field("has_more", false).should_stop(&json!({"has_more": false}), 1, &state));
    assert!(!StopCondition::field("has_more", false).should_stop(&json!({"has_more": true}), 1, &state));
    assert!(StopCondition::total_count("meta.total").should_stop(&json!({"meta": {"total": 10}}), 1, &state));
    assert!(!StopCondition::total_count("meta.total").should_stop(&json!({"meta": {"total": 11}}), 1, &state));
    assert!(!StopCondition::total_count("meta.total").should_stop(&json!({}), 1, &state));
}

#[test]
fn test_pagination_config_from_yaml() {
    let yaml = r"
type: cursor
cursor_param: starting_after
cursor_path: pages.next.starting_after
page_size_param: per_page
";
    let config: PaginationConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        config,
        PaginationConfig::Cursor {
            cursor_param: "starting_after".to_string(),
            cursor_path: "pages.next.starting_after".to_string(),
            page_size_param: Some("per_page".to_string()),
            stop_condition: StopCondition::EmptyPage,
        }
    );

    let yaml = r"
type: page_number
page_param: page
stop_condition:
  type: total_pages
  path: pages.total_pages
";
    let config: PaginationConfig = serde_yaml::from_str(yaml).unwrap();
    assert!(matches!(
        config,
        PaginationConfig::PageNumber { start_page: 1, .. }
    ));
}

#[test]
fn test_pagination_config_build() {
    let paginator = PaginationConfig::page_number("page", 1).build();
    let mut state = PaginationState::new();
    assert_eq!(paginator.first_params(10, &mut state), params(&[("page", "1")]));

    let paginator = PaginationConfig::default().build();
    assert!(paginator.first_params(10, &mut state).is_empty());
}
