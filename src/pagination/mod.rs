//! Pagination module
//!
//! Supports: Cursor, Offset, Page Number, Next URL
//!
//! # Overview
//!
//! The pagination module provides a unified interface for handling different
//! API pagination patterns. Each strategy computes the next request's
//! parameters from the previous response and tracks when the resource is
//! exhausted. Requests are strictly sequential: each page depends on the one
//! before it.

mod strategies;
mod types;

pub use strategies::{
    CursorPaginator, NextUrlPaginator, NoPaginator, OffsetPaginator, PageNumberPaginator,
};
pub use types::{NextPage, PaginationConfig, PaginationState, Paginator, StopCondition};

#[cfg(test)]
mod tests;
