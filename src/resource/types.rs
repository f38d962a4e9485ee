//! Resource schema and column filter types

use crate::error::{Error, Result};
use crate::pagination::PaginationConfig;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

/// Records requested per page when a resource does not set its own size
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Static description of one REST resource exposed as a table
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResourceSchema {
    /// Table name
    pub name: String,
    /// Collection endpoint; single records live at `{endpoint}/{id}`
    pub endpoint: String,
    /// Column used for point lookups and updates
    #[serde(default = "default_id_column")]
    pub id_column: String,
    /// Recognized columns in canonical order
    pub columns: Vec<String>,
    /// Where listing responses keep their records
    #[serde(default = "default_records_path")]
    pub records_path: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub pagination: PaginationConfig,
}

fn default_id_column() -> String {
    "id".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_records_path() -> Option<String> {
    Some("data".to_string())
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl ResourceSchema {
    /// Create a schema with default id column, records path and page size
    pub fn new<I, S>(name: impl Into<String>, endpoint: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            id_column: default_id_column(),
            columns: columns.into_iter().map(Into::into).collect(),
            records_path: default_records_path(),
            page_size: DEFAULT_PAGE_SIZE,
            pagination: PaginationConfig::None,
        }
    }

    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_records_path(mut self, path: Option<String>) -> Self {
        self.records_path = path;
        self
    }

    #[must_use]
    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self
    }

    /// Whether `column` is part of the schema
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Endpoint of a single record
    pub fn record_endpoint(&self, id: &impl std::fmt::Display) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), id)
    }
}

/// Set of column names to leave out of `get_columns`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    names: HashSet<String>,
}

impl ColumnFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a JSON value, which must be an array of strings
    pub fn from_value(value: &Value) -> Result<Self> {
        let invalid = || Error::InvalidIgnoreList {
            found: value.to_string(),
        };

        let items = value.as_array().ok_or_else(invalid)?;
        let names = items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<HashSet<_>>>()?;
        Ok(Self { names })
    }

    pub fn contains(&self, column: &str) -> bool {
        self.names.contains(column)
    }
}
