//! Engine types
//!
//! The table trait handlers implement and the outcome of a statement.

use crate::error::Result;
use crate::frame::Frame;
use crate::resource::ColumnFilter;
use crate::sql::{Insert, Select, Update};
use async_trait::async_trait;
use serde::Serialize;

/// A table the engine can route statements to
#[async_trait]
pub trait ApiTable: Send + Sync {
    /// Name the table is registered under
    fn name(&self) -> &str;

    /// Column names in canonical order, minus `ignore`
    fn get_columns(&self, ignore: Option<&ColumnFilter>) -> Vec<String>;

    async fn select(&self, query: &Select) -> Result<Frame>;

    async fn insert(&self, query: &Insert) -> Result<()>;

    async fn update(&self, query: &Update) -> Result<()>;
}

/// Result of executing one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Rows returned by a SELECT
    Rows(Frame),
    /// Number of records written by INSERT/UPDATE
    Affected { rows: u64 },
}

impl QueryOutcome {
    /// Frame of a SELECT, `None` for writes
    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Self::Rows(frame) => Some(frame),
            Self::Affected { .. } => None,
        }
    }

    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Self::Rows(frame) => Some(frame),
            Self::Affected { .. } => None,
        }
    }

    pub fn affected(&self) -> u64 {
        match self {
            Self::Rows(_) => 0,
            Self::Affected { rows } => *rows,
        }
    }
}
