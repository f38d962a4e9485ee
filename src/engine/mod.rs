//! Query engine
//!
//! Parses SQL text and routes each statement to the table registered
//! under its name.
//!
//! # Overview
//!
//! - `ApiTable` - async trait implemented by every queryable table
//! - `Engine` - registry of tables plus statement dispatch
//! - `QueryOutcome` - rows for SELECT, affected count for writes

mod types;

pub use types::{ApiTable, QueryOutcome};

use crate::error::{Error, Result};
use crate::sql::{self, Statement};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Statement router over registered tables
#[derive(Default, Clone)]
pub struct Engine {
    tables: BTreeMap<String, Arc<dyn ApiTable>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its own name, replacing any previous one
    pub fn register(&mut self, table: Arc<dyn ApiTable>) {
        let name = table.name().to_string();
        if self.tables.insert(name.clone(), table).is_some() {
            debug!("Replaced table registration: {name}");
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: Arc<dyn ApiTable>) -> Self {
        self.register(table);
        self
    }

    /// Registered table names, sorted
    pub fn tables(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn table(&self, name: &str) -> Result<&Arc<dyn ApiTable>> {
        self.tables.get(name).ok_or_else(|| Error::TableNotFound {
            table: name.to_string(),
        })
    }

    /// Parse and run exactly one statement
    pub async fn execute(&self, sql: &str) -> Result<QueryOutcome> {
        let statement = sql::parse_statement(sql)?;
        self.execute_statement(&statement).await
    }

    /// Run an already parsed statement
    pub async fn execute_statement(&self, statement: &Statement) -> Result<QueryOutcome> {
        let name = statement.table().name();
        let table = self.table(name)?;
        let start = Instant::now();

        let outcome = match statement {
            Statement::Select(query) => {
                info!("SELECT on {name}");
                QueryOutcome::Rows(table.select(query).await?)
            }
            Statement::Insert(query) => {
                info!("INSERT into {name}");
                table.insert(query).await?;
                QueryOutcome::Affected { rows: 1 }
            }
            Statement::Update(query) => {
                info!("UPDATE on {name}");
                table.update(query).await?;
                QueryOutcome::Affected { rows: 1 }
            }
        };

        debug!("{name}: statement finished in {:?}", start.elapsed());
        Ok(outcome)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("tables", &self.tables())
            .finish()
    }
}
