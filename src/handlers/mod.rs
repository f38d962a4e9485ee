//! Handlers exposing third-party services to SQL
//!
//! - `rest` / `intercom` - REST resources as tables, routed by the engine
//! - `cohere` - text tasks as a prediction model
//! - `kinetica` - raw SQL passthrough to a PostgreSQL-compatible server

pub mod cohere;
pub mod intercom;
pub mod kinetica;
pub mod rest;

pub use cohere::{CohereClient, CohereHandler, PredictorArgs, Task, TextApi};
pub use kinetica::{DuckDbBackend, KineticaHandler, SqlBackend};
pub use rest::RestHandler;

use crate::engine::Engine;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every configured handler, by instance name
#[derive(Debug, Default)]
pub struct HandlerSet {
    engine: Engine,
    rest: BTreeMap<String, RestHandler>,
    predictors: BTreeMap<String, Arc<CohereHandler>>,
    databases: BTreeMap<String, Arc<KineticaHandler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a REST handler and register its tables with the engine
    pub fn add_rest(&mut self, handler: RestHandler) {
        for table in handler.tables() {
            self.engine.register(table);
        }
        self.rest.insert(handler.name().to_string(), handler);
    }

    pub fn add_predictor(&mut self, handler: CohereHandler) {
        self.predictors
            .insert(handler.name().to_string(), Arc::new(handler));
    }

    pub fn add_database(&mut self, handler: KineticaHandler) {
        self.databases
            .insert(handler.instance().to_string(), Arc::new(handler));
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn predictor(&self, name: &str) -> Result<Arc<CohereHandler>> {
        self.predictors
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("No prediction handler named '{name}'")))
    }

    pub fn database(&self, name: &str) -> Result<Arc<KineticaHandler>> {
        self.databases
            .get(name)
            .cloned()
            .ok_or_else(|| Error::config(format!("No SQL handler named '{name}'")))
    }

    /// Names of all handlers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .rest
            .keys()
            .chain(self.predictors.keys())
            .chain(self.databases.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}
