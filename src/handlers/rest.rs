//! Generic REST handler: one API client, many resource tables

use crate::engine::ApiTable;
use crate::http::ApiFacade;
use crate::resource::{ResourceSchema, ResourceTable};
use std::sync::Arc;

/// A named set of resource tables sharing one API client
pub struct RestHandler {
    name: String,
    tables: Vec<Arc<ResourceTable>>,
}

impl RestHandler {
    pub fn new(
        name: impl Into<String>,
        api: Arc<dyn ApiFacade>,
        resources: impl IntoIterator<Item = ResourceSchema>,
    ) -> Self {
        let tables = resources
            .into_iter()
            .map(|schema| Arc::new(ResourceTable::new(schema, Arc::clone(&api))))
            .collect();
        Self {
            name: name.into(),
            tables,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, name: &str) -> Option<Arc<ResourceTable>> {
        self.tables
            .iter()
            .find(|t| t.schema().name == name)
            .cloned()
    }

    /// Tables in configuration order, ready for engine registration
    pub fn tables(&self) -> Vec<Arc<dyn ApiTable>> {
        self.tables
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn ApiTable>)
            .collect()
    }
}

impl std::fmt::Debug for RestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestHandler")
            .field("name", &self.name)
            .field(
                "tables",
                &self.tables.iter().map(|t| &t.schema().name).collect::<Vec<_>>(),
            )
            .finish()
    }
}
