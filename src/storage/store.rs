//! Key-value store implementation
//!
//! Provides file-based persistence with atomic writes.

use crate::error::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Opaque JSON key-value store used for model and engine metadata
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn json_get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    fn json_set(&self, key: &str, value: Value) -> Result<()>;
}

/// JSON document store, optionally persisted to a file
#[derive(Debug)]
pub struct JsonStore {
    /// Path to the backing file (empty for in-memory)
    path: PathBuf,
    /// Current contents (cached)
    data: Arc<RwLock<Map<String, Value>>>,
}

impl JsonStore {
    /// Create a store backed by `path` without reading it
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            data: Arc::new(RwLock::new(Map::new())),
        }
    }

    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self::new(PathBuf::new())
    }

    /// Create a store from a file, loading existing contents if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::storage(format!("Failed to read store file: {e}")))?;
            match serde_json::from_str(&contents)
                .map_err(|e| Error::storage(format!("Failed to parse store file: {e}")))?
            {
                Value::Object(map) => map,
                other => {
                    return Err(Error::storage(format!(
                        "Store file must contain a JSON object, found {other}"
                    )))
                }
            }
        } else {
            Map::new()
        };

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Save current contents to the backing file
    pub fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let contents = {
            let data = self
                .data
                .read()
                .map_err(|_| Error::storage("Store lock poisoned"))?;
            serde_json::to_string_pretty(&*data)
                .map_err(|e| Error::storage(format!("Failed to serialize store: {e}")))?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, &contents)
            .map_err(|e| Error::storage(format!("Failed to write store file: {e}")))?;
        std::fs::rename(&temp_path, &self.path)
            .map_err(|e| Error::storage(format!("Failed to rename store file: {e}")))?;

        Ok(())
    }

    /// Keys currently stored, sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let data = self
            .data
            .read()
            .map_err(|_| Error::storage("Store lock poisoned"))?;
        let mut keys: Vec<String> = data.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Get the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

impl Default for JsonStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Clone for JsonStore {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            data: Arc::clone(&self.data),
        }
    }
}

impl KeyValueStore for JsonStore {
    fn json_get(&self, key: &str) -> Result<Option<Value>> {
        let data = self
            .data
            .read()
            .map_err(|_| Error::storage("Store lock poisoned"))?;
        Ok(data.get(key).cloned())
    }

    fn json_set(&self, key: &str, value: Value) -> Result<()> {
        {
            let mut data = self
                .data
                .write()
                .map_err(|_| Error::storage("Store lock poisoned"))?;
            data.insert(key.to_string(), value);
        }
        self.save()
    }
}
