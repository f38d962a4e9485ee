//! API key resolution for handlers
//!
//! A key is looked up, in order, in the model's create arguments, in the
//! engine storage, in a configured key, and finally in the `<PROVIDER>_API_KEY`
//! environment variable. Absence is not an error here; callers decide how strict to be.

use crate::storage::KeyValueStore;
use crate::types::OptionStringExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Finds the API key for a provider
pub trait CredentialResolver: Send + Sync {
    /// Return the key, or `None` if no source has one
    fn get_api_key(&self, provider: &str, args: &Value) -> Option<String>;
}

/// Resolver that always returns the same key (or none)
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    /// Resolver returning `key`
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// Resolver that never finds a key
    pub fn none() -> Self {
        Self { key: None }
    }
}

impl CredentialResolver for StaticCredentials {
    fn get_api_key(&self, _provider: &str, _args: &Value) -> Option<String> {
        self.key.clone().none_if_empty()
    }
}

/// Resolver chaining create args, engine storage and the environment
#[derive(Clone, Default)]
pub struct DefaultCredentials {
    engine_storage: Option<Arc<dyn KeyValueStore>>,
    configured_key: Option<String>,
    use_env: bool,
}

impl DefaultCredentials {
    /// Resolver that only consults the create args
    pub fn new() -> Self {
        Self::default()
    }

    /// Also consult the engine storage
    #[must_use]
    pub fn with_engine_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.engine_storage = Some(storage);
        self
    }

    /// Key used when neither the args nor the engine storage carry one
    #[must_use]
    pub fn with_configured_key(mut self, key: impl Into<String>) -> Self {
        self.configured_key = Some(key.into());
        self
    }

    /// Also consult `<PROVIDER>_API_KEY`
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }
}

impl std::fmt::Debug for DefaultCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCredentials")
            .field("has_engine_storage", &self.engine_storage.is_some())
            .field("has_configured_key", &self.configured_key.is_some())
            .field("use_env", &self.use_env)
            .finish()
    }
}

impl CredentialResolver for DefaultCredentials {
    fn get_api_key(&self, provider: &str, args: &Value) -> Option<String> {
        if let Some(key) = key_from_args(provider, args) {
            debug!("Using {provider} API key from model arguments");
            return Some(key);
        }

        if let Some(storage) = &self.engine_storage {
            if let Ok(Some(engine_args)) = storage.json_get("args") {
                if let Some(key) = key_from_args(provider, &engine_args) {
                    debug!("Using {provider} API key from engine storage");
                    return Some(key);
                }
            }
        }

        if let Some(key) = self.configured_key.clone().none_if_empty() {
            debug!("Using configured {provider} API key");
            return Some(key);
        }

        if self.use_env {
            let var = format!("{}_API_KEY", provider.to_uppercase());
            if let Some(key) = std::env::var(&var).ok().none_if_empty() {
                debug!("Using {provider} API key from {var}");
                return Some(key);
            }
        }

        None
    }
}

/// Look for `api_key` or `<provider>_api_key` at the top level or under `using`
fn key_from_args(provider: &str, args: &Value) -> Option<String> {
    let provider_key = format!("{provider}_api_key");
    let scopes = [args.get("using"), Some(args)];

    scopes.into_iter().flatten().find_map(|scope| {
        ["api_key", provider_key.as_str()]
            .iter()
            .find_map(|name| scope.get(*name).and_then(Value::as_str))
            .map(str::to_string)
            .none_if_empty()
    })
}
