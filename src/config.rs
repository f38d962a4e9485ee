//! Handler configuration
//!
//! A YAML file lists the handlers to expose. String values may reference
//! `{{ env.NAME }}` and `{{ vars.name }}`; the top-level `vars` block is
//! rendered first (against the environment) and then made available to the
//! handler definitions.

use crate::auth::{AuthConfig, CredentialResolver, DefaultCredentials};
use crate::error::{Error, Result};
use crate::handlers::kinetica::ConnectionConfig;
use crate::handlers::{intercom, CohereHandler, HandlerSet, KineticaHandler, RestHandler};
use crate::http::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RateLimiterConfig};
use crate::resource::ResourceSchema;
use crate::storage::{JsonStore, KeyValueStore};
use crate::template::{self, TemplateContext};
use crate::types::BackoffType;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete configuration loaded from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Handlers, in declaration order
    pub handlers: Vec<HandlerConfig>,
}

/// One handler definition
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HandlerConfig {
    /// Intercom articles
    Intercom {
        name: String,
        access_token: String,
        #[serde(default = "default_intercom_url")]
        base_url: String,
        #[serde(default)]
        http: HttpConfig,
    },

    /// Arbitrary REST resources
    Rest {
        name: String,
        base_url: String,
        #[serde(default)]
        auth: AuthConfig,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default)]
        http: HttpConfig,
        resources: Vec<ResourceSchema>,
    },

    /// Cohere text tasks
    Cohere {
        name: String,
        /// Key used when the model args carry none; `COHERE_API_KEY` is the last resort
        #[serde(default)]
        api_key: Option<String>,
        /// Directory for persisted model arguments; in memory when absent
        #[serde(default)]
        model_dir: Option<PathBuf>,
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Kinetica SQL passthrough
    Kinetica {
        name: String,
        connection: ConnectionConfig,
    },
}

fn default_intercom_url() -> String {
    intercom::INTERCOM_BASE_URL.to_string()
}

impl HandlerConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Intercom { name, .. }
            | Self::Rest { name, .. }
            | Self::Cohere { name, .. }
            | Self::Kinetica { name, .. } => name,
        }
    }

    /// Type tag as written in YAML
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Intercom { .. } => "intercom",
            Self::Rest { .. } => "rest",
            Self::Cohere { .. } => "cohere",
            Self::Kinetica { .. } => "kinetica",
        }
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client settings shared by REST handlers
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// `null` disables rate limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackoffConfig {
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60_000
}

impl HttpConfig {
    /// Client config builder carrying these settings
    pub fn builder(&self, base_url: &str) -> HttpClientConfigBuilder {
        let builder = HttpClientConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .backoff(
                self.retry_backoff.backoff_type,
                Duration::from_millis(self.retry_backoff.initial_ms),
                Duration::from_millis(self.retry_backoff.max_ms),
            );
        match &self.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a config file, rendering templates against the environment
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;
    debug!("Loaded config from {}", path.display());
    load_config_from_str(&content, &TemplateContext::from_env())
}

/// Load and validate a config from YAML text
pub fn load_config_from_str(yaml: &str, ctx: &TemplateContext) -> Result<Config> {
    let mut raw: Value = serde_yaml::from_str(yaml)?;

    let ctx = match raw.as_object_mut().and_then(|root| root.remove("vars")) {
        Some(vars) => ctx.clone().with_vars(template::render_value(&vars, ctx)?),
        None => ctx.clone(),
    };

    let rendered = template::render_value(&raw, &ctx)?;
    let config: Config = serde_json::from_value(rendered)
        .map_err(|e| Error::config(format!("Invalid config: {e}")))?;

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Check names, URLs and resource schemas
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut tables = HashSet::new();

        for handler in &self.handlers {
            let name = handler.name();
            if name.is_empty() {
                return Err(Error::config(format!(
                    "{} handler name cannot be empty",
                    handler.kind()
                )));
            }
            if !names.insert(name) {
                return Err(Error::config(format!("Duplicate handler name: {name}")));
            }

            match handler {
                HandlerConfig::Intercom { base_url, .. } => {
                    validate_url(name, base_url)?;
                    if !tables.insert("articles") {
                        return Err(Error::config("Duplicate table name: articles"));
                    }
                }
                HandlerConfig::Rest {
                    base_url,
                    resources,
                    ..
                } => {
                    validate_url(name, base_url)?;
                    if resources.is_empty() {
                        return Err(Error::config(format!(
                            "Handler '{name}' must define at least one resource"
                        )));
                    }
                    for resource in resources {
                        validate_resource(name, resource)?;
                        if !tables.insert(resource.name.as_str()) {
                            return Err(Error::config(format!(
                                "Duplicate table name: {}",
                                resource.name
                            )));
                        }
                    }
                }
                HandlerConfig::Cohere { base_url, .. } => {
                    if let Some(url) = base_url {
                        validate_url(name, url)?;
                    }
                }
                HandlerConfig::Kinetica { connection, .. } => {
                    if connection.host.is_empty() || connection.database.is_empty() {
                        return Err(Error::InvalidConfigValue {
                            field: format!("{name}.connection"),
                            message: "host and database are required".to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Instantiate every handler
    pub fn build(&self) -> Result<HandlerSet> {
        let mut set = HandlerSet::new();

        for handler in &self.handlers {
            match handler {
                HandlerConfig::Intercom {
                    name,
                    access_token,
                    base_url,
                    http,
                } => {
                    let config = intercom::with_headers(http.builder(base_url)).build();
                    set.add_rest(intercom::handler_with_config(name, config, access_token)?);
                }
                HandlerConfig::Rest {
                    name,
                    base_url,
                    auth,
                    headers,
                    http,
                    resources,
                } => {
                    let builder = headers
                        .iter()
                        .fold(http.builder(base_url), |b, (k, v)| b.header(k, v));
                    let client = HttpClient::with_auth(builder.build(), auth.clone())?;
                    set.add_rest(RestHandler::new(
                        name,
                        Arc::new(client),
                        resources.iter().cloned(),
                    ));
                }
                HandlerConfig::Cohere {
                    name,
                    api_key,
                    model_dir,
                    base_url,
                } => {
                    let store = model_store(name, model_dir.as_deref())?;
                    let credentials = match api_key {
                        Some(key) => DefaultCredentials::new().with_configured_key(key),
                        None => DefaultCredentials::new(),
                    };
                    let credentials: Arc<dyn CredentialResolver> =
                        Arc::new(credentials.with_env());
                    let mut cohere = CohereHandler::new(name, store, credentials);
                    if let Some(url) = base_url {
                        cohere = cohere.with_base_url(url);
                    }
                    set.add_predictor(cohere);
                }
                HandlerConfig::Kinetica { name, connection } => {
                    set.add_database(KineticaHandler::connect(name, connection)?);
                }
            }
            info!("Configured {} handler '{}'", handler.kind(), handler.name());
        }

        Ok(set)
    }
}

fn validate_url(handler: &str, url: &str) -> Result<()> {
    url::Url::parse(url).map_err(|e| Error::InvalidConfigValue {
        field: format!("{handler}.base_url"),
        message: format!("'{url}': {e}"),
    })?;
    Ok(())
}

fn validate_resource(handler: &str, resource: &ResourceSchema) -> Result<()> {
    if resource.name.is_empty() {
        return Err(Error::config(format!(
            "Handler '{handler}' has a resource without a name"
        )));
    }
    if resource.columns.is_empty() {
        return Err(Error::config(format!(
            "Resource '{}' must list its columns",
            resource.name
        )));
    }
    if !resource.has_column(&resource.id_column) {
        return Err(Error::config(format!(
            "Resource '{}' columns must include its id column '{}'",
            resource.name, resource.id_column
        )));
    }
    if resource.page_size == 0 {
        return Err(Error::InvalidConfigValue {
            field: format!("{}.page_size", resource.name),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// `<model_dir>/<name>.json`, reloaded if it already exists
fn model_store(name: &str, model_dir: Option<&Path>) -> Result<Arc<dyn KeyValueStore>> {
    let Some(dir) = model_dir else {
        return Ok(Arc::new(JsonStore::in_memory()));
    };
    let path = dir.join(format!("{name}.json"));
    let store = if path.exists() {
        JsonStore::from_file(&path)?
    } else {
        JsonStore::new(&path)
    };
    Ok(Arc::new(store))
}
