//! Cohere text tasks as a prediction model
//!
//! A model is created with `USING column = '<input>', task = '<task>'`; each
//! `predict` runs the task on every value of the input column and writes the
//! result into the target column.

use crate::auth::{AuthConfig, CredentialResolver};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const COHERE_BASE_URL: &str = "https://api.cohere.ai";

/// Provider name used for credential lookup
pub const PROVIDER: &str = "cohere";

/// Key under which model arguments are stored
const ARGS_KEY: &str = "args";

/// Text operation applied to the input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    TextSummarization,
    TextGeneration,
    LanguageDetection,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextSummarization => "text-summarization",
            Self::TextGeneration => "text-generation",
            Self::LanguageDetection => "language-detection",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text-summarization" => Ok(Self::TextSummarization),
            "text-generation" => Ok(Self::TextGeneration),
            "language-detection" => Ok(Self::LanguageDetection),
            other => Err(Error::UnsupportedTask {
                task: other.to_string(),
            }),
        }
    }
}

/// Validated model arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorArgs {
    /// Input column
    pub column: String,
    pub task: Task,
    /// Output column; defaults to the task name
    pub target: String,
}

/// `using` section as stored, before the task is checked
struct UsingArgs {
    column: String,
    task: String,
}

impl UsingArgs {
    fn from_args(args: &Value) -> Result<Self> {
        let using = args
            .get("using")
            .filter(|u| u.is_object())
            .ok_or_else(|| Error::missing_field("using"))?;
        let field = |name: &str| {
            using
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::missing_field(format!("using.{name}")))
        };
        Ok(Self {
            column: field("column")?,
            task: field("task")?,
        })
    }
}

impl PredictorArgs {
    /// Parse and validate stored or user supplied arguments
    pub fn from_value(args: &Value) -> Result<Self> {
        let using = UsingArgs::from_args(args)?;
        Self::from_using(using, args)
    }

    fn from_using(using: UsingArgs, args: &Value) -> Result<Self> {
        let task: Task = using.task.parse()?;
        let target = args
            .get("target")
            .and_then(Value::as_str)
            .map_or_else(|| task.to_string(), str::to_string);
        Ok(Self {
            column: using.column,
            task,
            target,
        })
    }
}

/// Remote text operations
#[async_trait]
pub trait TextApi: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;

    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the detected language, e.g. `English`
    async fn detect_language(&self, text: &str) -> Result<String>;
}

/// `TextApi` over the Cohere REST endpoints
#[derive(Debug)]
pub struct CohereClient {
    http: HttpClient,
}

impl CohereClient {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_base_url(api_key, COHERE_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        let config = HttpClientConfig::builder().base_url(base_url).build();
        let http = HttpClient::with_auth(config, AuthConfig::bearer(api_key))?;
        Ok(Self { http })
    }

    async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        debug!("POST {endpoint}");
        self.http
            .request_value(Method::POST, endpoint, RequestConfig::new().json(body))
            .await
    }
}

fn string_at(body: &Value, pointer: &str, endpoint: &str) -> Result<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::decode(format!("{endpoint}: no string at '{pointer}'")))
}

#[async_trait]
impl TextApi for CohereClient {
    async fn summarize(&self, text: &str) -> Result<String> {
        let body = self.post("/v1/summarize", json!({ "text": text })).await?;
        string_at(&body, "/summary", "summarize")
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = self.post("/v1/generate", json!({ "prompt": prompt })).await?;
        string_at(&body, "/generations/0/text", "generate")
    }

    async fn detect_language(&self, text: &str) -> Result<String> {
        let body = self
            .post("/v1/detect-language", json!({ "texts": [text] }))
            .await?;
        string_at(&body, "/results/0/language_name", "detect-language")
    }
}

/// Prediction handler routing one column through a configured Cohere task
pub struct CohereHandler {
    name: String,
    model_storage: Arc<dyn KeyValueStore>,
    credentials: Arc<dyn CredentialResolver>,
    base_url: String,
}

impl CohereHandler {
    pub fn new(
        name: impl Into<String>,
        model_storage: Arc<dyn KeyValueStore>,
        credentials: Arc<dyn CredentialResolver>,
    ) -> Self {
        Self {
            name: name.into(),
            model_storage,
            credentials,
            base_url: COHERE_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validate and store the model arguments, recording `target` in them
    pub fn create(&self, target: &str, args: Value) -> Result<PredictorArgs> {
        let mut args = match args {
            Value::Object(map) => map,
            _ => return Err(Error::missing_field("using")),
        };
        args.insert("target".to_string(), Value::String(target.to_string()));
        let args = Value::Object(args);

        let parsed = PredictorArgs::from_value(&args)?;
        self.model_storage.json_set(ARGS_KEY, args)?;
        info!(
            "{}: model created, task {} from '{}' into '{}'",
            self.name, parsed.task, parsed.column, parsed.target
        );
        Ok(parsed)
    }

    /// Stored model arguments
    pub fn args(&self) -> Result<PredictorArgs> {
        PredictorArgs::from_value(&self.stored_args()?)
    }

    fn stored_args(&self) -> Result<Value> {
        self.model_storage
            .json_get(ARGS_KEY)?
            .ok_or_else(|| Error::config(format!("{}: model has not been created", self.name)))
    }

    /// Run the configured task on every row of `input`
    ///
    /// Without an API key the result is empty but keeps the output columns.
    pub async fn predict(&self, input: &Frame) -> Result<Frame> {
        let stored = self.stored_args()?;
        let using = UsingArgs::from_args(&stored)?;
        let Some(column) = input.column_index(&using.column) else {
            return Err(Error::MissingInputColumn {
                column: using.column,
            });
        };
        let args = PredictorArgs::from_using(using, &stored)?;

        let Some(api_key) = self.credentials.get_api_key(PROVIDER, &stored) else {
            warn!("{}: no API key found, returning an empty result", self.name);
            return Ok(Frame::empty(output_columns(input, &args.target)));
        };
        let client = CohereClient::with_base_url(&api_key, &self.base_url)?;

        let mut values = Vec::with_capacity(input.num_rows());
        for row in input.rows() {
            let text = text_of(&row[column]);
            values.push(Value::String(run_task(&client, args.task, &text).await?));
        }
        debug!("{}: {} rows through {}", self.name, values.len(), args.task);

        input.clone().with_column(&args.target, values)
    }

    pub async fn summarize_text(&self, text: &str) -> Result<String> {
        self.strict_client()?.summarize(text).await
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.strict_client()?.generate(prompt).await
    }

    pub async fn detect_language(&self, text: &str) -> Result<String> {
        self.strict_client()?.detect_language(text).await
    }

    /// Client for the single-text helpers; a missing key is an error
    fn strict_client(&self) -> Result<CohereClient> {
        let args = self.model_storage.json_get(ARGS_KEY)?.unwrap_or(Value::Null);
        let api_key = self
            .credentials
            .get_api_key(PROVIDER, &args)
            .ok_or_else(|| Error::auth(format!("{}: no API key found", self.name)))?;
        CohereClient::with_base_url(&api_key, &self.base_url)
    }
}

impl fmt::Debug for CohereHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereHandler")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

async fn run_task(api: &dyn TextApi, task: Task, text: &str) -> Result<String> {
    match task {
        Task::TextSummarization => api.summarize(text).await,
        Task::TextGeneration => api.generate(text).await,
        Task::LanguageDetection => api.detect_language(text).await,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn output_columns(input: &Frame, target: &str) -> Vec<String> {
    let mut columns = input.columns().to_vec();
    if !columns.iter().any(|c| c == target) {
        columns.push(target.to_string());
    }
    columns
}
