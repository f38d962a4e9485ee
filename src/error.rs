//! Error types for sqlbridge
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for sqlbridge
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // SQL Errors
    // ============================================================================
    #[error("Failed to parse SQL: {0}")]
    SqlParse(#[from] sqlparser::parser::ParserError),

    #[error("Unsupported statement: {message}")]
    UnsupportedStatement { message: String },

    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    // ============================================================================
    // Query Translation Errors
    // ============================================================================
    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Unsupported select target: {target}")]
    InvalidTarget { target: String },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Unsupported WHERE clause: {message}")]
    UnsupportedPredicate { message: String },

    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    #[error("Value count mismatch: {columns} columns but {values} values")]
    ValueCountMismatch { columns: usize, values: usize },

    #[error("Ignore list must be a list of column names, got {found}")]
    InvalidIgnoreList { found: String },

    // ============================================================================
    // Prediction Errors
    // ============================================================================
    #[error("Input column '{column}' not found in data")]
    MissingInputColumn { column: String },

    #[error("Unsupported task: {task}")]
    UnsupportedTask { task: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Storage & Database Errors
    // ============================================================================
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Broad classification of errors, mirroring how callers react to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad value in the statement (unknown column, bad target, bad predicate)
    Value,
    /// Valid SQL the adapter deliberately does not support
    NotImplemented,
    /// Positional mismatch between columns and values
    Index,
    /// Argument of the wrong shape
    Type,
    /// Input data does not match the stored configuration
    Runtime,
    /// Configured operation is not one the handler knows
    Unsupported,
    /// Bad or missing configuration
    Config,
    /// Failure talking to an external system or the filesystem
    External,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create an unsupported statement error
    pub fn unsupported_statement(message: impl Into<String>) -> Self {
        Self::UnsupportedStatement {
            message: message.into(),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Create an unsupported predicate error
    pub fn unsupported_predicate(message: impl Into<String>) -> Self {
        Self::UnsupportedPredicate {
            message: message.into(),
        }
    }

    /// Create a not-implemented error
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::NotImplemented {
            message: message.into(),
        }
    }

    /// Create a JSONPath error
    pub fn json_path(message: impl Into<String>) -> Self {
        Self::JsonPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownColumn { .. }
            | Error::InvalidTarget { .. }
            | Error::InvalidValue { .. }
            | Error::UnsupportedPredicate { .. } => ErrorKind::Value,
            Error::NotImplemented { .. } | Error::UnsupportedStatement { .. } => {
                ErrorKind::NotImplemented
            }
            Error::ValueCountMismatch { .. } => ErrorKind::Index,
            Error::InvalidIgnoreList { .. } => ErrorKind::Type,
            Error::MissingInputColumn { .. } => ErrorKind::Runtime,
            Error::UnsupportedTask { .. } => ErrorKind::Unsupported,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::Template { .. }
            | Error::UndefinedVariable { .. }
            | Error::TableNotFound { .. }
            | Error::SqlParse(_) => ErrorKind::Config,
            _ => ErrorKind::External,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if this error is an HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 404, .. })
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for sqlbridge
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::unknown_column("articles", "nope");
        assert_eq!(
            err.to_string(),
            "Unknown column 'nope' for table 'articles'"
        );

        let err = Error::ValueCountMismatch {
            columns: 2,
            values: 1,
        };
        assert_eq!(
            err.to_string(),
            "Value count mismatch: 2 columns but 1 values"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::unsupported_predicate("x").kind(), ErrorKind::Value);
        assert_eq!(Error::not_implemented("x").kind(), ErrorKind::NotImplemented);
        assert_eq!(
            Error::ValueCountMismatch {
                columns: 1,
                values: 2
            }
            .kind(),
            ErrorKind::Index
        );
        assert_eq!(
            Error::InvalidIgnoreList {
                found: "1".to_string()
            }
            .kind(),
            ErrorKind::Type
        );
        assert_eq!(
            Error::MissingInputColumn {
                column: "text".to_string()
            }
            .kind(),
            ErrorKind::Runtime
        );
        assert_eq!(
            Error::UnsupportedTask {
                task: "x".to_string()
            }
            .kind(),
            ErrorKind::Unsupported
        );
        assert_eq!(Error::http_status(500, "").kind(), ErrorKind::External);
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::http_status(404, "missing").is_not_found());
        assert!(!Error::http_status(400, "").is_not_found());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
