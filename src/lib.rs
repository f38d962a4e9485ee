// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # sqlbridge
//!
//! SQL front end for services that are not databases.
//!
//! ## Features
//!
//! - **REST resources as tables**: `SELECT`, `INSERT` and `UPDATE` translated into
//!   paged listings, point lookups, `POST` and `PUT` calls
//! - **Prediction handlers**: a column of text routed through a Cohere task
//!   (summarization, generation, language detection)
//! - **SQL passthrough**: raw SQL forwarded to a PostgreSQL-compatible server
//! - **Arrow output**: results as Arrow `RecordBatch` or Parquet files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sqlbridge::config::load_config;
//!
//! #[tokio::main]
//! async fn main() -> sqlbridge::Result<()> {
//!     let handlers = load_config("sqlbridge.yaml")?.build()?;
//!
//!     let outcome = handlers
//!         .engine()
//!         .execute("SELECT id, title FROM articles LIMIT 10")
//!         .await?;
//!     if let Some(frame) = outcome.frame() {
//!         println!("{:?}", frame.to_records());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            SQL text → sqlparser → Statement (sql)               │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │        Engine: table name → ApiTable (engine, resource)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Paginate    │  Decode   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ API Key  │ GET/POST  │ Cursor        │ JSONPath  │ Frame       │
//! │ Bearer   │ Retry     │ Offset        │ records   │ Arrow       │
//! │ Basic    │ Rate Limit│ Page Number   │           │ Parquet     │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication and API key resolution
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// Record extraction from response bodies
pub mod decode;

/// Persistent JSON key-value storage
pub mod storage;

/// SQL parsing into the statement model
pub mod sql;

/// Tabular results
pub mod frame;

/// Arrow/Parquet output
pub mod output;

/// REST resources as SQL tables
pub mod resource;

/// Statement routing
pub mod engine;

/// Intercom, generic REST, Cohere and Kinetica handlers
pub mod handlers;

/// YAML configuration
pub mod config;

/// Template interpolation
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use engine::{ApiTable, Engine, QueryOutcome};
pub use error::{Error, ErrorKind, Result};
pub use frame::Frame;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
