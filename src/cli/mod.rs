//! CLI module
//!
//! Command-line interface over the configured handlers.
//!
//! # Commands
//!
//! - `query` - Run SQL against the REST-backed tables
//! - `tables` - List tables and their columns
//! - `create-model` / `predict` - Prediction handlers
//! - `sql` - Raw SQL passthrough to a database handler
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
pub use server::{router, serve, ServerConfig};
