//! Output module
//!
//! Handles Arrow RecordBatch creation and Parquet file writing.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Inferring ordered Arrow schemas from row data
//! - Converting rows to Arrow RecordBatches and back
//! - Writing Parquet files

mod schema;
mod writer;

pub use schema::{batches_to_rows, infer_schema, rows_to_batch};
pub use writer::{write_batch_to_parquet, ParquetWriterConfig};
