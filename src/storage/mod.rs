//! Model and engine metadata storage
//!
//! Handlers persist small JSON documents (model arguments, engine
//! connection settings) between calls through the `KeyValueStore` trait.
//!
//! # Overview
//!
//! The storage module provides:
//! - `KeyValueStore` - opaque `json_get` / `json_set` interface
//! - `JsonStore` - in-memory or file-backed implementation with atomic writes

mod store;

pub use store::{JsonStore, KeyValueStore};

#[cfg(test)]
mod tests;
