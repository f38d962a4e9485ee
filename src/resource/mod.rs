//! REST resources as SQL tables
//!
//! A `ResourceTable` translates the statement AST into calls against one
//! id-addressed REST collection:
//!
//! - `SELECT ... WHERE id = v` → `GET {endpoint}/{v}`
//! - `SELECT ... [LIMIT n]` → paged `GET {endpoint}` until `n` rows or exhaustion
//! - `INSERT` → `POST {endpoint}` with the first value tuple
//! - `UPDATE ... WHERE id = v` → `PUT {endpoint}/{v}`

mod table;
mod types;

pub use table::ResourceTable;
pub use types::{ColumnFilter, ResourceSchema, DEFAULT_PAGE_SIZE};
