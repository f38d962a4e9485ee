//! SQL front end
//!
//! Parses SQL text with `sqlparser` and converts the result into the small,
//! closed set of statement and expression types the table adapters accept:
//!
//! - `SELECT <targets> FROM t [WHERE ..] [LIMIT n]`
//! - `INSERT INTO t (cols) VALUES (..), ..`
//! - `UPDATE t SET c = v, .. [WHERE ..]`

pub mod ast;
mod parser;

pub use ast::{Constant, Expr, Identifier, Insert, Operator, Select, Statement, Update};
pub use parser::{parse, parse_statement};
