//! Response decoding
//!
//! Extracts the list of records from a decoded JSON response body using a
//! configured record path.

mod records;

pub use records::{extract_records, extract_value};

#[cfg(test)]
mod tests;
