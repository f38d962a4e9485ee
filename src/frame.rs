//! Tabular results
//!
//! A `Frame` is an ordered list of column names plus rows of JSON values.
//! It keeps its columns even when it has no rows.

use crate::error::{Error, Result};
use crate::output;
use arrow::record_batch::RecordBatch;
use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered columns and rows of JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Create a frame from columns and rows
    ///
    /// Every row must have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(Error::ValueCountMismatch {
                columns: columns.len(),
                values: bad.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Create a frame with columns and no rows
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Project JSON objects onto `columns`; missing fields become null
    pub fn from_records(columns: Vec<String>, records: &[Value]) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Project JSON objects onto every key they contain, in first-seen order
    pub fn infer_from_records(records: &[Value]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for key in records.iter().filter_map(Value::as_object).flat_map(Map::keys) {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        Self::from_records(columns, records)
    }

    /// Build a frame from Arrow batches
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self> {
        let (columns, rows) = output::batches_to_rows(batches)?;
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ValueCountMismatch {
                columns: self.columns.len(),
                values: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Set a column, replacing it if present or appending it otherwise
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<Self> {
        if values.len() != self.rows.len() {
            return Err(Error::ValueCountMismatch {
                columns: self.rows.len(),
                values: values.len(),
            });
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(self)
    }

    /// Keep at most `n` rows
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Rows as JSON objects keyed by column
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }

    /// Convert to an Arrow RecordBatch with the same column order
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        output::rows_to_batch(&self.columns, &self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_from_records_projects_in_order() {
        let records = vec![
            json!({"id": 1, "title": "a", "state": "draft"}),
            json!({"id": 2, "state": "published"}),
        ];
        let frame = Frame::from_records(cols(&["state", "title"]), &records);

        assert_eq!(frame.columns(), &cols(&["state", "title"])[..]);
        assert_eq!(
            frame.rows(),
            &[
                vec![json!("draft"), json!("a")],
                vec![json!("published"), Value::Null]
            ][..]
        );
    }

    #[test]
    fn test_infer_from_records_first_seen_order() {
        let records = vec![json!({"text": "a"}), json!({"id": 2, "text": "b"})];
        let frame = Frame::infer_from_records(&records);

        assert_eq!(frame.columns(), &cols(&["text", "id"])[..]);
        assert_eq!(frame.rows()[0], vec![json!("a"), Value::Null]);
    }

    #[test]
    fn test_empty_keeps_columns() {
        let frame = Frame::empty(cols(&["id"]));
        assert!(frame.is_empty());
        assert_eq!(frame.columns().len(), 1);
        assert_eq!(frame.to_record_batch().unwrap().num_columns(), 1);
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = Frame::new(cols(&["a", "b"]), vec![vec![json!(1)]]).unwrap_err();
        assert!(matches!(err, Error::ValueCountMismatch { columns: 2, values: 1 }));
    }

    #[test]
    fn test_with_column_appends_and_replaces() {
        let frame = Frame::new(cols(&["text"]), vec![vec![json!("x")], vec![json!("y")]])
            .unwrap()
            .with_column("summary", vec![json!("X"), json!("Y")])
            .unwrap();
        assert_eq!(frame.columns(), &cols(&["text", "summary"])[..]);

        let frame = frame
            .with_column("text", vec![json!("1"), json!("2")])
            .unwrap();
        assert_eq!(
            frame.column_values("text").unwrap(),
            vec![&json!("1"), &json!("2")]
        );
    }

    #[test]
    fn test_with_column_length_mismatch() {
        let frame = Frame::new(cols(&["text"]), vec![vec![json!("x")]]).unwrap();
        assert!(frame.with_column("summary", vec![]).is_err());
    }

    #[test]
    fn test_to_records() {
        let frame = Frame::new(cols(&["id", "title"]), vec![vec![json!(1), json!("a")]]).unwrap();
        assert_eq!(frame.to_records(), vec![json!({"id": 1, "title": "a"})]);
    }

    #[test]
    fn test_record_batch_round_trip() {
        let frame = Frame::new(
            cols(&["id", "title"]),
            vec![vec![json!(1), json!("a")], vec![json!(2), json!("b")]],
        )
        .unwrap();
        let batch = frame.to_record_batch().unwrap();
        assert_eq!(Frame::from_batches(&[batch]).unwrap(), frame);
    }

    #[test]
    fn test_push_row_and_truncate() {
        let mut frame = Frame::empty(cols(&["id"]));
        frame.push_row(vec![json!(1)]).unwrap();
        frame.push_row(vec![json!(2)]).unwrap();
        assert!(frame.push_row(vec![]).is_err());
        frame.truncate(1);
        assert_eq!(frame.num_rows(), 1);
    }
}
