//! Record extraction from JSON response bodies

use crate::error::{Error, Result};
use serde_json::Value;

/// Extract records from a response body
///
/// - no path: an array body is the record list; `null` is no records; any
///   other value is a single record
/// - a dotted path (`data`, `$.data.items`, `items[0]`): the value found
///   there, flattened the same way
/// - a path containing `*`: evaluated with JSONPath
pub fn extract_records(body: &Value, path: Option<&str>) -> Result<Vec<Value>> {
    let found = match path {
        None | Some("" | "$") => Some(body.clone()),
        Some(path) if path.contains('*') => return extract_with_jsonpath(body, path),
        Some(path) => extract_value(body, path),
    };

    Ok(match found {
        Some(Value::Array(arr)) => arr,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    })
}

/// Follow a dotted path with optional `[n]` / `[-n]` array indexing
pub fn extract_value(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        let Some(bracket) = part.find('[') else {
            current = current.get(part)?;
            continue;
        };

        let name = &part[..bracket];
        if !name.is_empty() {
            current = current.get(name)?;
        }

        let index: i64 = part[bracket + 1..].strip_suffix(']')?.parse().ok()?;
        let arr = current.as_array()?;
        let idx = if index < 0 {
            arr.len().checked_sub(index.unsigned_abs() as usize)?
        } else {
            index as usize
        };
        current = arr.get(idx)?;
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![other]),
    }
}
