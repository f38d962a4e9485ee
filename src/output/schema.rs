//! Conversion between row-oriented JSON data and Arrow RecordBatches
//!
//! Column order is always taken from the caller, never from the data, so a
//! batch built from a frame has exactly the frame's columns in the same order.

use crate::error::{Error, Result};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use serde_json::Value;
use std::sync::Arc;

/// Infer an ordered Arrow schema for `columns` from row data
///
/// Every field is nullable; a column with only nulls is typed `Null`.
pub fn infer_schema(columns: &[String], rows: &[Vec<Value>]) -> Schema {
    let fields: Vec<Field> = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let dtype = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            Field::new(name, dtype, true)
        })
        .collect();

    Schema::new(fields)
}

/// Build a RecordBatch from rows, inferring the schema
pub fn rows_to_batch(columns: &[String], rows: &[Vec<Value>]) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(columns, rows));

    let arrays = schema
        .fields()
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let values: Vec<Option<&Value>> = rows.iter().map(|row| row.get(idx)).collect();
            build_array(&values, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    // Row count must be explicit when there are no columns
    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    RecordBatch::try_new_with_options(schema, arrays, &options)
        .map_err(|e| Error::output(format!("Failed to create RecordBatch: {e}")))
}

/// Flatten RecordBatches into column names and rows of JSON values
///
/// Returns no columns when `batches` is empty.
pub fn batches_to_rows(batches: &[RecordBatch]) -> Result<(Vec<String>, Vec<Vec<Value>>)> {
    let Some(first) = batches.first() else {
        return Ok((Vec::new(), Vec::new()));
    };

    let columns: Vec<String> = first
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();

    let mut rows = Vec::new();
    for batch in batches {
        for row_idx in 0..batch.num_rows() {
            let row = batch
                .columns()
                .iter()
                .map(|column| array_value_to_json(column.as_ref(), row_idx))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
    }

    Ok((columns, rows))
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(_) => DataType::Utf8,
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            DataType::List(Arc::new(Field::new("item", element_type, true)))
        }
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Numbers can merge (prefer Float64 for mixed)
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        // Utf8 and anything unexpected
        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.filter(|v| !v.is_null()).map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Some(Value::Array(arr)) = value {
            all_items.extend(arr.iter().map(Some));
        }
        let offset = i32::try_from(all_items.len())
            .map_err(|_| Error::output("Array too large for i32 offset"))?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());

    let list_array = ListArray::new(Arc::clone(field), offset_buffer, items_array, None);
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let child_arrays = fields
        .iter()
        .map(|field| {
            let child_values: Vec<Option<&Value>> = values
                .iter()
                .map(|v| v.and_then(|v| v.get(field.name())))
                .collect();
            build_array(&child_values, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    let struct_array = StructArray::new(fields.clone(), child_arrays, None);
    Ok(Arc::new(struct_array))
}

macro_rules! downcast {
    ($array:expr, $ty:ty) => {
        $array
            .as_any()
            .downcast_ref::<$ty>()
            .ok_or_else(|| Error::output(concat!("Failed to downcast to ", stringify!($ty))))?
    };
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    use arrow::array::{
        Float32Array, Int16Array, Int32Array, Int8Array, LargeStringArray, UInt16Array,
        UInt32Array, UInt64Array, UInt8Array,
    };

    if array.is_null(row) {
        return Ok(Value::Null);
    }

    let value = match array.data_type() {
        DataType::Null => Value::Null,
        DataType::Boolean => Value::Bool(downcast!(array, BooleanArray).value(row)),
        DataType::Int8 => downcast!(array, Int8Array).value(row).into(),
        DataType::Int16 => downcast!(array, Int16Array).value(row).into(),
        DataType::Int32 => downcast!(array, Int32Array).value(row).into(),
        DataType::Int64 => downcast!(array, Int64Array).value(row).into(),
        DataType::UInt8 => downcast!(array, UInt8Array).value(row).into(),
        DataType::UInt16 => downcast!(array, UInt16Array).value(row).into(),
        DataType::UInt32 => downcast!(array, UInt32Array).value(row).into(),
        DataType::UInt64 => downcast!(array, UInt64Array).value(row).into(),
        DataType::Float32 => {
            let val = f64::from(downcast!(array, Float32Array).value(row));
            serde_json::Number::from_f64(val).map_or(Value::Null, Value::Number)
        }
        DataType::Float64 => {
            let val = downcast!(array, Float64Array).value(row);
            serde_json::Number::from_f64(val).map_or(Value::Null, Value::Number)
        }
        DataType::Utf8 => Value::String(downcast!(array, StringArray).value(row).to_string()),
        DataType::LargeUtf8 => {
            Value::String(downcast!(array, LargeStringArray).value(row).to_string())
        }
        DataType::List(_) => {
            let values = downcast!(array, ListArray).value(row);
            let items = (0..values.len())
                .map(|i| array_value_to_json(values.as_ref(), i))
                .collect::<Result<Vec<_>>>()?;
            Value::Array(items)
        }
        DataType::Struct(_) => {
            let arr = downcast!(array, StructArray);
            let mut obj = serde_json::Map::new();
            for (i, field) in arr.fields().iter().enumerate() {
                obj.insert(
                    field.name().clone(),
                    array_value_to_json(arr.column(i).as_ref(), row)?,
                );
            }
            Value::Object(obj)
        }
        // Dates, timestamps, decimals: use Arrow's display formatting
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            Value::String(formatter.value(row).to_string())
        }
    };

    Ok(value)
}
