use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, ColumnKind, Table, Value};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file, one Arrow column per table column (recommended)
/// * `.json`    – `[{ "heart_rate": 72, "risk_level": "low", ... }, ...]`
/// * `.csv`     – header row followed by one record per line
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let reader: fn(File) -> Result<Table> = match ext.as_str() {
        "parquet" | "pq" => load_parquet,
        "json" => load_json,
        "csv" => load_csv,
        _ => return Err(LoadError::UnsupportedFormat(ext)),
    };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    reader(file).map_err(|reason| LoadError::Decode {
        path: path.to_path_buf(),
        reason,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "heart_rate": 72, "risk_level": "low", "anomaly": 0 },
///   { "heart_rate": 131, "risk_level": "high", "anomaly": 1 }
/// ]
/// ```
///
/// A key missing from a record is a missing cell.
fn load_json(file: File) -> Result<Table> {
    let root: JsonValue =
        serde_json::from_reader(BufReader::new(file)).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(Value::Null, json_to_value))
                .collect();
            Column::inferred(name, values)
        })
        .collect();

    Table::new(columns).context("assembling table from JSON records")
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::from(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Every cell is typed independently; see [`guess_value_type`].
fn load_csv(file: File) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, column) in cells.iter_mut().enumerate() {
            column.push(guess_value_type(record.get(col_idx).unwrap_or("")));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::inferred(name, values))
        .collect();

    Table::new(columns).context("assembling table from CSV records")
}

fn guess_value_type(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::from(f);
    }
    if s == "true" || s == "false" || s == "True" || s == "False" {
        return Value::Bool(s.eq_ignore_ascii_case("true"));
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file, materialising every record batch.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).  Pandas `category` columns arrive as
/// dictionary arrays and are decoded to plain strings.
fn load_parquet(file: File) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let kinds: Vec<ColumnKind> = schema
        .fields()
        .iter()
        .map(|f| arrow_column_kind(f.data_type()))
        .collect();
    for field in schema.fields() {
        if !has_native_reader(field.data_type()) {
            log::warn!(
                "column '{}': rendering Arrow type {:?} as text",
                field.name(),
                field.data_type()
            );
        }
    }
    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); schema.fields().len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            let name = schema.field(col_idx).name();
            let array = decode_dictionary(array)
                .with_context(|| format!("decoding dictionary column '{name}'"))?;
            column.reserve(array.len());
            for row in 0..array.len() {
                column.push(extract_value(&array, row));
            }
        }
    }

    let columns = schema
        .fields()
        .iter()
        .zip(kinds)
        .zip(cells)
        .map(|((field, kind), values)| Column::new(field.name().clone(), kind, values))
        .collect();

    Table::new(columns).context("assembling table from parquet batches")
}

// -- Parquet / Arrow helpers --

/// Map an Arrow type to the kind of table column it becomes.
fn arrow_column_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnKind::Numeric,
        DataType::Boolean => ColumnKind::Boolean,
        DataType::Dictionary(_, value_type) => arrow_column_kind(value_type),
        _ => ColumnKind::Categorical,
    }
}

/// Whether [`extract_value`] reads this type directly instead of going through text.
fn has_native_reader(data_type: &DataType) -> bool {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Date32 | DataType::Date64 => true,
        DataType::Dictionary(_, value_type) => has_native_reader(value_type),
        other => arrow_column_kind(other) != ColumnKind::Categorical,
    }
}

/// Cast dictionary-encoded arrays to their value type so rows can be read directly.
fn decode_dictionary(array: &ArrayRef) -> Result<ArrayRef> {
    match array.data_type() {
        DataType::Dictionary(_, value_type) => {
            Ok(arrow::compute::cast(array, value_type.as_ref())?)
        }
        _ => Ok(array.clone()),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> Value {
    if col.is_null(row) {
        return Value::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Value::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => Value::from(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::from(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 => text_value(col, row).map_or(Value::Null, Value::Date),
        DataType::Float16 | DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => {
            text_value(col, row)
                .and_then(|s| s.parse::<f64>().ok())
                .map_or(Value::Null, Value::from)
        }
        _ => text_value(col, row).map_or(Value::Null, Value::String),
    }
}

fn text_value(col: &ArrayRef, row: usize) -> Option<String> {
    array_value_to_string(col.as_ref(), row).ok()
}
