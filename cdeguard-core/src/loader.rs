//! Dataset loading: CSV and JSON array-of-objects into the tabular model.
//!
//! Every cell is tagged at load time (see `models::Value`); downstream
//! components never re-parse raw text. Parsing precedence for text cells:
//! empty string is null, then boolean, then number, then ISO date, then
//! free text. Non-finite numeric text ("NaN", "inf") stays text so it can
//! never poison statistics.

use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{CdeGuardError, Result};
use crate::models::{Column, Dataset, Value};

/// Parses a raw text cell into a tagged value.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return Value::Number(n);
        }
        return Value::Text(trimmed.to_string());
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Value::Date(d);
    }
    Value::Text(trimmed.to_string())
}

/// Converts a parsed JSON value into a tagged cell value.
///
/// Strings go through `parse_cell` so dates and stringified numbers keep
/// their semantic tag; nested arrays/objects degrade to their JSON text
/// rather than being dropped.
fn from_json_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map_or(Value::Null, Value::Number),
        serde_json::Value::String(s) => parse_cell(s),
        other => Value::Text(other.to_string()),
    }
}

/// Loads a dataset from CSV text with a header row.
///
/// # Errors
/// Returns `DatasetParse` for malformed CSV and `EmptyDataset` when the
/// source has a header but zero data rows.
pub fn load_csv_str(text: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CdeGuardError::dataset_parse("CSV header row", e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| CdeGuardError::dataset_parse(format!("CSV row {}", row_idx), e))?;
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx < columns.len() {
                columns[col_idx].push(parse_cell(cell));
            }
        }
    }

    finish(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

/// Loads a dataset from a JSON array of objects.
///
/// Column order follows first appearance across rows; keys missing from a
/// given row become nulls.
///
/// # Errors
/// Returns `DatasetParse` when the document is not an array of objects and
/// `EmptyDataset` for an empty array.
pub fn load_json_str(text: &str) -> Result<Dataset> {
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(text)
        .map_err(|e| CdeGuardError::dataset_parse("JSON array of objects", e))?;

    let mut names: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in &rows {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = rows
                .iter()
                .map(|row| row.get(&name).map_or(Value::Null, from_json_value))
                .collect();
            Column::new(name, values)
        })
        .collect();

    finish(columns)
}

/// Loads a dataset from a file path, dispatching on extension.
///
/// # Errors
/// Returns `Io` when the file cannot be read, `Configuration` for an
/// unsupported extension, and the respective parse errors otherwise.
pub fn load_path(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CdeGuardError::io_failed(format!("reading {}", path.display()), e))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_csv_str(&text),
        Some("json") => load_json_str(&text),
        other => Err(CdeGuardError::configuration(format!(
            "unsupported data file extension {:?}, expected csv or json",
            other.unwrap_or("<none>")
        ))),
    }
}

fn finish(columns: Vec<Column>) -> Result<Dataset> {
    let dataset = Dataset::new(columns)?;
    if dataset.is_empty() {
        return Err(CdeGuardError::EmptyDataset);
    }
    tracing::debug!(
        rows = dataset.row_count(),
        columns = dataset.columns().len(),
        "dataset loaded"
    );
    Ok(dataset)
}
