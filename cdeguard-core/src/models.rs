//! Core tabular data model.
//!
//! Datasets are loosely typed: a single column may mix nulls, text and
//! numbers. Every cell therefore carries an explicit type tag (`Value`) so
//! that profiling and validation logic can pattern-match exhaustively
//! instead of guessing at runtime.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CdeGuardError, Result};

/// A single tabular cell value.
///
/// Variant order matters for deserialization: untagged deserialization tries
/// variants top to bottom, so `Date` must precede `Text` for ISO date
/// strings to keep their tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Numeric value (integers and floats share one representation)
    Number(f64),
    /// Calendar date without time component
    Date(NaiveDate),
    /// Free-form text
    Text(String),
}

impl Value {
    /// Returns true for `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric payload for `Number` values.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the type tag of this value, or `None` for nulls.
    pub const fn tag(&self) -> Option<InferredType> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(InferredType::Boolean),
            Self::Number(_) => Some(InferredType::Number),
            Self::Date(_) => Some(InferredType::Date),
            Self::Text(_) => Some(InferredType::Text),
        }
    }

    /// Converts the value to a canonical string for distinctness comparison.
    ///
    /// Floats use their shortest round-trippable representation, so `1.0`
    /// and `1.00` in the source collapse to one distinct value.
    pub fn canonical(&self) -> String {
        match self {
            Self::Null => "__NULL__".to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Date(d) => d.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Inferred column type: the dominant non-null tag across a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    /// Column holds only nulls; no type could be inferred
    Unknown,
    /// Boolean column
    Boolean,
    /// Numeric column
    Number,
    /// Date column
    Date,
    /// Text column
    Text,
}

impl InferredType {
    /// Human-readable type name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Date => "date",
            Self::Text => "text",
        }
    }

    /// Tie-break precedence when two tags are equally frequent.
    /// Higher wins: a half-numeric half-text column profiles as numeric.
    const fn precedence(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Text => 1,
            Self::Boolean => 2,
            Self::Date => 3,
            Self::Number => 4,
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appeared in the source
    pub name: String,
    /// Cell values, one per dataset row
    pub values: Vec<Value>,
}

impl Column {
    /// Creates a column from a name and values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Count of null cells.
    pub fn null_count(&self) -> u64 {
        self.values.iter().filter(|v| v.is_null()).count() as u64
    }

    /// Count of non-null cells.
    pub fn non_null_count(&self) -> u64 {
        self.values.len() as u64 - self.null_count()
    }

    /// Count of distinct non-null values, compared canonically.
    pub fn distinct_count(&self) -> u64 {
        let mut seen: HashSet<String> = HashSet::new();
        for value in &self.values {
            if !value.is_null() {
                seen.insert(value.canonical());
            }
        }
        seen.len() as u64
    }

    /// Non-null numeric values paired with their row index.
    ///
    /// Only `Number`-tagged cells participate; text that failed numeric
    /// coercion at load time is deliberately excluded here and surfaces as
    /// a coercion failure in the profile instead.
    pub fn numbers_indexed(&self) -> Vec<(usize, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.as_number().map(|n| (idx, n)))
            .collect()
    }

    /// Row indices of null cells.
    pub fn null_row_indices(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(idx, v)| v.is_null().then_some(idx))
            .collect()
    }

    /// Infers the column type from the dominant non-null tag.
    ///
    /// Ties break by `InferredType::precedence` so the result is
    /// deterministic regardless of row order.
    pub fn inferred_type(&self) -> InferredType {
        let mut counts: [(InferredType, u64); 4] = [
            (InferredType::Boolean, 0),
            (InferredType::Number, 0),
            (InferredType::Date, 0),
            (InferredType::Text, 0),
        ];
        for value in &self.values {
            if let Some(tag) = value.tag() {
                for slot in &mut counts {
                    if slot.0 == tag {
                        slot.1 += 1;
                    }
                }
            }
        }

        counts
            .iter()
            .filter(|(_, count)| *count > 0)
            .max_by_key(|(tag, count)| (*count, tag.precedence()))
            .map_or(InferredType::Unknown, |(tag, _)| *tag)
    }
}

/// An immutable in-memory dataset: ordered named columns of equal length.
///
/// All assessment components read the same instance; nothing in this crate
/// mutates a dataset after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Builds a dataset from columns, validating equal lengths.
    ///
    /// # Errors
    /// Returns `CdeGuardError::Configuration` when column lengths disagree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, |c| c.values.len());
        for column in &columns {
            if column.values.len() != row_count {
                return Err(CdeGuardError::configuration(format!(
                    "column '{}' has {} values, expected {}",
                    column.name,
                    column.values.len(),
                    row_count
                )));
            }
        }
        Ok(Self { columns, row_count })
    }

    /// Number of rows.
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// True when the dataset holds zero rows.
    pub const fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Columns in source order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks a column up by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in source order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_value_tags() {
        assert_eq!(Value::Null.tag(), None);
        assert_eq!(Value::Boolean(true).tag(), Some(InferredType::Boolean));
        assert_eq!(Value::Number(1.5).tag(), Some(InferredType::Number));
        assert_eq!(
            Value::Date(date("2024-01-01")).tag(),
            Some(InferredType::Date)
        );
        assert_eq!(
            Value::Text("x".to_string()).tag(),
            Some(InferredType::Text)
        );
    }

    #[test]
    fn test_canonical_collapses_equal_numbers() {
        assert_eq!(Value::Number(1.0).canonical(), Value::Number(1.0).canonical());
        assert_eq!(Value::Null.canonical(), "__NULL__");
    }

    #[test]
    fn test_column_counts() {
        let col = Column::new(
            "x",
            vec![
                Value::Number(1.0),
                Value::Null,
                Value::Number(1.0),
                Value::Number(2.0),
            ],
        );
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.non_null_count(), 3);
        assert_eq!(col.distinct_count(), 2);
        assert_eq!(col.null_row_indices(), vec![1]);
    }

    #[test]
    fn test_numbers_indexed_skips_non_numeric() {
        let col = Column::new(
            "x",
            vec![
                Value::Number(1.0),
                Value::Text("oops".to_string()),
                Value::Null,
                Value::Number(3.0),
            ],
        );
        assert_eq!(col.numbers_indexed(), vec![(0, 1.0), (3, 3.0)]);
    }

    #[test]
    fn test_inferred_type_dominant_tag() {
        let col = Column::new(
            "x",
            vec![
                Value::Number(1.0),
                Value::Number(2.0),
                Value::Text("n/a".to_string()),
                Value::Null,
            ],
        );
        assert_eq!(col.inferred_type(), InferredType::Number);
    }

    #[test]
    fn test_inferred_type_all_null_is_unknown() {
        let col = Column::new("x", vec![Value::Null, Value::Null]);
        assert_eq!(col.inferred_type(), InferredType::Unknown);
    }

    #[test]
    fn test_inferred_type_tie_prefers_number() {
        let col = Column::new(
            "x",
            vec![Value::Number(1.0), Value::Text("a".to_string())],
        );
        assert_eq!(col.inferred_type(), InferredType::Number);
    }

    #[test]
    fn test_dataset_rejects_ragged_columns() {
        let result = Dataset::new(vec![
            Column::new("a", vec![Value::Number(1.0)]),
            Column::new("b", vec![Value::Number(1.0), Value::Number(2.0)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dataset_lookup_preserves_order() {
        let ds = Dataset::new(vec![
            Column::new("b", vec![Value::Null]),
            Column::new("a", vec![Value::Null]),
        ])
        .unwrap();
        assert_eq!(ds.column_names(), vec!["b", "a"]);
        assert!(ds.column("a").is_some());
        assert!(ds.column("missing").is_none());
        assert_eq!(ds.row_count(), 1);
    }
}
