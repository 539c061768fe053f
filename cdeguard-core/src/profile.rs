//! Column profiling: descriptive statistics and completeness/uniqueness
//! metrics, with enriched detail for CDE fields.
//!
//! The profiler is purely derivational: it reads the immutable dataset and
//! registry and emits one `FieldProfile` per column. It never raises quality
//! issues itself -- contradictions with CDE expectations are exposed as a
//! flag for the Validator to consume without recomputation.

use serde::{Deserialize, Serialize};

use crate::error::{CdeGuardError, Result};
use crate::models::{Column, Dataset, InferredType};
use crate::registry::CdeRegistry;

/// Descriptive statistics and quality metrics for a single column.
///
/// Fractional metrics are clamped to [0.0, 1.0] at construction. Numeric
/// aggregates are `None` for non-numeric columns and for columns without a
/// single numeric value; that degradation is per-field, never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    /// Column name
    pub name: String,
    /// Inferred column type (dominant non-null tag)
    pub dtype_inferred: InferredType,
    /// Total rows in the dataset
    pub row_count: u64,
    /// Null cells in this column
    pub null_count: u64,
    /// Distinct non-null values
    pub distinct_count: u64,
    /// 1 - null_count / row_count
    pub completeness: f64,
    /// distinct_count / max(1, non-null count)
    pub uniqueness: f64,
    /// Minimum numeric value, numeric columns only
    pub min: Option<f64>,
    /// Maximum numeric value, numeric columns only
    pub max: Option<f64>,
    /// Arithmetic mean, numeric columns only
    pub mean: Option<f64>,
    /// Population standard deviation; 0 with fewer than 2 numeric values
    pub stddev: Option<f64>,
    /// Non-null values whose tag disagrees with the inferred column type.
    /// Excluded from numeric statistics, counted here, never dropped silently.
    pub coercion_failures: u64,
    /// Whether the registry declares this field a CDE
    pub is_cde: bool,
    /// True when observed nullability or uniqueness contradicts the
    /// registry's declared expectations for a CDE field
    pub expectation_violation: bool,
}

/// Profiles every column of the dataset.
///
/// # Errors
/// Returns `CdeGuardError::EmptyDataset` when the dataset has zero rows;
/// completeness is undefined in that case.
pub fn profile(dataset: &Dataset, registry: &CdeRegistry) -> Result<Vec<FieldProfile>> {
    if dataset.is_empty() {
        return Err(CdeGuardError::EmptyDataset);
    }

    Ok(dataset
        .columns()
        .iter()
        .map(|column| profile_column(column, dataset.row_count() as u64, registry))
        .collect())
}

fn profile_column(column: &Column, row_count: u64, registry: &CdeRegistry) -> FieldProfile {
    let null_count = column.null_count();
    let non_null = column.non_null_count();
    let distinct_count = column.distinct_count();
    let dtype_inferred = column.inferred_type();

    let completeness = (1.0 - null_count as f64 / row_count as f64).clamp(0.0, 1.0);
    let uniqueness = (distinct_count as f64 / (non_null.max(1)) as f64).clamp(0.0, 1.0);

    let coercion_failures = column
        .values
        .iter()
        .filter_map(|v| v.tag())
        .filter(|tag| *tag != dtype_inferred)
        .count() as u64;
    if coercion_failures > 0 {
        tracing::warn!(
            column = column.name.as_str(),
            inferred = dtype_inferred.name(),
            count = coercion_failures,
            "values could not be coerced to the inferred column type"
        );
    }

    let (min, max, mean, stddev) = if dtype_inferred == InferredType::Number {
        numeric_statistics(column)
    } else {
        (None, None, None, None)
    };

    let definition = registry.definition(&column.name);
    let is_cde = definition.is_some();
    let expectation_violation = definition.is_some_and(|def| {
        let nullability_broken = !def.nullable && completeness < 1.0;
        let uniqueness_broken = def.unique && uniqueness < 1.0;
        nullability_broken || uniqueness_broken
    });

    FieldProfile {
        name: column.name.clone(),
        dtype_inferred,
        row_count,
        null_count,
        distinct_count,
        completeness,
        uniqueness,
        min,
        max,
        mean,
        stddev,
        coercion_failures,
        is_cde,
        expectation_violation,
    }
}

/// Min, max, mean and population standard deviation over numeric values.
///
/// Population stddev divides by n, not n-1, matching the anomaly detector;
/// with fewer than 2 values the stddev is 0 by definition.
fn numeric_statistics(column: &Column) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    let values: Vec<f64> = column
        .numbers_indexed()
        .into_iter()
        .map(|(_, v)| v)
        .collect();

    if values.is_empty() {
        return (None, None, None, None);
    }

    let n = values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / n;
    let stddev = if values.len() < 2 {
        0.0
    } else {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        variance.sqrt()
    };

    (Some(min), Some(max), Some(mean), Some(stddev))
}
