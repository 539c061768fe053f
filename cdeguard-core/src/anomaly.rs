//! Statistical anomaly detection over numeric columns.
//!
//! Two independent methods run per field and a value may be flagged by
//! both. Both are pure functions of the column's non-null numeric values:
//! the result does not depend on row order, and parallel evaluation cannot
//! change it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Column, Dataset, InferredType};

/// Z-score magnitude beyond which a value is an outlier.
pub const Z_SCORE_THRESHOLD: f64 = 3.0;
/// IQR fence multiplier (Tukey's fences).
pub const IQR_MULTIPLIER: f64 = 1.5;
/// Minimum non-null numeric values for leave-one-out z-scores.
pub const Z_SCORE_MIN_VALUES: usize = 3;
/// Minimum non-null numeric values for quartile estimation.
pub const IQR_MIN_VALUES: usize = 4;

const STDDEV_EPSILON: f64 = 1e-9;

/// Detection method that produced an anomaly record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// Standardized deviation from the field mean
    #[serde(rename = "Z_SCORE")]
    ZScore,
    /// Tukey fences on the interquartile range
    #[serde(rename = "IQR")]
    Iqr,
}

/// One detected outlier value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    /// Field the outlier was found in
    pub field: String,
    /// Method that flagged it
    pub method: DetectionMethod,
    /// Dataset row index of the value
    pub row_index: usize,
    /// The outlying value itself
    pub value: f64,
    /// Method-specific magnitude: the z-score, or the distance beyond the
    /// IQR fence in IQR units
    pub score: f64,
}

/// Detects anomalies across numeric columns.
///
/// `fields` restricts detection to the named columns; `None` means every
/// `Number`-inferred column. Under-populated fields are skipped silently
/// (insufficient data is not an error). Output is sorted by
/// `(field, row_index, method)` for reproducibility.
pub fn detect(dataset: &Dataset, fields: Option<&BTreeSet<String>>) -> Vec<AnomalyRecord> {
    let mut records: Vec<AnomalyRecord> = Vec::new();

    for column in dataset.columns() {
        if let Some(wanted) = fields {
            if !wanted.contains(&column.name) {
                continue;
            }
        } else if column.inferred_type() != InferredType::Number {
            continue;
        }

        records.extend(zscore_outliers(column));
        records.extend(iqr_outliers(column));
    }

    records.sort_by(|a, b| {
        (&a.field, a.row_index, a.method).cmp(&(&b.field, b.row_index, b.method))
    });
    records
}

/// Z-score outliers for one column.
///
/// The textbook z-score against the full column mean is bounded by
/// (n-1)/sqrt(n) and can never reach 3.0 in small samples, so each value is
/// standardized against the mean and population stddev of the *other*
/// values (leave-one-out). A column whose values are all identical, or a
/// complement with near-zero spread, is skipped rather than flagged.
fn zscore_outliers(column: &Column) -> Vec<AnomalyRecord> {
    let values = column.numbers_indexed();
    let n = values.len();
    if n < Z_SCORE_MIN_VALUES {
        return Vec::new();
    }

    let sum: f64 = values.iter().map(|(_, v)| v).sum();
    let sum_sq: f64 = values.iter().map(|(_, v)| v * v).sum();

    // Degenerate column: all values identical
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    if variance.sqrt() < STDDEV_EPSILON {
        return Vec::new();
    }

    let rest_n = (n - 1) as f64;
    values
        .iter()
        .filter_map(|&(row_index, value)| {
            let rest_mean = (sum - value) / rest_n;
            let rest_variance = ((sum_sq - value * value) / rest_n - rest_mean * rest_mean).max(0.0);
            let rest_stddev = rest_variance.sqrt();
            if rest_stddev < STDDEV_EPSILON {
                return None;
            }
            let z = (value - rest_mean) / rest_stddev;
            (z.abs() > Z_SCORE_THRESHOLD).then(|| AnomalyRecord {
                field: column.name.clone(),
                method: DetectionMethod::ZScore,
                row_index,
                value,
                score: z,
            })
        })
        .collect()
}

/// IQR outliers for one column using Tukey's fences.
fn iqr_outliers(column: &Column) -> Vec<AnomalyRecord> {
    let values = column.numbers_indexed();
    if values.len() < IQR_MIN_VALUES {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_MULTIPLIER * iqr;
    let upper = q3 + IQR_MULTIPLIER * iqr;

    values
        .iter()
        .filter_map(|&(row_index, value)| {
            if value >= lower && value <= upper {
                return None;
            }
            let distance = if value < lower { lower - value } else { value - upper };
            // With a zero IQR the fence distance cannot be scaled; report
            // the raw distance instead
            let score = if iqr > STDDEV_EPSILON {
                distance / iqr
            } else {
                distance
            };
            Some(AnomalyRecord {
                field: column.name.clone(),
                method: DetectionMethod::Iqr,
                row_index,
                value,
                score,
            })
        })
        .collect()
}

/// Linear-interpolation quantile over an ascending slice.
///
/// Matches the estimator used by pandas/numpy defaults: the quantile sits
/// at rank `q * (n - 1)` with linear interpolation between neighbors.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    if low == high {
        return sorted[low];
    }
    let fraction = position - low as f64;
    sorted[low] + fraction * (sorted[high] - sorted[low])
}
