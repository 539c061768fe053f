//! Uniqueness rule for CDE fields declared unique.

use std::collections::HashMap;

use super::{RuleContext, Severity, ValidationIssue, ValidationRule};
use crate::models::Column;

/// Flags duplicate values in CDE fields declared `unique: true`.
///
/// `invalid_count` is the number of non-null records participating in a
/// duplicate group: a value appearing twice contributes 2, so consumers see
/// how many rows are entangled, not just how many are surplus. Severity is
/// CRITICAL when the observed uniqueness falls below the configured
/// threshold, HIGH otherwise.
pub struct UniquenessRule;

impl ValidationRule for UniquenessRule {
    fn name(&self) -> &'static str {
        "uniqueness"
    }

    fn applies_to(&self, column: &Column, ctx: &RuleContext<'_>) -> bool {
        ctx.registry
            .definition(&column.name)
            .is_some_and(|def| def.unique)
    }

    fn evaluate(&self, column: &Column, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        // Group non-null row indices by canonical value
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, value) in column.values.iter().enumerate() {
            if !value.is_null() {
                groups.entry(value.canonical()).or_default().push(idx);
            }
        }

        let mut duplicated_rows: Vec<usize> = groups
            .values()
            .filter(|rows| rows.len() > 1)
            .flatten()
            .copied()
            .collect();
        if duplicated_rows.is_empty() {
            return Vec::new();
        }
        duplicated_rows.sort_unstable();

        let non_null = column.non_null_count();
        let uniqueness = column.distinct_count() as f64 / (non_null.max(1)) as f64;
        let severity = if uniqueness < ctx.thresholds.uniqueness {
            Severity::Critical
        } else {
            Severity::High
        };

        vec![ValidationIssue {
            field: column.name.clone(),
            rule: self.name().to_string(),
            severity,
            invalid_count: duplicated_rows.len() as u64,
            sample_row_indices: duplicated_rows,
            message: format!(
                "CDE field '{}' has duplicate values but is marked as unique",
                column.name
            ),
        }]
    }
}
