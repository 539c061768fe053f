//! Temporal rules.

use super::{RuleContext, Severity, ValidationIssue, ValidationRule};
use crate::models::{Column, InferredType, Value};

/// Flags dates after the injected reference date.
///
/// The reference date comes from the assessment context, never from the
/// wall clock, so repeated runs over the same inputs stay byte-identical.
/// Severity is HIGH when the field is a declared CDE, MEDIUM otherwise.
pub struct FutureDateRule;

impl ValidationRule for FutureDateRule {
    fn name(&self) -> &'static str {
        "future_date"
    }

    fn applies_to(&self, column: &Column, _ctx: &RuleContext<'_>) -> bool {
        column.inferred_type() == InferredType::Date
    }

    fn evaluate(&self, column: &Column, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let failing: Vec<usize> = column
            .values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| match value {
                Value::Date(d) if *d > ctx.reference_date => Some(idx),
                _ => None,
            })
            .collect();

        if failing.is_empty() {
            return Vec::new();
        }

        let severity = if ctx.registry.is_cde(&column.name) {
            Severity::High
        } else {
            Severity::Medium
        };
        let count = failing.len();
        vec![ValidationIssue {
            field: column.name.clone(),
            rule: self.name().to_string(),
            severity,
            invalid_count: count as u64,
            sample_row_indices: failing,
            message: format!(
                "{} records in '{}' hold a date after {}",
                count, column.name, ctx.reference_date
            ),
        }]
    }
}
