//! Nullability rule for CDE fields declared non-nullable.

use super::{RuleContext, Severity, ValidationIssue, ValidationRule};
use crate::models::Column;

/// Flags null values in CDE fields declared `nullable: false`.
///
/// Severity escalates to CRITICAL when the observed completeness falls
/// below the configured completeness threshold; otherwise the issue is
/// HIGH. Non-CDE columns are never checked here.
pub struct NullabilityRule;

impl ValidationRule for NullabilityRule {
    fn name(&self) -> &'static str {
        "nullability"
    }

    fn applies_to(&self, column: &Column, ctx: &RuleContext<'_>) -> bool {
        ctx.registry
            .definition(&column.name)
            .is_some_and(|def| !def.nullable)
    }

    fn evaluate(&self, column: &Column, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let null_count = column.null_count();
        if null_count == 0 {
            return Vec::new();
        }

        let completeness = 1.0 - null_count as f64 / ctx.row_count as f64;
        let severity = if completeness < ctx.thresholds.completeness {
            Severity::Critical
        } else {
            Severity::High
        };

        vec![ValidationIssue {
            field: column.name.clone(),
            rule: self.name().to_string(),
            severity,
            invalid_count: null_count,
            sample_row_indices: column.null_row_indices(),
            message: format!(
                "CDE field '{}' has {} null values but is marked as non-nullable",
                column.name, null_count
            ),
        }]
    }
}
