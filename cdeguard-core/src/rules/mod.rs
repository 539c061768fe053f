//! Rule-based validation.
//!
//! Rules are independent objects registered in a rule set, not branches of
//! a monolithic function: each rule decides which columns it applies to and
//! evaluates them in isolation. New checks are added by registration.
//!
//! Output is deterministically sorted by `(field, rule)` and every issue
//! carries up to [`SAMPLE_ROW_CAP`] row indices so consumers can locate
//! examples without re-scanning the dataset.

mod format;
mod nullability;
mod range;
mod temporal;
mod uniqueness;

pub use format::{EmailFormatRule, PhoneFormatRule};
pub use nullability::NullabilityRule;
pub use range::{CreditScoreRangeRule, NonNegativeRule};
pub use temporal::FutureDateRule;
pub use uniqueness::UniquenessRule;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Column, Dataset};
use crate::registry::{CdeRegistry, QualityThresholds};

/// Maximum number of example row indices attached to one issue.
pub const SAMPLE_ROW_CAP: usize = 10;

/// Issue severity, ordered from least to most severe.
///
/// CRITICAL is reserved for CDE nullability/uniqueness violations that
/// breach their thresholds and for missing CDE fields. Single-status
/// rollups resolve multiple severities by this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational finding
    Low,
    /// Quality defect worth fixing
    Medium,
    /// Significant defect, likely business impact
    High,
    /// CDE contract breach
    Critical,
}

/// A single validation finding for one field and rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field the issue applies to
    pub field: String,
    /// Rule identifier, stable across runs
    pub rule: String,
    /// Issue severity
    pub severity: Severity,
    /// Number of offending records, never more than the dataset row count
    pub invalid_count: u64,
    /// Example row indices, capped at [`SAMPLE_ROW_CAP`]
    pub sample_row_indices: Vec<usize>,
    /// Human-readable summary
    pub message: String,
}

/// Shared read-only context passed to every rule.
pub struct RuleContext<'a> {
    /// CDE declarations
    pub registry: &'a CdeRegistry,
    /// Quality thresholds driving severity escalation
    pub thresholds: &'a QualityThresholds,
    /// Injected assessment date for temporal checks; rules never read the
    /// wall clock
    pub reference_date: NaiveDate,
    /// Dataset row count
    pub row_count: usize,
}

/// A self-contained validation rule.
///
/// Rules must be pure with respect to the dataset: `evaluate` may not
/// mutate anything and must produce the same issues regardless of the
/// order columns are visited in.
pub trait ValidationRule: Send + Sync {
    /// Stable rule identifier used in issue output.
    fn name(&self) -> &'static str;

    /// Whether this rule has anything to say about the column.
    fn applies_to(&self, column: &Column, ctx: &RuleContext<'_>) -> bool;

    /// Evaluates the column, returning zero or more issues.
    fn evaluate(&self, column: &Column, ctx: &RuleContext<'_>) -> Vec<ValidationIssue>;
}

/// The default rule set.
pub fn default_rules() -> Vec<Box<dyn ValidationRule>> {
    vec![
        Box::new(NullabilityRule),
        Box::new(UniquenessRule),
        Box::new(EmailFormatRule),
        Box::new(PhoneFormatRule),
        Box::new(NonNegativeRule),
        Box::new(CreditScoreRangeRule),
        Box::new(FutureDateRule),
    ]
}

/// Validates the dataset against the default rule set.
///
/// Includes the missing-CDE-field check: a declared CDE absent from the
/// dataset's columns yields one CRITICAL issue with `invalid_count` equal
/// to the row count, rather than an error.
pub fn validate(
    dataset: &Dataset,
    registry: &CdeRegistry,
    thresholds: &QualityThresholds,
    reference_date: NaiveDate,
) -> Vec<ValidationIssue> {
    validate_with_rules(dataset, registry, thresholds, reference_date, &default_rules())
}

/// Validates with an explicit rule set; entry point for custom registries.
pub fn validate_with_rules(
    dataset: &Dataset,
    registry: &CdeRegistry,
    thresholds: &QualityThresholds,
    reference_date: NaiveDate,
    rules: &[Box<dyn ValidationRule>],
) -> Vec<ValidationIssue> {
    let ctx = RuleContext {
        registry,
        thresholds,
        reference_date,
        row_count: dataset.row_count(),
    };

    let mut issues: Vec<ValidationIssue> = Vec::new();
    for column in dataset.columns() {
        for rule in rules {
            if rule.applies_to(column, &ctx) {
                issues.extend(rule.evaluate(column, &ctx));
            }
        }
    }

    // Declared CDEs missing from the dataset entirely
    for definition in &registry.critical_data_elements {
        if dataset.column(&definition.field).is_none() {
            tracing::warn!(
                field = definition.field.as_str(),
                "declared CDE field is missing from the dataset"
            );
            issues.push(ValidationIssue {
                field: definition.field.clone(),
                rule: "missing_field".to_string(),
                severity: Severity::Critical,
                invalid_count: dataset.row_count() as u64,
                sample_row_indices: Vec::new(),
                message: format!(
                    "CDE field '{}' is declared in the registry but absent from the dataset",
                    definition.field
                ),
            });
        }
    }

    for issue in &mut issues {
        issue.sample_row_indices.truncate(SAMPLE_ROW_CAP);
    }
    issues.sort_by(|a, b| (&a.field, &a.rule).cmp(&(&b.field, &b.rule)));
    issues
}
