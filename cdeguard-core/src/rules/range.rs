//! Numeric range rules.

use super::{RuleContext, Severity, ValidationIssue, ValidationRule};
use crate::models::{Column, InferredType};

/// Valid credit score bounds (FICO-style).
pub const CREDIT_SCORE_MIN: f64 = 300.0;
/// Upper credit score bound.
pub const CREDIT_SCORE_MAX: f64 = 850.0;

fn range_issue(
    column: &Column,
    rule_name: &str,
    severity: Severity,
    failing: Vec<usize>,
    message: String,
) -> Vec<ValidationIssue> {
    if failing.is_empty() {
        return Vec::new();
    }
    vec![ValidationIssue {
        field: column.name.clone(),
        rule: rule_name.to_string(),
        severity,
        invalid_count: failing.len() as u64,
        sample_row_indices: failing,
        message,
    }]
}

/// Flags negative values in balance/amount-shaped numeric fields.
///
/// Monetary fields are assumed non-negative; a dataset where negatives are
/// legitimate should simply not name the column with a balance/amount role.
/// Severity is HIGH when the field is a declared CDE, MEDIUM otherwise.
pub struct NonNegativeRule;

impl ValidationRule for NonNegativeRule {
    fn name(&self) -> &'static str {
        "range"
    }

    fn applies_to(&self, column: &Column, _ctx: &RuleContext<'_>) -> bool {
        let name = column.name.to_lowercase();
        (name.contains("balance") || name.contains("amount"))
            && column.inferred_type() == InferredType::Number
    }

    fn evaluate(&self, column: &Column, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let failing: Vec<usize> = column
            .numbers_indexed()
            .into_iter()
            .filter_map(|(idx, v)| (v < 0.0).then_some(idx))
            .collect();

        let severity = if ctx.registry.is_cde(&column.name) {
            Severity::High
        } else {
            Severity::Medium
        };
        let count = failing.len();
        range_issue(
            column,
            self.name(),
            severity,
            failing,
            format!("{} records have a negative value in '{}'", count, column.name),
        )
    }
}

/// Flags credit scores outside the valid [300, 850] range.
pub struct CreditScoreRangeRule;

impl ValidationRule for CreditScoreRangeRule {
    fn name(&self) -> &'static str {
        "range"
    }

    fn applies_to(&self, column: &Column, _ctx: &RuleContext<'_>) -> bool {
        column.name.to_lowercase().contains("credit_score")
            && column.inferred_type() == InferredType::Number
    }

    fn evaluate(&self, column: &Column, _ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let failing: Vec<usize> = column
            .numbers_indexed()
            .into_iter()
            .filter_map(|(idx, v)| {
                (!(CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&v)).then_some(idx)
            })
            .collect();

        let count = failing.len();
        range_issue(
            column,
            self.name(),
            Severity::High,
            failing,
            format!(
                "{} records have a credit score outside the valid range ({}-{})",
                count, CREDIT_SCORE_MIN as i64, CREDIT_SCORE_MAX as i64
            ),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::registry::{CdeRegistry, QualityThresholds};
    use chrono::NaiveDate;

    fn ctx<'a>(
        registry: &'a CdeRegistry,
        thresholds: &'a QualityThresholds,
    ) -> RuleContext<'a> {
        RuleContext {
            registry,
            thresholds,
            reference_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            row_count: 3,
        }
    }

    #[test]
    fn test_non_negative_applies_to_money_roles() {
        let registry = CdeRegistry::default();
        let thresholds = QualityThresholds::default();
        let ctx = ctx(&registry, &thresholds);

        let balance = Column::new("account_balance", vec![Value::Number(1.0)]);
        let amount = Column::new("txn_amount", vec![Value::Number(1.0)]);
        let name = Column::new("first_name", vec![Value::Text("x".to_string())]);
        assert!(NonNegativeRule.applies_to(&balance, &ctx));
        assert!(NonNegativeRule.applies_to(&amount, &ctx));
        assert!(!NonNegativeRule.applies_to(&name, &ctx));
    }

    #[test]
    fn test_negative_balance_flagged_medium_for_non_cde() {
        let registry = CdeRegistry::default();
        let thresholds = QualityThresholds::default();
        let ctx = ctx(&registry, &thresholds);

        let column = Column::new(
            "account_balance",
            vec![Value::Number(100.0), Value::Number(-500.0), Value::Null],
        );
        let issues = NonNegativeRule.evaluate(&column, &ctx);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].invalid_count, 1);
        assert_eq!(issues[0].sample_row_indices, vec![1]);
    }

    #[test]
    fn test_negative_balance_escalates_for_cde() {
        let registry = CdeRegistry::from_json_str(
            r#"{"critical_data_elements": [{"field": "account_balance", "nullable": true}]}"#,
        )
        .unwrap();
        let thresholds = QualityThresholds::default();
        let ctx = ctx(&registry, &thresholds);

        let column = Column::new("account_balance", vec![Value::Number(-1.0)]);
        let issues = NonNegativeRule.evaluate(&column, &ctx);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn test_credit_score_range() {
        let registry = CdeRegistry::default();
        let thresholds = QualityThresholds::default();
        let ctx = ctx(&registry, &thresholds);

        let column = Column::new(
            "credit_score",
            vec![
                Value::Number(720.0),
                Value::Number(250.0),
                Value::Number(900.0),
                Value::Null,
            ],
        );
        let issues = CreditScoreRangeRule.evaluate(&column, &ctx);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].invalid_count, 2);
        assert_eq!(issues[0].sample_row_indices, vec![1, 2]);
    }

    #[test]
    fn test_zero_balance_is_valid() {
        let registry = CdeRegistry::default();
        let thresholds = QualityThresholds::default();
        let ctx = ctx(&registry, &thresholds);

        let column = Column::new("account_balance", vec![Value::Number(0.0)]);
        assert!(NonNegativeRule.evaluate(&column, &ctx).is_empty());
    }
}
