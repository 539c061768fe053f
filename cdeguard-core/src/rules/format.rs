//! Format rules for well-known field roles.
//!
//! A column opts in by name: fields containing "email" are checked against
//! an email pattern, fields containing "phone" against a North-American
//! phone pattern. A value fails only when it is non-null and non-matching;
//! nulls are the nullability rule's business.

use std::sync::LazyLock;

use regex::Regex;

use super::{RuleContext, Severity, ValidationIssue, ValidationRule};
use crate::models::{Column, Value};

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$")
        .expect("email pattern is valid")
});

#[allow(clippy::expect_used)]
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?1?[-.\s]?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}$")
        .expect("phone pattern is valid")
});

fn format_issues(
    column: &Column,
    rule_name: &str,
    pattern: &Regex,
    role: &str,
) -> Vec<ValidationIssue> {
    let failing: Vec<usize> = column
        .values
        .iter()
        .enumerate()
        .filter_map(|(idx, value)| match value {
            Value::Null => None,
            Value::Text(s) => (!pattern.is_match(s)).then_some(idx),
            // A non-text value in a format-checked field can never match
            _ => Some(idx),
        })
        .collect();

    if failing.is_empty() {
        return Vec::new();
    }

    let invalid_count = failing.len() as u64;
    vec![ValidationIssue {
        field: column.name.clone(),
        rule: rule_name.to_string(),
        severity: Severity::Medium,
        invalid_count,
        sample_row_indices: failing,
        message: format!(
            "{} records in '{}' have an invalid {} format",
            invalid_count, column.name, role
        ),
    }]
}

/// Checks email-shaped fields against a standard email pattern.
pub struct EmailFormatRule;

impl ValidationRule for EmailFormatRule {
    fn name(&self) -> &'static str {
        "format"
    }

    fn applies_to(&self, column: &Column, _ctx: &RuleContext<'_>) -> bool {
        column.name.to_lowercase().contains("email")
    }

    fn evaluate(&self, column: &Column, _ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        format_issues(column, self.name(), &EMAIL_PATTERN, "email")
    }
}

/// Checks phone-shaped fields against a digit/punctuation phone pattern.
pub struct PhoneFormatRule;

impl ValidationRule for PhoneFormatRule {
    fn name(&self) -> &'static str {
        "format"
    }

    fn applies_to(&self, column: &Column, _ctx: &RuleContext<'_>) -> bool {
        column.name.to_lowercase().contains("phone")
    }

    fn evaluate(&self, column: &Column, _ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        format_issues(column, self.name(), &PHONE_PATTERN, "phone")
    }
}
