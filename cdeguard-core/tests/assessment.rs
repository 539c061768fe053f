//! End-to-end assessment tests over realistic customer datasets.

#![allow(clippy::unwrap_used, clippy::panic)]

use std::sync::Arc;

use cdeguard_core::{
    CdeGuardError, CdeRegistry, CdeStatus, DetectionMethod, QualityAssessor, QualityScorecard,
    Severity, load_csv_str, load_json_str,
};
use chrono::NaiveDate;

const CUSTOMER_CSV: &str = "\
customer_id,email,date_of_birth,account_balance
CUST001,a1@example.com,1990-01-15,1500.50
CUST002,a2@example.com,1985-06-20,2300.00
CUST003,a3@example.com,1992-03-10,450.75
CUST004,,1988-11-30,3200.00
CUST005,invalid-email,1995-07-22,890.25
CUST001,a6@example.com,1991-09-05,1750.00
CUST007,a7@example.com,2025-12-01,2100.50
CUST008,a8@example.com,1987-04-18,-500.00
CUST009,a9@example.com,1993-08-14,1200.00
,a10@example.com,1990-02-28,950.00
CUST011,a11@example.com,1989-12-25,1600.75
";

const CUSTOMER_CONFIG: &str = r#"{
    "critical_data_elements": [
        {"field": "customer_id", "nullable": false, "unique": true},
        {"field": "email", "nullable": false},
        {"field": "account_balance", "nullable": true}
    ]
}"#;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

async fn assess_customers() -> QualityScorecard {
    let dataset = Arc::new(load_csv_str(CUSTOMER_CSV).unwrap());
    let registry = Arc::new(CdeRegistry::from_json_str(CUSTOMER_CONFIG).unwrap());
    QualityAssessor::new(reference_date())
        .assess(dataset, registry)
        .await
        .unwrap()
}

fn find<'a>(
    scorecard: &'a QualityScorecard,
    field: &str,
    rule: &str,
) -> &'a cdeguard_core::ValidationIssue {
    scorecard
        .issues
        .iter()
        .find(|i| i.field == field && i.rule == rule)
        .unwrap_or_else(|| panic!("expected a {rule} issue on {field}"))
}

#[tokio::test]
async fn test_duplicated_customer_id_fails_uniqueness() {
    let scorecard = assess_customers().await;

    let issue = find(&scorecard, "customer_id", "uniqueness");
    // CUST001 appears twice; both rows are implicated
    assert_eq!(issue.invalid_count, 2);
    assert_eq!(issue.sample_row_indices, vec![0, 5]);
    assert_eq!(issue.severity, Severity::Critical);
    assert_eq!(
        scorecard.cde_status.get("customer_id"),
        Some(&CdeStatus::Fail)
    );
}

#[tokio::test]
async fn test_null_in_non_nullable_cde_is_critical() {
    let scorecard = assess_customers().await;

    // 10/11 completeness is below the 0.95 default threshold
    let customer_id = find(&scorecard, "customer_id", "nullability");
    assert_eq!(customer_id.severity, Severity::Critical);
    assert_eq!(customer_id.invalid_count, 1);
    assert_eq!(customer_id.sample_row_indices, vec![9]);

    let email = find(&scorecard, "email", "nullability");
    assert_eq!(email.severity, Severity::Critical);
    assert_eq!(email.sample_row_indices, vec![3]);
}

#[tokio::test]
async fn test_invalid_email_format_flagged_medium() {
    let scorecard = assess_customers().await;

    let issue = find(&scorecard, "email", "format");
    assert_eq!(issue.severity, Severity::Medium);
    assert_eq!(issue.invalid_count, 1);
    assert_eq!(issue.sample_row_indices, vec![4]);
}

#[tokio::test]
async fn test_negative_balance_flagged_on_cde() {
    let scorecard = assess_customers().await;

    let issue = find(&scorecard, "account_balance", "range");
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.invalid_count, 1);
    assert_eq!(issue.sample_row_indices, vec![7]);
    assert_eq!(
        scorecard.cde_status.get("account_balance"),
        Some(&CdeStatus::Warning)
    );
}

#[tokio::test]
async fn test_future_date_flagged_against_injected_reference() {
    let scorecard = assess_customers().await;

    let issue = find(&scorecard, "date_of_birth", "future_date");
    // date_of_birth is not a declared CDE here
    assert_eq!(issue.severity, Severity::Medium);
    assert_eq!(issue.sample_row_indices, vec![6]);
}

#[tokio::test]
async fn test_all_fractional_metrics_bounded() {
    let scorecard = assess_customers().await;

    let bounded = |v: f64| (0.0..=1.0).contains(&v);
    assert!(bounded(scorecard.overall_score));
    assert!(bounded(scorecard.dimension_scores.completeness));
    assert!(bounded(scorecard.dimension_scores.validity));
    assert!(bounded(scorecard.dimension_scores.uniqueness));
    for profile in &scorecard.field_profiles {
        assert!(bounded(profile.completeness), "{}", profile.name);
        assert!(bounded(profile.uniqueness), "{}", profile.name);
    }
    for issue in &scorecard.issues {
        assert!(issue.invalid_count <= scorecard.assessed_rows);
    }
}

#[tokio::test]
async fn test_assessment_is_idempotent() {
    let first = serde_json::to_vec(&assess_customers().await).unwrap();
    let second = serde_json::to_vec(&assess_customers().await).unwrap();
    assert_eq!(first, second, "same inputs must serialize byte-identically");
}

#[tokio::test]
async fn test_clean_cde_field_passes() {
    let dataset = Arc::new(
        load_csv_str(
            "customer_id,email\n\
             CUST001,a@example.com\n\
             CUST002,b@example.com\n\
             CUST003,c@example.com\n\
             CUST004,d@example.com\n",
        )
        .unwrap(),
    );
    let registry = Arc::new(CdeRegistry::from_json_str(CUSTOMER_CONFIG).unwrap());

    let scorecard = QualityAssessor::new(reference_date())
        .assess(dataset, registry)
        .await
        .unwrap();

    assert_eq!(
        scorecard.cde_status.get("customer_id"),
        Some(&CdeStatus::Pass)
    );
    assert_eq!(scorecard.cde_status.get("email"), Some(&CdeStatus::Pass));
    // account_balance is declared but absent: surfaced as a FAIL, not an error
    assert_eq!(
        scorecard.cde_status.get("account_balance"),
        Some(&CdeStatus::Fail)
    );
    let missing = find(&scorecard, "account_balance", "missing_field");
    assert_eq!(missing.severity, Severity::Critical);
    assert_eq!(missing.invalid_count, 4);
}

#[tokio::test]
async fn test_outlier_column_flagged_once_per_method() {
    let dataset = Arc::new(
        load_csv_str(
            "transaction_amount\n10\n12\n11\n13\n12\n1000\n",
        )
        .unwrap(),
    );
    let registry = Arc::new(CdeRegistry::default());

    let scorecard = QualityAssessor::new(reference_date())
        .assess(dataset, registry)
        .await
        .unwrap();

    let zscore: Vec<_> = scorecard
        .anomalies
        .iter()
        .filter(|a| a.method == DetectionMethod::ZScore)
        .collect();
    let iqr: Vec<_> = scorecard
        .anomalies
        .iter()
        .filter(|a| a.method == DetectionMethod::Iqr)
        .collect();

    assert_eq!(zscore.len(), 1);
    assert_eq!(iqr.len(), 1);
    assert_eq!(zscore[0].row_index, 5);
    assert_eq!(iqr[0].row_index, 5);
    assert_eq!(zscore[0].value, 1000.0);
}

#[tokio::test]
async fn test_json_dataset_round_trip() {
    let json = r#"[
        {"customer_id": "CUST001", "email": "a@example.com", "account_balance": 100.5},
        {"customer_id": "CUST002", "email": null, "account_balance": -20.0},
        {"customer_id": "CUST003", "account_balance": 300.0}
    ]"#;
    let dataset = Arc::new(load_json_str(json).unwrap());
    let registry = Arc::new(CdeRegistry::from_json_str(CUSTOMER_CONFIG).unwrap());

    let scorecard = QualityAssessor::new(reference_date())
        .assess(dataset, registry)
        .await
        .unwrap();

    assert_eq!(scorecard.assessed_rows, 3);
    // email is null in row 1 and missing entirely in row 2
    let email = find(&scorecard, "email", "nullability");
    assert_eq!(email.invalid_count, 2);
    let balance = find(&scorecard, "account_balance", "range");
    assert_eq!(balance.invalid_count, 1);
}

#[tokio::test]
async fn test_empty_dataset_is_rejected() {
    let result = load_csv_str("customer_id,email\n");
    assert!(matches!(result, Err(CdeGuardError::EmptyDataset)));
}
