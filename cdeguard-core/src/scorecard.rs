//! Scorecard aggregation: folds profiles, validation issues and anomaly
//! records into one `QualityScorecard`.
//!
//! The scorecard is the assessment's only output. Field status uses a
//! `BTreeMap` and every input list arrives pre-sorted, so serializing the
//! same inputs twice yields byte-identical JSON.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::anomaly::AnomalyRecord;
use crate::profile::FieldProfile;
use crate::registry::{CdeRegistry, QualityThresholds};
use crate::rules::{Severity, ValidationIssue};

/// Weight of the completeness dimension in the overall score.
pub const COMPLETENESS_WEIGHT: f64 = 0.4;
/// Weight of the validity dimension in the overall score.
pub const VALIDITY_WEIGHT: f64 = 0.4;
/// Weight of the uniqueness dimension in the overall score.
pub const UNIQUENESS_WEIGHT: f64 = 0.2;
/// CDE fields count double in the completeness dimension.
const CDE_COMPLETENESS_WEIGHT: f64 = 2.0;

/// Per-field verdict for a declared CDE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CdeStatus {
    /// No issues or anomalies touch the field
    Pass,
    /// Non-critical issues or anomalies were found
    Warning,
    /// At least one CRITICAL issue
    Fail,
}

/// The three aggregate quality dimensions, each in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    /// Weighted mean of per-field completeness (CDE fields count double)
    pub completeness: f64,
    /// 1 minus the invalid-record fraction across MEDIUM+ issues
    pub validity: f64,
    /// Mean of per-field uniqueness
    pub uniqueness: f64,
}

/// A dimension score falling below its configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBreach {
    /// Dimension name ("completeness", "validity" or "uniqueness")
    pub dimension: String,
    /// Observed dimension score
    pub observed: f64,
    /// Configured minimum
    pub threshold: f64,
}

/// Complete assessment output for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScorecard {
    /// Rows in the assessed dataset
    pub assessed_rows: u64,
    /// Reference date the temporal rules ran against
    pub reference_date: NaiveDate,
    /// Weighted roll-up of the three dimensions, in [0.0, 1.0]
    pub overall_score: f64,
    /// The three dimension scores
    pub dimension_scores: DimensionScores,
    /// Per-CDE verdict, one entry per declared CDE
    pub cde_status: BTreeMap<String, CdeStatus>,
    /// Validation issues, sorted by (field, rule)
    pub issues: Vec<ValidationIssue>,
    /// Anomaly records, sorted by (field, row_index, method)
    pub anomalies: Vec<AnomalyRecord>,
    /// Dimensions that fell below their configured thresholds
    pub threshold_breaches: Vec<ThresholdBreach>,
    /// Per-field profiles, in dataset column order
    pub field_profiles: Vec<FieldProfile>,
}

/// Folds component outputs into the final scorecard.
///
/// Inputs are expected pre-sorted by their producers; the aggregator
/// preserves their order and adds only the derived roll-ups.
pub fn aggregate(
    profiles: Vec<FieldProfile>,
    issues: Vec<ValidationIssue>,
    anomalies: Vec<AnomalyRecord>,
    registry: &CdeRegistry,
    thresholds: &QualityThresholds,
    row_count: u64,
    reference_date: NaiveDate,
) -> QualityScorecard {
    let dimension_scores = DimensionScores {
        completeness: completeness_score(&profiles),
        validity: validity_score(&issues, row_count, profiles.len()),
        uniqueness: uniqueness_score(&profiles),
    };

    let overall_score = (COMPLETENESS_WEIGHT * dimension_scores.completeness
        + VALIDITY_WEIGHT * dimension_scores.validity
        + UNIQUENESS_WEIGHT * dimension_scores.uniqueness)
        .clamp(0.0, 1.0);

    let cde_status = cde_statuses(registry, &issues, &anomalies);
    let threshold_breaches = threshold_breaches(&dimension_scores, thresholds);

    if !threshold_breaches.is_empty() {
        tracing::warn!(
            breaches = threshold_breaches.len(),
            overall = overall_score,
            "dimension scores fell below configured thresholds"
        );
    }

    QualityScorecard {
        assessed_rows: row_count,
        reference_date,
        overall_score,
        dimension_scores,
        cde_status,
        issues,
        anomalies,
        threshold_breaches,
        field_profiles: profiles,
    }
}

/// Weighted mean of per-field completeness; CDE fields count double so a
/// gap in a critical element drags the dimension harder than the same gap
/// in an ordinary column.
fn completeness_score(profiles: &[FieldProfile]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for profile in profiles {
        let weight = if profile.is_cde {
            CDE_COMPLETENESS_WEIGHT
        } else {
            1.0
        };
        weighted_sum += weight * profile.completeness;
        weight_total += weight;
    }
    if weight_total == 0.0 {
        return 1.0;
    }
    (weighted_sum / weight_total).clamp(0.0, 1.0)
}

/// 1 minus the fraction of invalid records over MEDIUM-and-above issues,
/// relative to the full cell count, floored at zero.
fn validity_score(issues: &[ValidationIssue], row_count: u64, field_count: usize) -> f64 {
    let cells = row_count.saturating_mul(field_count.max(1) as u64);
    if cells == 0 {
        return 1.0;
    }
    let invalid: u64 = issues
        .iter()
        .filter(|issue| issue.severity >= Severity::Medium)
        .map(|issue| issue.invalid_count)
        .sum();
    (1.0 - invalid as f64 / cells as f64).clamp(0.0, 1.0)
}

fn uniqueness_score(profiles: &[FieldProfile]) -> f64 {
    if profiles.is_empty() {
        return 1.0;
    }
    let sum: f64 = profiles.iter().map(|p| p.uniqueness).sum();
    (sum / profiles.len() as f64).clamp(0.0, 1.0)
}

/// One verdict per declared CDE: FAIL on any CRITICAL issue, WARNING on any
/// other MEDIUM+ issue or any anomaly, PASS otherwise. A CDE missing from
/// the dataset still appears here (its missing-field issue is CRITICAL, so
/// it lands on FAIL).
fn cde_statuses(
    registry: &CdeRegistry,
    issues: &[ValidationIssue],
    anomalies: &[AnomalyRecord],
) -> BTreeMap<String, CdeStatus> {
    registry
        .fields()
        .map(|field| {
            let field_issues = issues.iter().filter(|i| i.field == field);
            let mut status = CdeStatus::Pass;
            for issue in field_issues {
                if issue.severity == Severity::Critical {
                    status = CdeStatus::Fail;
                    break;
                }
                if issue.severity >= Severity::Medium {
                    status = CdeStatus::Warning;
                }
            }
            if status == CdeStatus::Pass && anomalies.iter().any(|a| a.field == field) {
                status = CdeStatus::Warning;
            }
            (field.to_string(), status)
        })
        .collect()
}

fn threshold_breaches(
    scores: &DimensionScores,
    thresholds: &QualityThresholds,
) -> Vec<ThresholdBreach> {
    let candidates = [
        ("completeness", scores.completeness, thresholds.completeness),
        ("uniqueness", scores.uniqueness, thresholds.uniqueness),
        ("validity", scores.validity, thresholds.validity),
    ];
    candidates
        .into_iter()
        .filter(|(_, observed, threshold)| observed < threshold)
        .map(|(dimension, observed, threshold)| ThresholdBreach {
            dimension: dimension.to_string(),
            observed,
            threshold,
        })
        .collect()
}
