//! Assessment pipeline: fans the profiler, validator and anomaly detector
//! out over a shared immutable dataset and aggregates their results.
//!
//! The three components are CPU-bound and side-effect free, so they run on
//! `spawn_blocking` workers against the same `Arc<Dataset>`. Each worker
//! produces deterministically sorted output and the aggregator merges them
//! positionally; running them in parallel cannot change the scorecard.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;

use crate::error::{CdeGuardError, Result};
use crate::models::Dataset;
use crate::registry::{CdeRegistry, QualityThresholds};
use crate::scorecard::{self, QualityScorecard};
use crate::{anomaly, profile, rules};

/// Runs complete quality assessments over in-memory datasets.
///
/// The assessor holds everything that parameterizes a run: the reference
/// date for temporal rules and an optional threshold override. It never
/// reads the wall clock; callers inject the date once so repeated runs over
/// the same inputs stay byte-identical.
#[derive(Debug, Clone)]
pub struct QualityAssessor {
    reference_date: NaiveDate,
    thresholds: Option<QualityThresholds>,
}

impl QualityAssessor {
    /// Creates an assessor using the registry's own thresholds.
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            thresholds: None,
        }
    }

    /// Overrides the thresholds from the registry document.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Assesses one dataset against one CDE registry.
    ///
    /// # Errors
    /// Returns `CdeGuardError::EmptyDataset` for zero-row input before any
    /// component runs, and `Task` if a worker panics or is cancelled.
    pub async fn assess(
        &self,
        dataset: Arc<Dataset>,
        registry: Arc<CdeRegistry>,
    ) -> Result<QualityScorecard> {
        if dataset.is_empty() {
            return Err(CdeGuardError::EmptyDataset);
        }

        let thresholds = self
            .thresholds
            .clone()
            .unwrap_or_else(|| registry.quality_thresholds.clone());
        let reference_date = self.reference_date;
        let row_count = dataset.row_count() as u64;

        tracing::debug!(
            rows = row_count,
            columns = dataset.columns().len(),
            cde_fields = registry.critical_data_elements.len(),
            %reference_date,
            "starting quality assessment"
        );

        let profile_task: JoinHandle<Result<Vec<profile::FieldProfile>>> = {
            let dataset = Arc::clone(&dataset);
            let registry = Arc::clone(&registry);
            tokio::task::spawn_blocking(move || profile::profile(&dataset, &registry))
        };
        let validate_task: JoinHandle<Vec<rules::ValidationIssue>> = {
            let dataset = Arc::clone(&dataset);
            let registry = Arc::clone(&registry);
            let thresholds = thresholds.clone();
            tokio::task::spawn_blocking(move || {
                rules::validate(&dataset, &registry, &thresholds, reference_date)
            })
        };
        let detect_task: JoinHandle<Vec<anomaly::AnomalyRecord>> = {
            let dataset = Arc::clone(&dataset);
            tokio::task::spawn_blocking(move || anomaly::detect(&dataset, None))
        };

        let (profiles, issues, anomalies) =
            tokio::join!(profile_task, validate_task, detect_task);
        let profiles = profiles
            .map_err(|e| CdeGuardError::task_failed(format!("profiler worker: {e}")))??;
        let issues = issues
            .map_err(|e| CdeGuardError::task_failed(format!("validator worker: {e}")))?;
        let anomalies = anomalies
            .map_err(|e| CdeGuardError::task_failed(format!("anomaly worker: {e}")))?;

        tracing::info!(
            issues = issues.len(),
            anomalies = anomalies.len(),
            "quality assessment complete"
        );

        Ok(scorecard::aggregate(
            profiles,
            issues,
            anomalies,
            &registry,
            &thresholds,
            row_count,
            reference_date,
        ))
    }
}
