//! Core assessment engine for CdeGuard.
//!
//! This crate assesses the quality of one in-memory tabular dataset with
//! emphasis on a configurable set of Critical Data Elements (CDEs). Four
//! components do the work:
//! - [`profile`] computes per-column descriptive statistics and
//!   completeness/uniqueness metrics,
//! - [`rules`] runs a registry of independent validation rules,
//! - [`anomaly`] flags numeric outliers by z-score and IQR,
//! - [`scorecard`] folds everything into a single weighted scorecard.
//!
//! [`assess::QualityAssessor`] wires the components together over a shared
//! immutable dataset; output is deterministic, so assessing the same inputs
//! twice yields byte-identical JSON.
//!
//! # Architecture
//! The engine follows these patterns:
//! - Rule registry pattern for validation checks; new rules are added by
//!   registration, not by editing a dispatcher
//! - Injected reference date; the library never reads the wall clock
//! - Per-field failure isolation with fatal errors reserved for empty
//!   datasets and unparseable configuration

pub mod anomaly;
pub mod assess;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod profile;
pub mod registry;
pub mod rules;
pub mod scorecard;

// Re-export commonly used types
pub use anomaly::{AnomalyRecord, DetectionMethod};
pub use assess::QualityAssessor;
pub use error::{CdeGuardError, Result};
pub use loader::{load_csv_str, load_json_str, load_path};
pub use models::{Column, Dataset, InferredType, Value};
pub use profile::FieldProfile;
pub use registry::{CdeDefinition, CdeRegistry, QualityThresholds};
pub use rules::{Severity, ValidationIssue, ValidationRule};
pub use scorecard::{CdeStatus, DimensionScores, QualityScorecard};
