//! CDE registry: critical data element definitions and quality thresholds.
//!
//! The registry is parsed from a JSON document of the form:
//!
//! ```json
//! {
//!   "critical_data_elements": [
//!     { "field": "customer_id", "nullable": false, "unique": true, ... }
//!   ],
//!   "quality_thresholds": { "completeness": 0.95, "uniqueness": 0.99 }
//! }
//! ```
//!
//! Absent thresholds fall back to documented defaults. A malformed document
//! is a fatal `ConfigParse` error; an empty element list is valid and simply
//! means no column gets CDE treatment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{CdeGuardError, Result};

/// Default minimum completeness for CDE fields.
pub const DEFAULT_COMPLETENESS_MIN: f64 = 0.95;
/// Default minimum uniqueness for CDE fields declared unique.
pub const DEFAULT_UNIQUENESS_MIN: f64 = 0.99;
/// Default minimum validity for the dataset as a whole.
pub const DEFAULT_VALIDITY_MIN: f64 = 0.98;

/// Declaration of a single critical data element.
///
/// Profiler and Validator reference definitions by field name only; the
/// registry stays the single owner of these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdeDefinition {
    /// Dataset column this declaration applies to
    pub field: String,
    /// What the field means to the business
    #[serde(default)]
    pub business_definition: String,
    /// Accountable owner for this element
    #[serde(default)]
    pub data_owner: String,
    /// Regulation or policy that makes this element critical
    #[serde(default)]
    pub regulatory_requirement: String,
    /// Whether null values are acceptable
    #[serde(default)]
    pub nullable: bool,
    /// Whether values must be unique across rows
    #[serde(default)]
    pub unique: bool,
}

/// Quality dimension thresholds, fractions in [0.0, 1.0].
///
/// Severity escalation in the Validator and threshold breach reporting in
/// the Aggregator both read from here; no component carries its own
/// hard-coded limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum acceptable completeness
    #[serde(default = "default_completeness", alias = "cde_completeness")]
    pub completeness: f64,
    /// Minimum acceptable uniqueness
    #[serde(default = "default_uniqueness", alias = "cde_uniqueness")]
    pub uniqueness: f64,
    /// Minimum acceptable validity
    #[serde(default = "default_validity", alias = "cde_validity")]
    pub validity: f64,
}

const fn default_completeness() -> f64 {
    DEFAULT_COMPLETENESS_MIN
}

const fn default_uniqueness() -> f64 {
    DEFAULT_UNIQUENESS_MIN
}

const fn default_validity() -> f64 {
    DEFAULT_VALIDITY_MIN
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            completeness: DEFAULT_COMPLETENESS_MIN,
            uniqueness: DEFAULT_UNIQUENESS_MIN,
            validity: DEFAULT_VALIDITY_MIN,
        }
    }
}

/// Validation errors for quality thresholds.
#[derive(Debug, Error)]
pub enum ThresholdValidationError {
    #[error("completeness must be between 0.0 and 1.0, got {0}")]
    InvalidCompleteness(f64),
    #[error("uniqueness must be between 0.0 and 1.0, got {0}")]
    InvalidUniqueness(f64),
    #[error("validity must be between 0.0 and 1.0, got {0}")]
    InvalidValidity(f64),
}

impl QualityThresholds {
    /// Creates thresholds with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the completeness threshold.
    pub fn with_completeness(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "completeness threshold {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.completeness = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the uniqueness threshold.
    pub fn with_uniqueness(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "uniqueness threshold {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.uniqueness = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the validity threshold.
    pub fn with_validity(mut self, threshold: f64) -> Self {
        if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(
                "validity threshold {} clamped to valid range [0.0, 1.0]",
                threshold
            );
        }
        self.validity = threshold.clamp(0.0, 1.0);
        self
    }

    /// Validates that every threshold lies in [0.0, 1.0].
    pub fn validate(&self) -> std::result::Result<(), ThresholdValidationError> {
        if !(0.0..=1.0).contains(&self.completeness) {
            return Err(ThresholdValidationError::InvalidCompleteness(
                self.completeness,
            ));
        }
        if !(0.0..=1.0).contains(&self.uniqueness) {
            return Err(ThresholdValidationError::InvalidUniqueness(self.uniqueness));
        }
        if !(0.0..=1.0).contains(&self.validity) {
            return Err(ThresholdValidationError::InvalidValidity(self.validity));
        }
        Ok(())
    }
}

/// Parsed CDE configuration: element declarations plus thresholds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdeRegistry {
    /// Declared critical data elements
    #[serde(default)]
    pub critical_data_elements: Vec<CdeDefinition>,
    /// Global quality thresholds with optional per-document overrides
    #[serde(default)]
    pub quality_thresholds: QualityThresholds,
}

impl CdeRegistry {
    /// Parses a registry from a JSON document.
    ///
    /// # Errors
    /// Returns `CdeGuardError::ConfigParse` for malformed JSON or documents
    /// that do not match the expected shape, and `Configuration` when a
    /// threshold is out of range.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let registry: Self = serde_json::from_str(text)
            .map_err(|e| CdeGuardError::config_parse("CDE configuration document", e))?;
        registry
            .quality_thresholds
            .validate()
            .map_err(|e| CdeGuardError::configuration(e.to_string()))?;
        Ok(registry)
    }

    /// True when the field is a declared CDE.
    pub fn is_cde(&self, field: &str) -> bool {
        self.definition(field).is_some()
    }

    /// Looks a CDE declaration up by field name.
    pub fn definition(&self, field: &str) -> Option<&CdeDefinition> {
        self.critical_data_elements
            .iter()
            .find(|d| d.field == field)
    }

    /// Declared CDE field names in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.critical_data_elements.iter().map(|d| d.field.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE_CONFIG: &str = r#"{
        "dataset": "customers.csv",
        "description": "Customer master data",
        "critical_data_elements": [
            {
                "field": "customer_id",
                "business_definition": "Unique customer identifier",
                "data_owner": "Customer Operations",
                "regulatory_requirement": "KYC",
                "nullable": false,
                "unique": true
            },
            {
                "field": "email",
                "nullable": false,
                "unique": false
            }
        ],
        "quality_thresholds": {
            "completeness": 0.9,
            "uniqueness": 0.98
        }
    }"#;

    #[test]
    fn test_parse_sample_config() {
        let registry = CdeRegistry::from_json_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(registry.critical_data_elements.len(), 2);
        assert!(registry.is_cde("customer_id"));
        assert!(registry.is_cde("email"));
        assert!(!registry.is_cde("signup_date"));

        let customer_id = registry.definition("customer_id").unwrap();
        assert!(!customer_id.nullable);
        assert!(customer_id.unique);
        assert_eq!(customer_id.data_owner, "Customer Operations");
    }

    #[test]
    fn test_parse_partial_thresholds_fall_back_to_defaults() {
        let registry = CdeRegistry::from_json_str(SAMPLE_CONFIG).unwrap();
        assert!((registry.quality_thresholds.completeness - 0.9).abs() < 1e-9);
        assert!((registry.quality_thresholds.uniqueness - 0.98).abs() < 1e-9);
        // validity not in the document, falls back to the default
        assert!((registry.quality_thresholds.validity - DEFAULT_VALIDITY_MIN).abs() < 1e-9);
    }

    #[test]
    fn test_parse_empty_document_is_valid() {
        let registry = CdeRegistry::from_json_str("{}").unwrap();
        assert!(registry.critical_data_elements.is_empty());
        assert_eq!(registry.quality_thresholds, QualityThresholds::default());
    }

    #[test]
    fn test_parse_malformed_document_is_fatal() {
        let result = CdeRegistry::from_json_str("{ not json");
        assert!(matches!(result, Err(CdeGuardError::ConfigParse { .. })));
    }

    #[test]
    fn test_parse_out_of_range_threshold_is_fatal() {
        let result =
            CdeRegistry::from_json_str(r#"{"quality_thresholds": {"completeness": 1.5}}"#);
        assert!(matches!(result, Err(CdeGuardError::Configuration { .. })));
    }

    #[test]
    fn test_threshold_aliases() {
        let registry = CdeRegistry::from_json_str(
            r#"{"quality_thresholds": {"cde_completeness": 0.8, "cde_validity": 0.7}}"#,
        )
        .unwrap();
        assert!((registry.quality_thresholds.completeness - 0.8).abs() < 1e-9);
        assert!((registry.quality_thresholds.validity - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_builder_clamps() {
        let thresholds = QualityThresholds::new()
            .with_completeness(1.5)
            .with_uniqueness(-0.5)
            .with_validity(0.75);
        assert!((thresholds.completeness - 1.0).abs() < 1e-9);
        assert!(thresholds.uniqueness.abs() < 1e-9);
        assert!((thresholds.validity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_validate_rejects_out_of_range() {
        let thresholds = QualityThresholds {
            uniqueness: 2.0,
            ..QualityThresholds::default()
        };
        assert!(matches!(
            thresholds.validate(),
            Err(ThresholdValidationError::InvalidUniqueness(_))
        ));
    }

    #[test]
    fn test_fields_iterates_in_declaration_order() {
        let registry = CdeRegistry::from_json_str(SAMPLE_CONFIG).unwrap();
        let fields: Vec<&str> = registry.fields().collect();
        assert_eq!(fields, vec!["customer_id", "email"]);
    }
}
