//! Error types for the assessment engine.
//!
//! Fatal conditions (empty dataset, unparseable configuration) are errors;
//! per-field degradations (missing CDE columns, coercion failures) are
//! surfaced as validation issues or profile counters and never abort a run.

use thiserror::Error;

/// Main error type for CdeGuard operations.
#[derive(Debug, Error)]
pub enum CdeGuardError {
    /// Dataset has zero rows; nothing can be assessed
    #[error("Dataset contains no rows")]
    EmptyDataset,

    /// CDE configuration document could not be parsed
    #[error("CDE configuration parse failed: {context}")]
    ConfigParse {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Source data could not be parsed into a tabular structure
    #[error("Dataset parse failed: {context}")]
    DatasetParse {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration or internal consistency failure
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// An assessment worker task failed to complete
    #[error("Assessment task failed: {context}")]
    Task { context: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with CdeGuardError
pub type Result<T> = std::result::Result<T, CdeGuardError>;

impl CdeGuardError {
    /// Creates a configuration parse error with context
    pub fn config_parse<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigParse {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a dataset parse error with context
    pub fn dataset_parse<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DatasetParse {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a task failure error
    pub fn task_failed(context: impl Into<String>) -> Self {
        Self::Task {
            context: context.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io_failed(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a serialization error with context
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}
