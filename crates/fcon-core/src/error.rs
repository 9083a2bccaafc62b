//! Error types for telemetry mapping

use thiserror::Error;

/// Errors that can occur while normalizing a vendor telemetry payload
#[derive(Debug, Error)]
pub enum MappingError {
    /// A required key is absent from the payload
    #[error("missing key: {0}")]
    MissingKey(String),

    /// A per-item metric has no entry for a required discriminator combination
    #[error("missing {metric} entry for {key}")]
    MissingDiscriminator {
        /// Vendor metric name (e.g. "doorStatus")
        metric: &'static str,
        /// Composite key that was looked up, joined with '+'
        key: String,
    },

    /// A key is present but holds a value of the wrong JSON type
    #[error("invalid type at {path}: expected {expected}")]
    InvalidType {
        /// Dotted path to the offending value
        path: String,
        /// Expected JSON type
        expected: &'static str,
    },

    /// Payload is not valid JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl MappingError {
    /// Returns true when the error comes from an absent key rather than a bad value
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            MappingError::MissingKey(_) | MappingError::MissingDiscriminator { .. }
        )
    }
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;
