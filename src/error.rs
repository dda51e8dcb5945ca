//! Custom error types for statement-recon
//!
//! This module defines the error hierarchy for the library using thiserror.
//! Only the I/O surfaces (statement files, repositories, settings) return
//! errors; the matching engine itself is infallible.

use thiserror::Error;

/// The main error type for reconciliation operations
#[derive(Error, Debug)]
pub enum ReconError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Statement import errors (unreadable input, not malformed rows)
    #[error("Import error: {0}")]
    Import(String),

    /// Rule definition errors
    #[error("Rule error: {0}")]
    Rule(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ReconError {
    /// Create a "not found" error for imported statements
    pub fn statement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Statement",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Rule(_))
    }
}

impl From<std::io::Error> for ReconError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReconError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for ReconError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

/// Result type alias for reconciliation operations
pub type ReconResult<T> = Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconError::Config("bad threshold".into());
        assert_eq!(err.to_string(), "Configuration error: bad threshold");
    }

    #[test]
    fn test_not_found_error() {
        let err = ReconError::statement_not_found("stm-1234abcd");
        assert_eq!(err.to_string(), "Statement not found: stm-1234abcd");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_rule_errors_are_validation() {
        let err = ReconError::Rule("rule has no conditions".into());
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReconError = io_err.into();
        assert!(matches!(err, ReconError::Io(_)));
    }
}
