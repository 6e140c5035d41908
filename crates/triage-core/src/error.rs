//! Core error types for Triage Guard.
//!
//! This module defines the central error type shared by every crate in the
//! workspace. Subsystem errors convert into it at crate boundaries.

use thiserror::Error;

/// Central error type for all Triage Guard operations.
#[derive(Error, Debug)]
pub enum TriageError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Detection errors (pattern library construction)
    #[error("detection error: {0}")]
    Detection(String),

    /// Governance errors (audit sinks, classification)
    #[error("governance error: {0}")]
    Governance(String),

    /// Validation errors (invalid input, constraints)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `TriageError`.
pub type Result<T> = std::result::Result<T, TriageError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TriageError::Validation("confidence out of range".to_string());
        assert_eq!(err.to_string(), "validation error: confidence out of range");

        let err = ConfigError::InvalidValue {
            field: "latency.warn_ms".to_string(),
            reason: "must not exceed error_ms".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for latency.warn_ms: must not exceed error_ms"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: TriageError = config_err.into();
        assert!(matches!(err, TriageError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: TriageError = io_err.into();
        assert!(matches!(err, TriageError::Io(_)));
    }
}
