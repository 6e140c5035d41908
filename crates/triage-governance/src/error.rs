use crate::classifier::ClassifierError;
use thiserror::Error;
use triage_core::TriageError;

/// Error types for governance operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// An audit sink could not accept a record.
    #[error("audit sink error: {0}")]
    Sink(String),

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The classifier failed to produce a decision.
    #[error("classification failed: {0}")]
    Classification(#[from] ClassifierError),

    /// Detection core could not be built.
    #[error("detection error: {0}")]
    Pii(#[from] triage_pii::PiiError),

    /// Invalid input or rule definition.
    #[error("validation error: {0}")]
    Validation(String),

    /// Shared domain type rejected a value.
    #[error(transparent)]
    Core(#[from] TriageError),
}

/// Result type alias for governance operations.
pub type Result<T> = std::result::Result<T, GovernanceError>;

impl From<GovernanceError> for TriageError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Io(e) => Self::Io(e),
            GovernanceError::Core(e) => e,
            other => Self::Governance(other.to_string()),
        }
    }
}
