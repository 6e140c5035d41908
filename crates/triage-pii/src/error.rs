//! Error types for the detection core.
//!
//! Only library construction can fail. Scanning and redaction never return
//! errors for any input.

use crate::category::PatternKind;
use thiserror::Error;

/// Errors raised while building a pattern library.
#[derive(Error, Debug)]
pub enum PiiError {
    /// A rule's pattern failed to compile
    #[error("failed to compile {kind} pattern: {source}")]
    PatternCompile {
        /// Rule that failed
        kind: PatternKind,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// A rule's pattern matches the empty string
    #[error("{0} pattern matches the empty string")]
    EmptyMatch(PatternKind),

    /// Two rules were registered for the same kind
    #[error("duplicate rule for {0}")]
    DuplicateRule(PatternKind),
}

/// Result type alias for detection-core operations.
pub type Result<T> = std::result::Result<T, PiiError>;

impl From<PiiError> for triage_core::TriageError {
    fn from(err: PiiError) -> Self {
        Self::Detection(err.to_string())
    }
}
