//! Shared types used across Triage Guard.
//!
//! Newtypes for the values that flow between the classifier, the router and
//! the audit records.

use crate::error::TriageError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Newtype for ticket categories produced by a classifier.
///
/// Categories are lowercase snake_case identifiers, 1-64 characters,
/// e.g. `access_request` or `billing_question`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketCategory(String);

impl TicketCategory {
    /// Category assigned when no classification rule applies.
    pub const UNKNOWN: &'static str = "unknown";

    /// Create a new `TicketCategory` from a string.
    ///
    /// # Errors
    /// Returns error if the category is not a lowercase snake_case identifier.
    pub fn new(category: impl Into<String>) -> Result<Self, TriageError> {
        let category = category.into();
        Self::validate(&category)?;
        Ok(Self(category))
    }

    /// The `unknown` category.
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Whether this is the `unknown` category.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(category: &str) -> Result<(), TriageError> {
        static CATEGORY_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = CATEGORY_REGEX
            .get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid regex"));

        if regex.is_match(category) {
            Ok(())
        } else {
            Err(TriageError::Validation(format!(
                "invalid ticket category: must be lowercase snake_case, got '{category}'"
            )))
        }
    }
}

impl fmt::Display for TicketCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TicketCategory {
    type Error = TriageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TicketCategory> for String {
    fn from(category: TicketCategory) -> Self {
        category.0
    }
}

/// Classifier confidence in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

impl Confidence {
    /// Create a new `Confidence`.
    ///
    /// # Errors
    /// Returns error if the value is NaN or outside `[0.0, 1.0]`.
    pub fn new(value: f64) -> Result<Self, TriageError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TriageError::Validation(format!(
                "confidence must be within [0.0, 1.0], got {value}"
            )))
        }
    }

    /// Get the raw value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Round to two decimal places, as reported in decision records.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }

    /// Whether this confidence is strictly below `threshold`.
    #[must_use]
    pub fn is_below(self, threshold: f64) -> bool {
        self.0 < threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<f64> for Confidence {
    type Error = TriageError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(confidence: Confidence) -> Self {
        confidence.0
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Serializes as an RFC 3339 (ISO-8601) UTC string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, TriageError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| TriageError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
