//! PII categories and the pattern kinds that detect them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of PII reported by scans and redactions.
///
/// Variant order is precedence order, so sorting by category sorts by
/// precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    /// Social Security Number
    Ssn,
    /// Payment card number (bare or formatted)
    Card,
    /// Email address
    Email,
    /// Phone number
    Phone,
}

impl PiiCategory {
    /// All categories in precedence order.
    pub const ALL: [Self; 4] = [Self::Ssn, Self::Card, Self::Email, Self::Phone];

    /// Lowercase name used as map keys and in flags.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::Card => "card",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Placeholder token substituted for a redacted span.
    #[must_use]
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Ssn => "[SSN_REDACTED]",
            Self::Card => "[CARD_REDACTED]",
            Self::Email => "[EMAIL_REDACTED]",
            Self::Phone => "[PHONE_REDACTED]",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ssn => "Social Security Number",
            Self::Card => "Payment card number",
            Self::Email => "Email address",
            Self::Phone => "Phone number",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a single detection rule.
///
/// Card numbers have two rules (bare digit runs and four formatted groups)
/// that both report as [`PiiCategory::Card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// `123-45-6789`
    Ssn,
    /// `4532015112830366`
    CardRaw,
    /// `4532-0151-1283-0366` or `4532 0151 1283 0366`
    CardFormatted,
    /// `user@example.com`
    Email,
    /// `(555) 123-4567`, `+1 555.123.4567`
    Phone,
}

impl PatternKind {
    /// All kinds in precedence order.
    pub const PRECEDENCE: [Self; 5] = [
        Self::Ssn,
        Self::CardRaw,
        Self::CardFormatted,
        Self::Email,
        Self::Phone,
    ];

    /// The category this kind reports as.
    #[must_use]
    pub fn category(&self) -> PiiCategory {
        match self {
            Self::Ssn => PiiCategory::Ssn,
            Self::CardRaw | Self::CardFormatted => PiiCategory::Card,
            Self::Email => PiiCategory::Email,
            Self::Phone => PiiCategory::Phone,
        }
    }

    /// Stable identifier used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssn => "ssn",
            Self::CardRaw => "card_raw",
            Self::CardFormatted => "card_formatted",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
