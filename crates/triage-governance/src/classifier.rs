//! Category classification seam.
//!
//! The router only sees the [`Classifier`] trait. [`KeywordClassifier`] is the
//! deterministic rule set the pipeline ships with; statistical models plug in
//! behind the same trait.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use triage_core::{Confidence, TicketCategory};

/// Failure reported by a classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The backing model or service could not be reached.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The classifier answered with something unusable.
    #[error("invalid classifier output: {0}")]
    InvalidOutput(String),
}

/// A category decision with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Assigned category
    pub category: TicketCategory,
    /// Classifier confidence
    pub confidence: Confidence,
}

/// Assigns a category to ticket text.
pub trait Classifier: Send + Sync {
    /// Classify `text`.
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;
}

/// A keyword that maps to a fixed classification.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule {
    keyword: String,
    classification: Classification,
}

impl KeywordRule {
    /// Create a rule. The keyword is matched case-insensitively.
    ///
    /// # Errors
    /// Returns an error for an empty keyword, an invalid category name or a
    /// confidence outside `[0.0, 1.0]`.
    pub fn new(keyword: &str, category: &str, confidence: f64) -> triage_core::Result<Self> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(triage_core::TriageError::Validation(
                "keyword must not be empty".to_string(),
            ));
        }

        Ok(Self {
            keyword,
            classification: Classification {
                category: TicketCategory::new(category)?,
                confidence: Confidence::new(confidence)?,
            },
        })
    }

    /// The lowercased keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

static STANDARD_RULES: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    vec![
        KeywordRule::new("password", "access_request", 0.92).expect("valid built-in rule"),
        KeywordRule::new("invoice", "billing_question", 0.88).expect("valid built-in rule"),
    ]
});

static UNKNOWN: Lazy<Classification> = Lazy::new(|| Classification {
    category: TicketCategory::unknown(),
    confidence: Confidence::new(0.42).expect("valid built-in confidence"),
});

/// First matching keyword wins; anything else is `unknown`.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
    fallback: Classification,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(STANDARD_RULES.clone())
    }
}

impl KeywordClassifier {
    /// Create a classifier over `rules`, checked in order.
    #[must_use]
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            fallback: UNKNOWN.clone(),
        }
    }

    /// Replace the classification used when no keyword matches.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Classification) -> Self {
        self.fallback = fallback;
        self
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let lowered = text.to_lowercase();
        let classification = self
            .rules
            .iter()
            .find(|rule| lowered.contains(&rule.keyword))
            .map_or_else(|| self.fallback.clone(), |rule| rule.classification.clone());
        Ok(classification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        KeywordClassifier::default()
            .classify(text)
            .expect("keyword classifier never fails")
    }

    #[test]
    fn test_default_rules() {
        let access = classify("I forgot my PASSWORD again");
        assert_eq!(access.category.as_str(), "access_request");
        assert!((access.confidence.value() - 0.92).abs() < f64::EPSILON);

        let billing = classify("Where is my Invoice?");
        assert_eq!(billing.category.as_str(), "billing_question");
        assert!((billing.confidence.value() - 0.88).abs() < f64::EPSILON);

        let unknown = classify("The printer is on fire");
        assert!(unknown.category.is_unknown());
        assert!((unknown.confidence.value() - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_rule_wins() {
        let result = classify("password reset for the invoice portal");
        assert_eq!(result.category.as_str(), "access_request");
    }

    #[test]
    fn test_custom_rules_and_fallback() {
        let classifier = KeywordClassifier::new(vec![
            KeywordRule::new("Refund", "refund_request", 0.75).expect("valid rule")
        ])
        .with_fallback(Classification {
            category: TicketCategory::new("general").expect("valid category"),
            confidence: Confidence::new(0.3).expect("valid confidence"),
        });

        assert_eq!(classifier.rules()[0].keyword(), "refund");
        let refund = classifier.classify("I want a REFUND").expect("classify");
        assert_eq!(refund.category.as_str(), "refund_request");

        let other = classifier.classify("password").expect("classify");
        assert_eq!(other.category.as_str(), "general");
    }

    #[test]
    fn test_invalid_rules_rejected() {
        assert!(KeywordRule::new("  ", "access_request", 0.9).is_err());
        assert!(KeywordRule::new("password", "Access Request", 0.9).is_err());
        assert!(KeywordRule::new("password", "access_request", 1.5).is_err());
    }
}
