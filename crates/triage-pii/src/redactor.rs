//! Redaction of detected PII into category placeholders.

use crate::category::PiiCategory;
use crate::patterns::PatternLibrary;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Upper bound on full passes over the rule set.
const MAX_PASSES: usize = 8;

/// Outcome of a redaction.
///
/// Contains no original PII and is safe to hand to an audit sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RedactionResult {
    /// Input with every detected span replaced by a placeholder
    pub sanitized_text: String,
    /// Categories that fired
    pub flags: BTreeSet<PiiCategory>,
    /// Applied redactions per category
    pub counts: BTreeMap<PiiCategory, usize>,
}

impl RedactionResult {
    /// Whether anything was redacted.
    #[must_use]
    pub fn is_redacted(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Number of redactions applied for `category`.
    #[must_use]
    pub fn count(&self, category: PiiCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Total redactions applied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Flags as `<category>_detected` labels.
    #[must_use]
    pub fn flag_labels(&self) -> Vec<String> {
        self.flags
            .iter()
            .map(|category| format!("{category}_detected"))
            .collect()
    }
}

/// Replaces PII spans with `[<CATEGORY>_REDACTED]` placeholders.
///
/// Kinds are applied in precedence order, each against the text already
/// rewritten by the kinds before it, so a span consumed by a higher-precedence
/// kind is never matched again. Passes repeat until one applies nothing, which
/// makes `redact` idempotent.
#[derive(Debug, Clone)]
pub struct Redactor {
    library: Arc<PatternLibrary>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(PatternLibrary::shared())
    }
}

impl Redactor {
    /// Create a redactor over `library`.
    #[must_use]
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self { library }
    }

    /// Redact every validated PII span in `text`.
    #[must_use]
    pub fn redact(&self, text: &str) -> RedactionResult {
        let mut result = RedactionResult {
            sanitized_text: text.to_string(),
            ..RedactionResult::default()
        };

        // Built-in rules never match a placeholder, so the second pass is
        // normally the last. The bound only matters for custom rules.
        for _ in 0..MAX_PASSES {
            if self.redact_pass(&mut result) == 0 {
                break;
            }
        }

        debug!(
            redactions = result.total(),
            flags = ?result.flags,
            "redacted text"
        );
        result
    }

    /// Redact text that may be absent. `None` yields an empty result.
    #[must_use]
    pub fn redact_optional(&self, text: Option<&str>) -> RedactionResult {
        text.map(|t| self.redact(t)).unwrap_or_default()
    }

    fn redact_pass(&self, result: &mut RedactionResult) -> usize {
        let mut applied = 0;

        for rule in self.library.rules() {
            let current = &result.sanitized_text;
            let spans: Vec<_> = rule.spans(current).collect();
            if spans.is_empty() {
                continue;
            }

            let category = rule.kind().category();
            let placeholder = category.placeholder();
            let mut rewritten = String::with_capacity(current.len());
            let mut cursor = 0;
            for span in &spans {
                rewritten.push_str(&current[cursor..span.start]);
                rewritten.push_str(placeholder);
                cursor = span.end;
            }
            rewritten.push_str(&current[cursor..]);

            result.sanitized_text = rewritten;
            *result.counts.entry(category).or_insert(0) += spans.len();
            result.flags.insert(category);
            applied += spans.len();
        }

        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::PatternKind;
    use crate::patterns::PatternRule;

    #[test]
    fn test_email_and_phone_counts() {
        let text = "Email a@b.com and call 555-123-4567";
        let result = Redactor::default().redact(text);

        assert_eq!(
            result.sanitized_text,
            "Email [EMAIL_REDACTED] and call [PHONE_REDACTED]"
        );
        assert_eq!(result.count(PiiCategory::Email), 1);
        assert_eq!(result.count(PiiCategory::Phone), 1);
        assert_eq!(result.counts.len(), 2);
        assert!(!result.sanitized_text.contains("a@b.com"));
        assert!(!result.sanitized_text.contains("555-123-4567"));
    }

    #[test]
    fn test_counts_serialize_with_lowercase_keys() {
        let result = Redactor::default().redact("Email a@b.com and call 555-123-4567");
        let json = serde_json::to_value(&result).expect("serialize redaction");
        assert_eq!(json["counts"], serde_json::json!({"email": 1, "phone": 1}));
        assert_eq!(json["flags"], serde_json::json!(["email", "phone"]));
    }

    #[test]
    fn test_all_categories() {
        let text = "SSN 123-45-6789, card 4532-0151-1283-0366, raw 4532015112830366, \
                    mail x@y.io, phone (555) 123-4567";
        let result = Redactor::default().redact(text);

        assert_eq!(
            result.sanitized_text,
            "SSN [SSN_REDACTED], card [CARD_REDACTED], raw [CARD_REDACTED], \
             mail [EMAIL_REDACTED], phone [PHONE_REDACTED]"
        );
        assert_eq!(result.count(PiiCategory::Card), 2);
        assert_eq!(result.total(), 5);
    }

    #[test]
    fn test_invalid_card_left_alone() {
        let result = Redactor::default().redact("Order 1234567812345678 shipped");
        assert_eq!(result.sanitized_text, "Order 1234567812345678 shipped");
        assert!(!result.is_redacted());
    }

    #[test]
    fn test_card_after_rejected_digit_run_is_redacted() {
        let text = "(000) 000-0000 5425 2334 3010 9903 5425 2334 3010 9903";
        let result = Redactor::default().redact(text);

        assert_eq!(
            result.sanitized_text,
            "[PHONE_REDACTED] [CARD_REDACTED] [CARD_REDACTED]"
        );
        assert_eq!(result.count(PiiCategory::Card), 2);
        assert_eq!(result.count(PiiCategory::Phone), 1);

        let result = Redactor::default().redact("ref 0000 5425 2334 3010 9903 thanks");
        assert_eq!(result.sanitized_text, "ref 0000 [CARD_REDACTED] thanks");
    }

    #[test]
    fn test_higher_precedence_consumes_overlap() {
        // The phone rule alone would claim the tail of the email local part.
        let library = PatternLibrary::from_rules(vec![
            PatternRule::new(PatternKind::Email, r"\b[\w.-]+@[\w.-]+\.[a-z]{2,}\b", false)
                .expect("email rule"),
            PatternRule::new(PatternKind::Phone, r"\d{3}-\d{4}", false).expect("phone rule"),
        ])
        .expect("custom library");

        let result = Redactor::new(Arc::new(library)).redact("id 555-1234@corp.com today");
        assert_eq!(result.sanitized_text, "id [EMAIL_REDACTED] today");
        assert_eq!(result.count(PiiCategory::Phone), 0);
        assert_eq!(result.count(PiiCategory::Email), 1);
    }

    #[test]
    fn test_idempotent() {
        let redactor = Redactor::default();
        let once = redactor.redact("Call (555) 123-4567 or write to me@here.com");
        let twice = redactor.redact(&once.sanitized_text);
        assert_eq!(once.sanitized_text, twice.sanitized_text);
        assert!(!twice.is_redacted());
    }

    #[test]
    fn test_flag_labels() {
        let result = Redactor::default().redact("a@b.com 555.123.4567");
        assert_eq!(result.flag_labels(), vec!["email_detected", "phone_detected"]);
    }

    #[test]
    fn test_absent_input() {
        let result = Redactor::default().redact_optional(None);
        assert_eq!(result.sanitized_text, "");
        assert!(!result.is_redacted());
    }

    #[test]
    fn test_no_pii_unchanged() {
        let text = "I need help with something.";
        let result = Redactor::default().redact(text);
        assert_eq!(result.sanitized_text, text);
        assert_eq!(result.total(), 0);
    }
}
