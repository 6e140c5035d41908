//! PII scanner: pattern library plus Luhn gate.

use crate::category::{PatternKind, PiiCategory};
use crate::patterns::{PatternLibrary, Span};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use triage_core::ScanPolicy;

/// A validated PII match.
///
/// `raw_text` is the matched substring of the scanned text. It is never
/// serialized, so a `PiiMatch` can be logged without leaking the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PiiMatch {
    /// Category the match reports as
    pub category: PiiCategory,
    /// Rule that produced the match
    pub kind: PatternKind,
    /// Byte offsets into the scanned text
    pub span: Span,
    /// The matched substring
    #[serde(skip)]
    pub raw_text: String,
}

/// Outcome of a scan.
///
/// Spans of one kind never overlap, but spans of different kinds may: in
/// `555-123-4567@example.com` both the email and the phone fire. The
/// [`Redactor`](crate::Redactor) resolves such overlaps by precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Whether any validated match was found
    pub is_sensitive: bool,
    /// Matches in precedence order (not text order)
    pub matches: Vec<PiiMatch>,
}

impl ScanResult {
    fn from_matches(matches: Vec<PiiMatch>) -> Self {
        Self {
            is_sensitive: !matches.is_empty(),
            matches,
        }
    }

    /// Distinct categories that fired, in precedence order.
    #[must_use]
    pub fn categories(&self) -> Vec<PiiCategory> {
        let mut categories: Vec<_> = self.matches.iter().map(|m| m.category).collect();
        categories.dedup();
        categories
    }

    /// Highest-precedence category that fired.
    #[must_use]
    pub fn first_category(&self) -> Option<PiiCategory> {
        self.matches.first().map(|m| m.category)
    }

    /// Number of matches in `category`.
    #[must_use]
    pub fn count(&self, category: PiiCategory) -> usize {
        self.matches.iter().filter(|m| m.category == category).count()
    }
}

/// Detects PII in text using an injected [`PatternLibrary`].
///
/// The scanner holds no mutable state and can be shared across threads.
#[derive(Debug, Clone)]
pub struct PiiScanner {
    library: Arc<PatternLibrary>,
    policy: ScanPolicy,
}

impl Default for PiiScanner {
    fn default() -> Self {
        Self::new(PatternLibrary::shared(), ScanPolicy::CollectAll)
    }
}

impl PiiScanner {
    /// Create a scanner over `library` with the given policy.
    #[must_use]
    pub fn new(library: Arc<PatternLibrary>, policy: ScanPolicy) -> Self {
        Self { library, policy }
    }

    /// The configured policy.
    #[must_use]
    pub fn policy(&self) -> ScanPolicy {
        self.policy
    }

    /// The library this scanner reads.
    #[must_use]
    pub fn library(&self) -> &Arc<PatternLibrary> {
        &self.library
    }

    /// Scan `text` under the configured policy.
    #[must_use]
    pub fn scan(&self, text: &str) -> ScanResult {
        let result = match self.policy {
            ScanPolicy::FirstMatchWins => self.scan_first(text),
            ScanPolicy::CollectAll => self.scan_all(text),
        };

        debug!(
            policy = ?self.policy,
            is_sensitive = result.is_sensitive,
            categories = ?result.categories(),
            "scanned text"
        );
        result
    }

    /// Scan text that may be absent. `None` is never sensitive.
    #[must_use]
    pub fn scan_optional(&self, text: Option<&str>) -> ScanResult {
        text.map(|t| self.scan(t)).unwrap_or_default()
    }

    /// Scan an untyped JSON value. Anything but a string is never sensitive.
    #[must_use]
    pub fn scan_value(&self, value: &Value) -> ScanResult {
        self.scan_optional(value.as_str())
    }

    /// Boolean gate: first-match-wins regardless of the configured policy.
    #[must_use]
    pub fn contains_pii(&self, text: &str) -> bool {
        self.library
            .rules()
            .iter()
            .any(|rule| rule.spans(text).next().is_some())
    }

    fn scan_first(&self, text: &str) -> ScanResult {
        let first = self.library.rules().iter().find_map(|rule| {
            rule.spans(text)
                .next()
                .map(|span| to_match(rule.kind(), span, text))
        });

        ScanResult::from_matches(first.into_iter().collect())
    }

    fn scan_all(&self, text: &str) -> ScanResult {
        let matches = self
            .library
            .rules()
            .iter()
            .flat_map(|rule| {
                rule.spans(text).map(move |span| to_match(rule.kind(), span, text))
            })
            .collect();

        ScanResult::from_matches(matches)
    }
}

fn to_match(kind: PatternKind, span: Span, text: &str) -> PiiMatch {
    PiiMatch {
        category: kind.category(),
        kind,
        span,
        raw_text: text[span.range()].to_string(),
    }
}
