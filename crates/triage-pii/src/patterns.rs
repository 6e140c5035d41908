//! Pattern library: the compiled, versioned set of PII detection rules.
//!
//! A [`PatternLibrary`] is built once and shared read-only between scanners
//! and redactors. Rules are always held in precedence order
//! (see [`PatternKind::PRECEDENCE`]).

use crate::category::PatternKind;
use crate::error::{PiiError, Result};
use crate::luhn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use triage_core::CardLengthPolicy;

// Digit classes are ASCII only, matching what the Luhn check counts.
const SSN_PATTERN: &str = r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b";
const CARD_RAW_PATTERN: &str = r"\b[0-9]{13,16}\b";
const CARD_RAW_16_PATTERN: &str = r"\b[0-9]{16}\b";
const CARD_FORMATTED_PATTERN: &str = r"\b(?:[0-9]{4}[- ]){3}[0-9]{4}\b";
const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

/// North American numbers with an optional `+1` prefix and optional area
/// code. The separator between the 3- and 4-digit groups is required, so a
/// bare ten-digit run such as `5551234567` is not a phone number here; it is
/// indistinguishable from an order or account id.
const PHONE_PATTERN: &str =
    r"(?:\+1[-.\s]?)?(?:(?:\([0-9]{3}\)|\b[0-9]{3})[-.\s]?)?\b[0-9]{3}[-.\s][0-9]{4}\b";

/// Characters that may not directly follow a formatted card number.
const CARD_FORMATTED_FORBIDDEN_TRAILING: &str = "0123456789-";

static SHARED: Lazy<Arc<PatternLibrary>> = Lazy::new(|| {
    Arc::new(PatternLibrary::standard().expect("built-in PII patterns are valid"))
});

/// Byte range of a match within the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a span.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether two spans share at least one byte.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// As a `Range` for slicing.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A single compiled detection rule.
#[derive(Clone)]
pub struct PatternRule {
    kind: PatternKind,
    regex: Regex,
    requires_checksum: bool,
    forbidden_trailing: Option<String>,
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("kind", &self.kind)
            .field("regex", &self.regex.as_str())
            .field("requires_checksum", &self.requires_checksum)
            .field("forbidden_trailing", &self.forbidden_trailing)
            .finish()
    }
}

impl PatternRule {
    /// Compile a rule.
    ///
    /// # Errors
    /// Returns `PatternCompile` if the pattern is not a valid regex and
    /// `EmptyMatch` if it can match the empty string.
    pub fn new(kind: PatternKind, pattern: &str, requires_checksum: bool) -> Result<Self> {
        let regex =
            Regex::new(pattern).map_err(|source| PiiError::PatternCompile { kind, source })?;

        if regex.is_match("") {
            return Err(PiiError::EmptyMatch(kind));
        }

        Ok(Self {
            kind,
            regex,
            requires_checksum,
            forbidden_trailing: None,
        })
    }

    /// Reject matches immediately followed by any of `chars`.
    ///
    /// A rejected candidate is retried from the next character, which gives
    /// the same results as a negative lookahead.
    #[must_use]
    pub fn not_followed_by(mut self, chars: &str) -> Self {
        self.forbidden_trailing = Some(chars.to_string());
        self
    }

    /// The rule's kind.
    #[must_use]
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Whether matches must pass the Luhn checksum to count.
    #[must_use]
    pub fn requires_checksum(&self) -> bool {
        self.requires_checksum
    }

    /// The source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Iterate over the non-overlapping spans this rule matches in `text`,
    /// left to right, keeping only those that pass the checksum gate.
    ///
    /// A candidate that fails the gate is retried from its next character,
    /// so a valid card starting inside a rejected digit run is still found.
    #[must_use]
    pub fn spans<'r, 't>(&'r self, text: &'t str) -> Spans<'r, 't> {
        Spans {
            rule: self,
            text,
            pos: 0,
            checked: true,
        }
    }

    /// Like [`spans`](Self::spans) but without the checksum gate.
    #[must_use]
    pub fn candidates<'r, 't>(&'r self, text: &'t str) -> Spans<'r, 't> {
        Spans {
            checked: false,
            ..self.spans(text)
        }
    }

    fn accepts_trailing(&self, text: &str, end: usize) -> bool {
        match (&self.forbidden_trailing, text[end..].chars().next()) {
            (Some(forbidden), Some(next)) => !forbidden.contains(next),
            _ => true,
        }
    }

    fn passes_checksum(&self, candidate: &str) -> bool {
        !self.requires_checksum || luhn::is_valid_card(candidate)
    }
}

/// Iterator over the spans matched by a [`PatternRule`].
#[derive(Debug)]
pub struct Spans<'r, 't> {
    rule: &'r PatternRule,
    text: &'t str,
    pos: usize,
    checked: bool,
}

impl Iterator for Spans<'_, '_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        while self.pos <= self.text.len() {
            let found = self.rule.regex.find_at(self.text, self.pos)?;
            let span = Span::new(found.start(), found.end());

            if self.rule.accepts_trailing(self.text, span.end)
                && (!self.checked || self.rule.passes_checksum(found.as_str()))
            {
                self.pos = span.end.max(next_char_boundary(self.text, span.start));
                return Some(span);
            }

            self.pos = next_char_boundary(self.text, span.start);
        }
        None
    }
}

fn next_char_boundary(text: &str, idx: usize) -> usize {
    idx + text[idx..].chars().next().map_or(1, char::len_utf8)
}

/// The ordered, immutable set of detection rules.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    rules: Vec<PatternRule>,
}

impl PatternLibrary {
    /// Version of the built-in rule set.
    pub const VERSION: &'static str = "2.1";

    /// Build the built-in rule set with 13-16 digit bare card numbers.
    ///
    /// # Errors
    /// Fails if any built-in pattern fails to compile.
    pub fn standard() -> Result<Self> {
        Self::with_card_policy(CardLengthPolicy::ThirteenToSixteen)
    }

    /// Build the built-in rule set with the given bare card-number policy.
    pub fn with_card_policy(card_length: CardLengthPolicy) -> Result<Self> {
        let card_raw = match card_length {
            CardLengthPolicy::ThirteenToSixteen => CARD_RAW_PATTERN,
            CardLengthPolicy::SixteenOnly => CARD_RAW_16_PATTERN,
        };

        let library = Self::from_rules(vec![
            PatternRule::new(PatternKind::Ssn, SSN_PATTERN, false)?,
            PatternRule::new(PatternKind::CardRaw, card_raw, true)?,
            PatternRule::new(PatternKind::CardFormatted, CARD_FORMATTED_PATTERN, true)?
                .not_followed_by(CARD_FORMATTED_FORBIDDEN_TRAILING),
            PatternRule::new(PatternKind::Email, EMAIL_PATTERN, false)?,
            PatternRule::new(PatternKind::Phone, PHONE_PATTERN, false)?,
        ])?;

        tracing::debug!(
            version = Self::VERSION,
            ?card_length,
            rules = library.rules.len(),
            "compiled PII pattern library"
        );
        Ok(library)
    }

    /// Build a library from custom rules.
    ///
    /// Rules are reordered into precedence order. Kinds may be omitted; an
    /// omitted kind never matches.
    ///
    /// # Errors
    /// Returns `DuplicateRule` if two rules share a kind.
    pub fn from_rules(mut rules: Vec<PatternRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.kind) {
                return Err(PiiError::DuplicateRule(rule.kind));
            }
        }

        rules.sort_by_key(PatternRule::kind);
        Ok(Self { rules })
    }

    /// Process-wide built-in library, compiled on first use.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Rules in precedence order.
    #[must_use]
    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Look up the rule for `kind`.
    #[must_use]
    pub fn rule(&self, kind: PatternKind) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.kind == kind)
    }

    /// Every span matched by the `kind` rule, before any checksum gate.
    #[must_use]
    pub fn match_all(&self, text: &str, kind: PatternKind) -> Vec<Span> {
        self.rule(kind)
            .map(|rule| rule.candidates(text).collect())
            .unwrap_or_default()
    }
}
