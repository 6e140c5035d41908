//! Property tests for redaction invariants.

use proptest::prelude::*;
use triage_pii::{PiiCategory, PiiScanner, Redactor};

#[derive(Debug, Clone)]
enum Fragment {
    Word(String),
    Ssn(String),
    Email(String),
    Phone(String),
    Card(&'static str),
}

impl Fragment {
    fn text(&self) -> &str {
        match self {
            Self::Word(s) | Self::Ssn(s) | Self::Email(s) | Self::Phone(s) => s,
            Self::Card(s) => s,
        }
    }

    fn category(&self) -> Option<PiiCategory> {
        match self {
            Self::Word(_) => None,
            Self::Ssn(_) => Some(PiiCategory::Ssn),
            Self::Email(_) => Some(PiiCategory::Email),
            Self::Phone(_) => Some(PiiCategory::Phone),
            Self::Card(_) => Some(PiiCategory::Card),
        }
    }
}

const LUHN_VALID_CARDS: [&str; 4] = [
    "4532015112830366",
    "4532-0151-1283-0366",
    "5425 2334 3010 9903",
    "378282246310005",
];

fn fragment_strategy() -> impl Strategy<Value = Fragment> {
    prop_oneof![
        3 => "[a-zA-Z]{1,10}".prop_map(Fragment::Word),
        1 => r"[0-9]{3}-[0-9]{2}-[0-9]{4}".prop_map(Fragment::Ssn),
        1 => r"[a-z][a-z0-9._]{0,7}@[a-z]{1,8}\.(com|org|io)".prop_map(Fragment::Email),
        1 => r"(\([0-9]{3}\) |[0-9]{3}[-.])[0-9]{3}[-.][0-9]{4}".prop_map(Fragment::Phone),
        1 => prop::sample::select(LUHN_VALID_CARDS.to_vec()).prop_map(Fragment::Card),
    ]
}

fn ticket_strategy() -> impl Strategy<Value = Vec<Fragment>> {
    prop::collection::vec(fragment_strategy(), 0..24)
}

// A bare space would let the last group of a phone or SSN pair up with the
// first groups of a following card into another Luhn-valid candidate.
fn join(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .map(Fragment::text)
        .collect::<Vec<_>>()
        .join(", ")
}

proptest! {
    /// Redacting already-redacted text changes nothing
    #[test]
    fn prop_redaction_is_idempotent(text in ".{0,400}") {
        let redactor = Redactor::default();
        let once = redactor.redact(&text);
        let twice = redactor.redact(&once.sanitized_text);

        prop_assert_eq!(&once.sanitized_text, &twice.sanitized_text);
        prop_assert!(!twice.is_redacted());
    }

    /// Redacting ticket-shaped text with embedded PII changes nothing the second time
    #[test]
    fn prop_ticket_redaction_is_idempotent(fragments in ticket_strategy()) {
        let redactor = Redactor::default();
        let once = redactor.redact(&join(&fragments));
        let twice = redactor.redact(&once.sanitized_text);

        prop_assert_eq!(once.sanitized_text, twice.sanitized_text);
    }

    /// No embedded PII value survives redaction, and each one is counted once
    #[test]
    fn prop_redaction_removes_and_counts_pii(fragments in ticket_strategy()) {
        let result = Redactor::default().redact(&join(&fragments));

        for fragment in fragments.iter().filter(|f| f.category().is_some()) {
            prop_assert!(
                !result.sanitized_text.contains(fragment.text()),
                "{:?} survived in {:?}", fragment, result.sanitized_text
            );
        }

        for category in PiiCategory::ALL {
            let expected = fragments.iter().filter(|f| f.category() == Some(category)).count();
            prop_assert_eq!(result.count(category), expected, "category {}", category);
        }
    }

    /// Match spans always slice back to the reported text
    #[test]
    fn prop_match_spans_slice_raw_text(text in ".{0,400}") {
        let result = PiiScanner::default().scan(&text);

        prop_assert_eq!(result.is_sensitive, !result.matches.is_empty());
        for m in &result.matches {
            prop_assert_eq!(&text[m.span.range()], m.raw_text.as_str());
        }
    }
}
