//! Integration tests for the detection core
//!
//! Exercises the scanner and redactor through the public API with the
//! fixtures the ticket pipeline has historically been validated against.

use serde_json::json;
use std::sync::Arc;
use std::thread;
use triage_pii::{
    PatternKind, PatternLibrary, PiiCategory, PiiScanner, Redactor, ScanPolicy,
};

fn scanners() -> [PiiScanner; 2] {
    let library = PatternLibrary::shared();
    [
        PiiScanner::new(library.clone(), ScanPolicy::CollectAll),
        PiiScanner::new(library, ScanPolicy::FirstMatchWins),
    ]
}

#[test]
fn test_positive_fixtures() {
    let cases = [
        ("My SSN is 123-45-6789.", PiiCategory::Ssn),
        ("Please use card 4532015112830366 for the payment.", PiiCategory::Card),
        ("My card is 4532-0151-1283-0366.", PiiCategory::Card),
        ("Use 5425 2334 3010 9903.", PiiCategory::Card),
        ("Contact me at test.user+alias@example.com.", PiiCategory::Email),
        ("My email is simple@domain.org.", PiiCategory::Email),
        ("Call me at (555) 123-4567.", PiiCategory::Phone),
        ("My number is 555.123.4567.", PiiCategory::Phone),
        ("Reach me at 555 123 4567.", PiiCategory::Phone),
    ];

    for scanner in scanners() {
        for (text, category) in cases {
            let result = scanner.scan(text);
            assert!(result.is_sensitive, "{:?} missed: {text}", scanner.policy());
            assert_eq!(result.first_category(), Some(category), "text: {text}");
            assert!(scanner.contains_pii(text));
        }
    }
}

#[test]
fn test_negative_fixtures() {
    let cases = [
        "This is a generic support request.",
        "The order ID is 123-456-789.",
        "Not an email: test@localhost",
        "The price is $123.45",
        "",
    ];

    for scanner in scanners() {
        for text in cases {
            assert!(!scanner.scan(text).is_sensitive, "false positive: {text:?}");
            assert!(!scanner.contains_pii(text));
        }
    }
}

#[test]
fn test_non_text_input_is_not_sensitive() {
    for scanner in scanners() {
        assert!(!scanner.scan_optional(None).is_sensitive);
        assert!(!scanner.scan_value(&json!(null)).is_sensitive);
        assert!(!scanner.scan_value(&json!(123_456)).is_sensitive);
        assert!(!scanner.scan_value(&json!(["123-45-6789"])).is_sensitive);
    }
}

#[test]
fn test_luhn_gate_on_digit_runs() {
    let scanner = PiiScanner::new(PatternLibrary::shared(), ScanPolicy::CollectAll);

    let valid = scanner.scan("4532015112830366");
    assert_eq!(valid.count(PiiCategory::Card), 1);

    let invalid = scanner.scan("1234567812345678");
    assert_eq!(invalid.count(PiiCategory::Card), 0);
    assert!(!PatternLibrary::shared()
        .match_all("1234567812345678", PatternKind::CardRaw)
        .is_empty());
}

#[test]
fn test_sixteen_only_policy() {
    let library = Arc::new(
        PatternLibrary::with_card_policy(triage_pii::CardLengthPolicy::SixteenOnly)
            .expect("build library"),
    );
    let scanner = PiiScanner::new(library, ScanPolicy::CollectAll);

    assert!(!scanner.scan("Amex 378282246310005").is_sensitive);
    assert!(scanner.scan("Visa 4532015112830366").is_sensitive);
}

#[test]
fn test_zip_is_not_pii_but_ssn_is() {
    let scanner = PiiScanner::default();
    let result = scanner.scan("My ZIP is 40202 and my SSN is 123-45-6789.");
    assert_eq!(result.categories(), vec![PiiCategory::Ssn]);
}

#[test]
fn test_redaction_fixture() {
    let result = Redactor::default().redact("Email a@b.com and call 555-123-4567");
    let json = serde_json::to_value(&result).expect("serialize redaction");

    assert_eq!(json["counts"], json!({"email": 1, "phone": 1}));
    assert!(!result.sanitized_text.contains("a@b.com"));
    assert!(!result.sanitized_text.contains("555-123-4567"));
}

#[test]
fn test_concurrent_scans_match_sequential() {
    let scanner = Arc::new(PiiScanner::default());
    let redactor = Arc::new(Redactor::default());

    let inputs: Vec<String> = (0..64)
        .map(|i| match i % 4 {
            0 => format!("ticket {i}: SSN 123-45-{:04}", 1000 + i),
            1 => format!("ticket {i}: mail user{i}@example.com"),
            2 => format!("ticket {i}: call 555-123-{:04}", 2000 + i),
            _ => format!("ticket {i}: nothing to see"),
        })
        .collect();

    let expected: Vec<_> = inputs
        .iter()
        .map(|text| (scanner.scan(text), redactor.redact(text)))
        .collect();

    let handles: Vec<_> = inputs
        .iter()
        .cloned()
        .map(|text| {
            let scanner = Arc::clone(&scanner);
            let redactor = Arc::clone(&redactor);
            thread::spawn(move || (scanner.scan(&text), redactor.redact(&text)))
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        let actual = handle.join().expect("scan thread panicked");
        assert_eq!(actual, expected);
    }
}
