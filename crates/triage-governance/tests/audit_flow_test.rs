//! End-to-end governance flow against a JSONL audit log

use serde_json::json;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use triage_core::{AppConfig, LatencyConfig};
use triage_governance::review::{load_fallbacks, write_csv};
use triage_governance::{
    AuditSink, DecisionTrace, FallbackFilter, FallbackSummary, InputSanitizer, JsonlFileSink,
    KeywordClassifier, LatencyStatus, LatencyTracker, OutputValidator, RecordCategory,
    TicketRouter,
};
use triage_pii::Redactor;

const TICKETS: [&str; 5] = [
    "I forgot my password, my SSN is 123-45-6789",
    "Where is invoice 4532015112830366?",
    "The app crashed, email me at jane.doe@example.com",
    "Call me back on (555) 123-4567 please",
    "Nothing works today",
];

fn file_sink(dir: &TempDir) -> Arc<JsonlFileSink> {
    Arc::new(JsonlFileSink::new(dir.path().join("audit").join("audit.jsonl")))
}

#[test]
fn test_router_writes_only_redacted_fallbacks() {
    let dir = TempDir::new().expect("create temp dir");
    let sink = file_sink(&dir);
    let config = AppConfig::default();
    let router = TicketRouter::new(Arc::new(KeywordClassifier::default()), sink.clone())
        .with_config(&config.governance);

    let decisions: Vec<_> = TICKETS
        .iter()
        .map(|ticket| router.route(ticket).expect("route ticket"))
        .collect();

    assert_eq!(decisions[0].ticket_type.as_str(), "access_request");
    assert!(decisions[0].contains_pii);
    assert_eq!(decisions[1].ticket_type.as_str(), "billing_question");
    assert!(decisions[1].contains_pii);
    assert!(!decisions[4].contains_pii);

    let log = fs::read_to_string(sink.path()).expect("read audit log");
    for raw in ["123-45-6789", "4532015112830366", "jane.doe@example.com", "123-4567"] {
        assert!(!log.contains(raw), "raw PII {raw} leaked into the audit log");
    }

    let fallbacks = load_fallbacks(sink.path()).expect("load fallbacks");
    assert_eq!(fallbacks.len(), 3);
    assert_eq!(
        fallbacks[0].ticket,
        "The app crashed, email me at [EMAIL_REDACTED]"
    );
    assert_eq!(fallbacks[1].ticket, "Call me back on [PHONE_REDACTED] please");

    let with_pii = FallbackFilter {
        contains_pii: Some(true),
        ..FallbackFilter::default()
    }
    .apply(fallbacks.clone());
    assert_eq!(with_pii.len(), 2);

    let summary = FallbackSummary::from_entries(&fallbacks);
    assert_eq!(summary.categories, vec![("unknown".to_string(), 3)]);
    assert_eq!(summary.with_pii, 2);

    let mut csv = Vec::new();
    write_csv(&fallbacks, &mut csv).expect("export csv");
    let csv = String::from_utf8(csv).expect("utf-8 csv");
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("unknown,0.42,false,Nothing works today"));
}

#[test]
fn test_controls_share_one_log() {
    let dir = TempDir::new().expect("create temp dir");
    let sink = file_sink(&dir);
    let config = AppConfig::default();

    let sanitizer = InputSanitizer::new(Redactor::default(), sink.clone());
    let sanitized = sanitizer
        .sanitize("Call me at (502) 555-1234 or email ryan@example.com.")
        .expect("sanitize");
    assert_eq!(
        sanitized.sanitized_text,
        "Call me at [PHONE_REDACTED] or email [EMAIL_REDACTED]."
    );

    let tracker = LatencyTracker::new("classify", config.latency.clone(), sink.clone());
    let event = tracker.record(Duration::from_millis(2500), false);
    assert_eq!(event.status, LatencyStatus::Error);

    let validator = OutputValidator::new(&config.validation, sink.clone());
    let report = validator
        .validate(&json!({"ticket_id": "t-1", "type": "routing", "confidence": 0.2, "actions": []}))
        .expect("validate");
    assert!(!report.valid);

    let confidence = triage_core::Confidence::new(0.2).expect("valid confidence");
    DecisionTrace::new("t-1", "fallback", confidence)
        .input_summary("ryan@example.com asked about a refund")
        .control("output_validator")
        .write(&Redactor::default(), sink.as_ref())
        .expect("write trace");

    let records = sink.read_all().expect("read audit log");
    let categories: Vec<_> = records.iter().map(|record| record.category).collect();
    assert_eq!(
        categories,
        vec![
            RecordCategory::Sanitization,
            RecordCategory::Latency,
            RecordCategory::Validation,
            RecordCategory::DecisionTrace,
        ]
    );

    let log = fs::read_to_string(sink.path()).expect("read audit log");
    assert!(!log.contains("ryan@example.com"));
    assert!(!log.contains("555-1234"));
}

#[test]
fn test_custom_sink_receives_records() {
    struct Counting(std::sync::atomic::AtomicUsize);

    impl AuditSink for Counting {
        fn append(
            &self,
            _record: &triage_governance::AuditRecord,
        ) -> triage_governance::Result<()> {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    let sink = Arc::new(Counting(std::sync::atomic::AtomicUsize::new(0)));
    let tracker = LatencyTracker::new("noop", LatencyConfig::default(), sink.clone());
    tracker.track(|| ());
    tracker.track(|| ());

    assert_eq!(sink.0.load(std::sync::atomic::Ordering::SeqCst), 2);
}
