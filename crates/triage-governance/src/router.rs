//! Ticket router: classification plus governance.
//!
//! The router is the one place that decides when to log. Classification and
//! detection return values; the router turns low-confidence decisions and
//! classifier failures into audit records, redacting ticket text first.

use crate::classifier::{Classification, Classifier};
use crate::error::Result;
use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use crate::trace::DecisionTrace;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use triage_core::{Confidence, GovernanceConfig, TicketCategory};
use triage_pii::{PatternLibrary, PiiScanner, Redactor, ScanPolicy};
use uuid::Uuid;

/// Default confidence below which decisions go to the fallback log.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// A routed ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Assigned category
    pub ticket_type: TicketCategory,
    /// Confidence rounded to two decimals
    pub confidence_score: Confidence,
    /// Whether the ticket text contains PII
    pub contains_pii: bool,
}

/// Payload of a `fallback` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackPayload {
    /// Redacted ticket text
    pub ticket: String,
    /// The decision that fell back
    pub result: Decision,
}

/// Routes tickets through a [`Classifier`] and records governance events.
pub struct TicketRouter {
    classifier: Arc<dyn Classifier>,
    scanner: PiiScanner,
    redactor: Redactor,
    sink: Arc<dyn AuditSink>,
    threshold: f64,
    trace_decisions: bool,
}

impl TicketRouter {
    /// Create a router over the shared pattern library with default settings.
    #[must_use]
    pub fn new(classifier: Arc<dyn Classifier>, sink: Arc<dyn AuditSink>) -> Self {
        let library = PatternLibrary::shared();
        Self {
            classifier,
            scanner: PiiScanner::new(library.clone(), ScanPolicy::FirstMatchWins),
            redactor: Redactor::new(library),
            sink,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            trace_decisions: false,
        }
    }

    /// Use a specific pattern library for detection and redaction.
    #[must_use]
    pub fn with_library(mut self, library: Arc<PatternLibrary>) -> Self {
        self.scanner = PiiScanner::new(library.clone(), ScanPolicy::FirstMatchWins);
        self.redactor = Redactor::new(library);
        self
    }

    /// Set the fallback confidence threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Write a decision trace for every routed ticket.
    #[must_use]
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.trace_decisions = enabled;
        self
    }

    /// Apply the `[governance]` config section.
    #[must_use]
    pub fn with_config(self, config: &GovernanceConfig) -> Self {
        self.with_threshold(config.confidence_threshold)
            .with_tracing(config.trace_decisions)
    }

    /// The fallback confidence threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify `text`, flag PII and record governance events.
    ///
    /// # Errors
    /// Returns the classifier's error after recording it, or a sink error.
    pub fn route(&self, text: &str) -> Result<Decision> {
        let classification = match self.classifier.classify(text) {
            Ok(classification) => classification,
            Err(err) => {
                warn!(error = %err, "classification failed");
                self.record_classification_error(text, &err.to_string())?;
                return Err(err.into());
            }
        };

        let fallback = self.is_fallback(&classification);
        let decision = Decision {
            ticket_type: classification.category.clone(),
            confidence_score: classification.confidence.rounded(),
            contains_pii: self.scanner.contains_pii(text),
        };

        info!(
            ticket_type = %decision.ticket_type,
            confidence = %decision.confidence_score,
            contains_pii = decision.contains_pii,
            fallback,
            "routed ticket"
        );

        if fallback {
            self.record_fallback(text, &decision)?;
        }
        if self.trace_decisions {
            self.record_trace(text, &decision, fallback)?;
        }

        Ok(decision)
    }

    fn is_fallback(&self, classification: &Classification) -> bool {
        classification.confidence.is_below(self.threshold) || classification.category.is_unknown()
    }

    fn record_fallback(&self, text: &str, decision: &Decision) -> Result<()> {
        let payload = FallbackPayload {
            ticket: self.redactor.redact(text).sanitized_text,
            result: decision.clone(),
        };
        let record = AuditRecord::from_serializable(RecordCategory::Fallback, &payload)?;
        self.sink.append(&record)?;

        warn!(
            id = %record.id,
            ticket_type = %decision.ticket_type,
            confidence = %decision.confidence_score,
            "decision sent to fallback review"
        );
        Ok(())
    }

    fn record_classification_error(&self, text: &str, error: &str) -> Result<()> {
        let payload = json!({
            "ticket": self.redactor.redact(text).sanitized_text,
            "error": self.redactor.redact(error).sanitized_text,
        });
        let record = AuditRecord::from_serializable(RecordCategory::ClassificationError, &payload)?;
        self.sink.append(&record)
    }

    fn record_trace(&self, text: &str, decision: &Decision, fallback: bool) -> Result<()> {
        let mut trace = DecisionTrace::new(
            Uuid::new_v4().to_string(),
            decision.ticket_type.as_str(),
            decision.confidence_score,
        )
        .input_summary(text)
        .rationale(format!(
            "confidence {} against threshold {:.2}",
            decision.confidence_score, self.threshold
        ))
        .control("pii_filter")
        .control("confidence_threshold")
        .extra("contains_pii", json!(decision.contains_pii));

        if fallback {
            trace = trace.control("fallback_log");
        }
        trace.write(&self.redactor, self.sink.as_ref())?;
        Ok(())
    }
}
