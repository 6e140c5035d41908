//! Decision traces for audit review.

use crate::error::Result;
use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use triage_core::Confidence;
use triage_pii::Redactor;

/// Why a decision was made and which controls ran.
///
/// Free-text fields pass through the redactor in [`DecisionTrace::write`],
/// so callers may hand in raw summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    /// Correlation id
    pub ticket_id: String,
    /// Short description of the input
    pub input_summary: String,
    /// Decision label, e.g. a ticket category or `fallback`
    pub classification: String,
    /// Confidence behind the decision
    pub confidence: Confidence,
    /// Brief reason or key signals
    pub rationale: Option<String>,
    /// Governance controls enforced
    pub controls_applied: Vec<String>,
    /// Additional context
    pub extra: Map<String, Value>,
}

impl DecisionTrace {
    /// Start a trace.
    #[must_use]
    pub fn new(
        ticket_id: impl Into<String>,
        classification: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            input_summary: String::new(),
            classification: classification.into(),
            confidence,
            rationale: None,
            controls_applied: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Set the input summary.
    #[must_use]
    pub fn input_summary(mut self, summary: impl Into<String>) -> Self {
        self.input_summary = summary.into();
        self
    }

    /// Set the rationale.
    #[must_use]
    pub fn rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = Some(rationale.into());
        self
    }

    /// Record an applied control.
    #[must_use]
    pub fn control(mut self, control: impl Into<String>) -> Self {
        self.controls_applied.push(control.into());
        self
    }

    /// Attach extra context.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Redact free text and append the trace to `sink`.
    pub fn write(mut self, redactor: &Redactor, sink: &dyn AuditSink) -> Result<AuditRecord> {
        self.input_summary = redactor.redact(&self.input_summary).sanitized_text;
        self.rationale = self
            .rationale
            .map(|rationale| redactor.redact(&rationale).sanitized_text);

        let record = AuditRecord::from_serializable(RecordCategory::DecisionTrace, &self)?;
        sink.append(&record)?;

        debug!(
            ticket_id = %self.ticket_id,
            classification = %self.classification,
            controls = self.controls_applied.len(),
            "wrote decision trace"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use serde_json::json;

    #[test]
    fn test_trace_redacts_summary() {
        let sink = MemorySink::new();
        let confidence = Confidence::new(0.83).expect("valid confidence");

        let record = DecisionTrace::new("abc-123", "routing", confidence)
            .input_summary("User ryan@example.com asked for account help")
            .rationale("High intent match; no risk flags.")
            .control("pii_filter")
            .control("output_validator")
            .extra("channel", json!("email"))
            .write(&Redactor::default(), &sink)
            .expect("write trace");

        assert_eq!(record.category, RecordCategory::DecisionTrace);
        assert_eq!(
            record.field("input_summary"),
            Some(&json!("User [EMAIL_REDACTED] asked for account help"))
        );
        assert_eq!(
            record.field("controls_applied"),
            Some(&json!(["pii_filter", "output_validator"]))
        );
        assert_eq!(record.field("extra"), Some(&json!({"channel": "email"})));
        assert_eq!(record.field("confidence"), Some(&json!(0.83)));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_trace_defaults() {
        let sink = MemorySink::new();
        let record = DecisionTrace::new("t-1", "fallback", Confidence::new(0.1).expect("valid"))
            .write(&Redactor::default(), &sink)
            .expect("write trace");

        assert_eq!(record.field("rationale"), Some(&Value::Null));
        assert_eq!(record.field("controls_applied"), Some(&json!([])));
        assert_eq!(record.field("extra"), Some(&json!({})));
    }
}
