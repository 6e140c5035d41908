//! Input sanitization with an audit trail.

use crate::error::Result;
use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use triage_pii::{RedactionResult, Redactor};

/// Redacts incoming text and records what was found.
///
/// The `sanitization` record carries flags and counts only, never text.
pub struct InputSanitizer {
    redactor: Redactor,
    sink: Arc<dyn AuditSink>,
}

impl InputSanitizer {
    /// Create a sanitizer.
    #[must_use]
    pub fn new(redactor: Redactor, sink: Arc<dyn AuditSink>) -> Self {
        Self { redactor, sink }
    }

    /// Redact `text` and append a `sanitization` record.
    pub fn sanitize(&self, text: &str) -> Result<RedactionResult> {
        let result = self.redactor.redact(text);

        let record = AuditRecord::from_serializable(
            RecordCategory::Sanitization,
            &json!({
                "component": "input_sanitizer",
                "metric": "sanitization",
                "status": "ok",
                "flags": result.flag_labels(),
                "redactions": result.counts,
            }),
        )?;
        self.sink.append(&record)?;

        debug!(redactions = result.total(), "sanitized input");
        Ok(result)
    }
}
