//! Output validation for classifier payloads.

use crate::error::Result;
use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use triage_core::ValidationConfig;

#[derive(Debug, Clone, Copy)]
enum FieldType {
    String,
    Float,
    List,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Float => value.is_f64(),
            Self::List => value.is_array(),
        }
    }
}

const REQUIRED_FIELDS: [(&str, FieldType); 4] = [
    ("ticket_id", FieldType::String),
    ("type", FieldType::String),
    ("confidence", FieldType::Float),
    ("actions", FieldType::List),
];

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Required field absent
    Missing(String),
    /// Required field has the wrong JSON type
    TypeError(String),
    /// Confidence outside `[0.0, 1.0]`
    ConfidenceOutOfBounds,
    /// Confidence under the configured minimum
    ConfidenceBelowThreshold,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing:{field}"),
            Self::TypeError(field) => write!(f, "type_error:{field}"),
            Self::ConfidenceOutOfBounds => f.write_str("confidence_out_of_bounds"),
            Self::ConfidenceBelowThreshold => f.write_str("confidence_below_threshold"),
        }
    }
}

impl Serialize for Finding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Verdict for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// No findings
    pub valid: bool,
    /// Problems found, in field order
    pub findings: Vec<Finding>,
}

/// Checks classifier output before it leaves the pipeline.
///
/// Expects an object with `ticket_id` (string), `type` (string),
/// `confidence` (float) and `actions` (list). A float confidence must lie in
/// `[0.0, 1.0]` and reach `min_confidence`. Integer confidences are type
/// errors.
pub struct OutputValidator {
    min_confidence: f64,
    sink: Arc<dyn AuditSink>,
}

impl OutputValidator {
    /// Create a validator.
    #[must_use]
    pub fn new(config: &ValidationConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            min_confidence: config.min_confidence,
            sink,
        }
    }

    /// Inspect `payload` without recording anything.
    #[must_use]
    pub fn check(&self, payload: &Value) -> ValidationReport {
        let mut findings = Vec::new();

        for (field, expected) in REQUIRED_FIELDS {
            match payload.get(field) {
                None => findings.push(Finding::Missing(field.to_string())),
                Some(value) if !expected.matches(value) => {
                    findings.push(Finding::TypeError(field.to_string()));
                }
                Some(_) => {}
            }
        }

        let confidence = payload
            .get("confidence")
            .filter(|value| value.is_f64())
            .and_then(Value::as_f64);
        if let Some(confidence) = confidence {
            if !(0.0..=1.0).contains(&confidence) {
                findings.push(Finding::ConfidenceOutOfBounds);
            } else if confidence < self.min_confidence {
                findings.push(Finding::ConfidenceBelowThreshold);
            }
        }

        ValidationReport {
            valid: findings.is_empty(),
            findings,
        }
    }

    /// Inspect `payload` and append a `validation` record.
    pub fn validate(&self, payload: &Value) -> Result<ValidationReport> {
        let report = self.check(payload);

        let details: Vec<String> = if report.valid {
            vec!["ok".to_string()]
        } else {
            report.findings.iter().map(ToString::to_string).collect()
        };
        let record = AuditRecord::from_serializable(
            RecordCategory::Validation,
            &json!({
                "component": "output_validator",
                "metric": "validation",
                "status": if report.valid { "pass" } else { "fail" },
                "details": details,
            }),
        )?;
        self.sink.append(&record)?;

        if report.valid {
            debug!("output passed validation");
        } else {
            warn!(findings = ?details, "output failed validation");
        }
        Ok(report)
    }
}
