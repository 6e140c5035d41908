//! Append-only audit records.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use triage_core::Timestamp;
use uuid::Uuid;

/// Kind of event an [`AuditRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    /// A low-confidence or unknown decision queued for human review
    Fallback,
    /// The classifier failed
    ClassificationError,
    /// Rationale and controls behind a decision
    DecisionTrace,
    /// Timing of a tracked call
    Latency,
    /// Output validation verdict
    Validation,
    /// Input redaction summary
    Sanitization,
    /// Pipeline stage outcome
    Stage,
}

impl RecordCategory {
    /// Snake-case name as written to the log.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::ClassificationError => "classification_error",
            Self::DecisionTrace => "decision_trace",
            Self::Latency => "latency",
            Self::Validation => "validation",
            Self::Sanitization => "sanitization",
            Self::Stage => "stage",
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit log entry.
///
/// Serialized one per line. Payloads never carry raw ticket text; callers
/// redact before building them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique identifier for this record
    pub id: Uuid,

    /// When the event occurred (RFC 3339, UTC)
    pub timestamp: Timestamp,

    /// Kind of event
    pub category: RecordCategory,

    /// Event-specific fields
    pub payload: Map<String, Value>,
}

impl AuditRecord {
    /// Create a record stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(category: RecordCategory, payload: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Timestamp::now(),
            category,
            payload,
        }
    }

    /// Create a record from any serializable payload.
    ///
    /// Structs become the payload map directly; any other value is stored
    /// under `"value"`.
    pub fn from_serializable<T: Serialize>(category: RecordCategory, payload: &T) -> Result<Self> {
        let payload = match serde_json::to_value(payload)? {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Ok(Self::new(category, payload))
    }

    /// Look up a payload field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_serializes_flat() {
        let record = AuditRecord::from_serializable(
            RecordCategory::Fallback,
            &json!({"ticket": "[EMAIL_REDACTED] needs help"}),
        )
        .expect("build record");

        let value = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(value["category"], "fallback");
        assert_eq!(value["payload"]["ticket"], "[EMAIL_REDACTED] needs help");
        assert!(value["timestamp"].as_str().is_some());
        assert!(value["id"].as_str().is_some());
    }

    #[test]
    fn test_scalar_payload_is_wrapped() {
        let record =
            AuditRecord::from_serializable(RecordCategory::Latency, &42).expect("build record");
        assert_eq!(record.field("value"), Some(&json!(42)));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let record = AuditRecord::new(RecordCategory::ClassificationError, Map::new());
        let line = serde_json::to_string(&record).expect("serialize record");
        let parsed: AuditRecord = serde_json::from_str(&line).expect("parse record");
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(RecordCategory::DecisionTrace.to_string(), "decision_trace");
        assert_eq!(
            serde_json::to_value(RecordCategory::ClassificationError).expect("serialize"),
            json!("classification_error")
        );
    }
}
