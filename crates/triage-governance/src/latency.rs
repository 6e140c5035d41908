//! Latency middleware.

use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use triage_core::LatencyConfig;

/// How a tracked call measured up against the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyStatus {
    /// Under `warn_ms`
    Ok,
    /// At or over `warn_ms`
    Warn,
    /// At or over `error_ms`
    Error,
    /// The call returned an error
    Failed,
}

impl LatencyStatus {
    /// Classify a duration.
    #[must_use]
    pub fn classify(elapsed_ms: u64, thresholds: &LatencyConfig) -> Self {
        if elapsed_ms >= thresholds.error_ms {
            Self::Error
        } else if elapsed_ms >= thresholds.warn_ms {
            Self::Warn
        } else {
            Self::Ok
        }
    }
}

/// Payload of a `latency` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyEvent {
    /// Tracked component
    pub component: String,
    /// Always `latency_ms`
    pub metric: String,
    /// Elapsed milliseconds
    pub value: u64,
    /// Verdict
    pub status: LatencyStatus,
    /// Thresholds in force
    pub thresholds: LatencyConfig,
}

/// Times calls and records the result.
///
/// Sink failures are logged and never surface to the tracked call.
pub struct LatencyTracker {
    name: String,
    thresholds: LatencyConfig,
    sink: Arc<dyn AuditSink>,
}

impl LatencyTracker {
    /// Create a tracker for the component `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        thresholds: LatencyConfig,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            name: name.into(),
            thresholds,
            sink,
        }
    }

    /// Time `f`.
    pub fn track<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        self.record(start.elapsed(), false);
        value
    }

    /// Time a fallible `f`. An `Err` is recorded as [`LatencyStatus::Failed`].
    pub fn track_result<T, E>(&self, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let start = Instant::now();
        let result = f();
        self.record(start.elapsed(), result.is_err());
        result
    }

    /// Record an already measured duration.
    pub fn record(&self, elapsed: Duration, failed: bool) -> LatencyEvent {
        let value = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let status = if failed {
            LatencyStatus::Failed
        } else {
            LatencyStatus::classify(value, &self.thresholds)
        };

        match status {
            LatencyStatus::Ok => debug!(component = %self.name, elapsed_ms = value, "latency ok"),
            LatencyStatus::Warn => warn!(
                component = %self.name,
                elapsed_ms = value,
                warn_ms = self.thresholds.warn_ms,
                "latency above warning threshold"
            ),
            LatencyStatus::Error => error!(
                component = %self.name,
                elapsed_ms = value,
                error_ms = self.thresholds.error_ms,
                "latency above error threshold"
            ),
            LatencyStatus::Failed => {
                warn!(component = %self.name, elapsed_ms = value, "tracked call failed");
            }
        }

        let event = LatencyEvent {
            component: self.name.clone(),
            metric: "latency_ms".to_string(),
            value,
            status,
            thresholds: self.thresholds.clone(),
        };

        let appended = AuditRecord::from_serializable(RecordCategory::Latency, &event)
            .and_then(|record| self.sink.append(&record));
        if let Err(e) = appended {
            warn!(component = %self.name, error = %e, "failed to record latency");
        }

        event
    }
}
