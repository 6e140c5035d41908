//! Pipeline stage monitor.

use crate::record::{AuditRecord, RecordCategory};
use crate::sink::AuditSink;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use triage_core::Timestamp;

/// Outcome of one stage run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// First run succeeded
    Success,
    /// First run failed
    Failure,
    /// A retry succeeded
    RetrySuccess,
    /// A retry failed
    RetryFailure,
}

impl StageStatus {
    /// Snake-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::RetrySuccess => "retry_success",
            Self::RetryFailure => "retry_failure",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged stage outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// When the stage finished
    pub timestamp: Timestamp,
    /// Stage name
    pub stage: String,
    /// Outcome
    pub status: StageStatus,
    /// Error message, empty on success
    pub details: String,
}

/// Counts of stage outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Stages that succeeded first time
    pub succeeded: usize,
    /// Stages that failed first time
    pub failed: usize,
    /// Successful retries
    pub retried_ok: usize,
    /// Failed retries
    pub retried_failed: usize,
    /// Stages whose latest outcome is a failure
    pub outstanding: Vec<String>,
}

/// Runs named stages, swallowing their errors and logging each outcome.
#[derive(Default)]
pub struct PipelineMonitor {
    results: Vec<StageResult>,
    sink: Option<Arc<dyn AuditSink>>,
}

impl PipelineMonitor {
    /// Create a monitor that only logs through `tracing`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also append a `stage` record per outcome to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run `f` as stage `name`. A failure is logged and yields `None`.
    pub fn run_stage<T, E: fmt::Display>(
        &mut self,
        name: &str,
        f: impl FnOnce() -> Result<T, E>,
    ) -> Option<T> {
        match f() {
            Ok(value) => {
                self.log(name, StageStatus::Success, String::new());
                Some(value)
            }
            Err(e) => {
                self.log(name, StageStatus::Failure, e.to_string());
                None
            }
        }
    }

    /// Re-run each stage that failed, once, using the closures in `stages`.
    ///
    /// Stages without an entry are left alone. Returns the number of
    /// successful retries.
    pub fn retry_failed<E, F>(&mut self, mut stages: HashMap<&str, F>) -> usize
    where
        E: fmt::Display,
        F: FnMut() -> Result<(), E>,
    {
        let mut failed: Vec<String> = Vec::new();
        for result in &self.results {
            if result.status == StageStatus::Failure && !failed.contains(&result.stage) {
                failed.push(result.stage.clone());
            }
        }

        let mut recovered = 0;
        for stage in failed {
            let Some(retry) = stages.get_mut(stage.as_str()) else {
                continue;
            };
            info!(stage = %stage, "retrying stage");
            match retry() {
                Ok(()) => {
                    self.log(&stage, StageStatus::RetrySuccess, String::new());
                    recovered += 1;
                }
                Err(e) => self.log(&stage, StageStatus::RetryFailure, e.to_string()),
            }
        }
        recovered
    }

    /// Every outcome in order.
    #[must_use]
    pub fn results(&self) -> &[StageResult] {
        &self.results
    }

    /// Aggregate the outcomes so far.
    #[must_use]
    pub fn summary(&self) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        let mut latest: Vec<(&str, StageStatus)> = Vec::new();

        for result in &self.results {
            match result.status {
                StageStatus::Success => summary.succeeded += 1,
                StageStatus::Failure => summary.failed += 1,
                StageStatus::RetrySuccess => summary.retried_ok += 1,
                StageStatus::RetryFailure => summary.retried_failed += 1,
            }
            match latest.iter_mut().find(|(stage, _)| *stage == result.stage) {
                Some(entry) => entry.1 = result.status,
                None => latest.push((result.stage.as_str(), result.status)),
            }
        }

        summary.outstanding = latest
            .into_iter()
            .filter(|(_, status)| {
                matches!(status, StageStatus::Failure | StageStatus::RetryFailure)
            })
            .map(|(stage, _)| stage.to_string())
            .collect();
        summary
    }

    fn log(&mut self, stage: &str, status: StageStatus, details: String) {
        match status {
            StageStatus::Success | StageStatus::RetrySuccess => {
                info!(stage, status = %status, "stage finished");
            }
            StageStatus::Failure | StageStatus::RetryFailure => {
                warn!(stage, status = %status, details = %details, "stage failed");
            }
        }

        let result = StageResult {
            timestamp: Timestamp::now(),
            stage: stage.to_string(),
            status,
            details,
        };

        if let Some(sink) = &self.sink {
            let appended = AuditRecord::from_serializable(RecordCategory::Stage, &result)
                .and_then(|record| sink.append(&record));
            if let Err(e) = appended {
                warn!(stage, error = %e, "failed to record stage result");
            }
        }

        self.results.push(result);
    }
}

impl fmt::Display for PipelineMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Pipeline Summary ---")?;
        for result in &self.results {
            writeln!(f, "{} | {} | {}", result.timestamp, result.stage, result.status)?;
        }
        write!(f, "--- End Summary ---")
    }
}
