//! Triage Governance - audit trail and routing around the PII detection core
//!
//! The detection core in `triage-pii` only returns values. This crate decides
//! what gets written down and where:
//!
//! - **Records and sinks**: append-only [`AuditRecord`]s written through the
//!   [`AuditSink`] trait, to a JSONL file or to memory
//! - **Routing**: [`TicketRouter`] classifies tickets through a pluggable
//!   [`Classifier`], flags PII and logs low-confidence decisions for review
//! - **Middleware**: [`LatencyTracker`] and [`PipelineMonitor`] wrap calls and
//!   stages with timing and outcome records
//! - **Controls**: [`OutputValidator`], [`DecisionTrace`] and
//!   [`InputSanitizer`]
//! - **Review**: [`review`] loads, filters and summarizes fallback decisions
//!
//! Ticket text reaching a sink always goes through the redactor first.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use triage_governance::{KeywordClassifier, MemorySink, RecordCategory, TicketRouter};
//!
//! let sink = Arc::new(MemorySink::new());
//! let router = TicketRouter::new(Arc::new(KeywordClassifier::default()), sink.clone());
//!
//! let decision = router.route("Printer broke, call 555-123-4567")?;
//! assert!(decision.ticket_type.is_unknown());
//! assert!(decision.contains_pii);
//!
//! let fallbacks = sink.records_of(RecordCategory::Fallback);
//! assert_eq!(fallbacks.len(), 1);
//! # Ok::<(), triage_governance::GovernanceError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

/// Classifier trait and keyword rules.
pub mod classifier;
/// Error types for governance operations.
pub mod error;
/// Latency middleware.
pub mod latency;
/// Pipeline stage monitor.
pub mod monitor;
/// Audit record types.
pub mod record;
pub mod review;
/// Ticket router.
pub mod router;
/// Input sanitizer.
pub mod sanitizer;
/// Audit sinks.
pub mod sink;
/// Decision traces.
pub mod trace;
/// Output validator.
pub mod validator;

pub use classifier::{Classification, Classifier, ClassifierError, KeywordClassifier, KeywordRule};
pub use error::{GovernanceError, Result};
pub use latency::{LatencyEvent, LatencyStatus, LatencyTracker};
pub use monitor::{PipelineMonitor, PipelineSummary, StageResult, StageStatus};
pub use record::{AuditRecord, RecordCategory};
pub use review::{FallbackEntry, FallbackFilter, FallbackSummary};
pub use router::{Decision, FallbackPayload, TicketRouter, DEFAULT_CONFIDENCE_THRESHOLD};
pub use sanitizer::InputSanitizer;
pub use sink::{AuditSink, JsonlFileSink, MemorySink};
pub use trace::DecisionTrace;
pub use validator::{Finding, OutputValidator, ValidationReport};
