//! Human review of the fallback log.
//!
//! Loads `fallback` records, filters them and computes the statistics the
//! review tooling shows. Ticket text in these records is already redacted.

use crate::error::{GovernanceError, Result};
use crate::record::{AuditRecord, RecordCategory};
use crate::router::{Decision, FallbackPayload};
use crate::sink::read_records;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::debug;
use triage_core::Timestamp;

/// CSV header written by [`write_csv`].
pub const CSV_HEADER: [&str; 5] = [
    "timestamp",
    "ticket_type",
    "confidence_score",
    "contains_pii",
    "ticket_text",
];

/// One fallback decision awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    /// When the decision was logged
    pub timestamp: Timestamp,
    /// Redacted ticket text
    pub ticket: String,
    /// The decision
    pub result: Decision,
}

impl FallbackEntry {
    /// Extract an entry from a `fallback` record. Other records yield `None`.
    #[must_use]
    pub fn from_record(record: &AuditRecord) -> Option<Self> {
        if record.category != RecordCategory::Fallback {
            return None;
        }
        let payload: FallbackPayload =
            serde_json::from_value(Value::Object(record.payload.clone())).ok()?;
        Some(Self {
            timestamp: record.timestamp,
            ticket: payload.ticket,
            result: payload.result,
        })
    }
}

/// Load every fallback entry from an audit log.
pub fn load_fallbacks(path: &Path) -> Result<Vec<FallbackEntry>> {
    let records = read_records(path)?;
    let entries: Vec<_> = records.iter().filter_map(FallbackEntry::from_record).collect();
    debug!(
        records = records.len(),
        fallbacks = entries.len(),
        path = %path.display(),
        "loaded fallback entries"
    );
    Ok(entries)
}

/// Criteria an entry must meet. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FallbackFilter {
    /// Only entries logged at or after this instant
    pub since: Option<DateTime<Utc>>,
    /// Inclusive lower confidence bound
    pub min_confidence: Option<f64>,
    /// Inclusive upper confidence bound
    pub max_confidence: Option<f64>,
    /// Only this ticket category
    pub category: Option<String>,
    /// Only entries with (or without) PII
    pub contains_pii: Option<bool>,
}

impl FallbackFilter {
    /// Restrict to the last `days` days before `now`.
    ///
    /// # Errors
    /// Returns `Validation` if `days` is negative or the window reaches past
    /// the representable date range.
    pub fn within_days(mut self, days: i64, now: DateTime<Utc>) -> Result<Self> {
        let since = (days >= 0)
            .then(|| Duration::try_days(days))
            .flatten()
            .and_then(|window| now.checked_sub_signed(window))
            .ok_or_else(|| {
                GovernanceError::Validation(format!("day window out of range: {days}"))
            })?;

        self.since = Some(since);
        Ok(self)
    }

    /// Whether `entry` meets every criterion.
    #[must_use]
    pub fn matches(&self, entry: &FallbackEntry) -> bool {
        let confidence = entry.result.confidence_score.value();

        self.since
            .map_or(true, |since| *entry.timestamp.as_datetime() >= since)
            && self.min_confidence.map_or(true, |min| confidence >= min)
            && self.max_confidence.map_or(true, |max| confidence <= max)
            && self
                .category
                .as_deref()
                .map_or(true, |category| entry.result.ticket_type.as_str() == category)
            && self
                .contains_pii
                .map_or(true, |pii| entry.result.contains_pii == pii)
    }

    /// Keep the entries that match.
    #[must_use]
    pub fn apply(&self, entries: Vec<FallbackEntry>) -> Vec<FallbackEntry> {
        entries.into_iter().filter(|entry| self.matches(entry)).collect()
    }
}

/// Confidence score statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceStats {
    /// Mean
    pub average: f64,
    /// Lowest
    pub min: f64,
    /// Highest
    pub max: f64,
}

/// Aggregate view of a set of fallback entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackSummary {
    /// Number of entries
    pub total: usize,
    /// Entries per category, most frequent first
    pub categories: Vec<(String, usize)>,
    /// Confidence statistics, absent when there are no entries
    pub confidence: Option<ConfidenceStats>,
    /// Entries flagged as containing PII
    pub with_pii: usize,
    /// Earliest entry
    pub oldest: Option<Timestamp>,
    /// Latest entry
    pub newest: Option<Timestamp>,
}

impl FallbackSummary {
    /// Summarize `entries`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_entries(entries: &[FallbackEntry]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            *counts.entry(entry.result.ticket_type.as_str()).or_insert(0) += 1;
        }
        let mut categories: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let scores: Vec<f64> = entries
            .iter()
            .map(|entry| entry.result.confidence_score.value())
            .collect();
        let confidence = (!scores.is_empty()).then(|| ConfidenceStats {
            average: scores.iter().sum::<f64>() / scores.len() as f64,
            min: scores.iter().copied().fold(f64::INFINITY, f64::min),
            max: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        });

        Self {
            total: entries.len(),
            categories,
            confidence,
            with_pii: entries.iter().filter(|entry| entry.result.contains_pii).count(),
            oldest: entries.iter().map(|entry| entry.timestamp).min(),
            newest: entries.iter().map(|entry| entry.timestamp).max(),
        }
    }

    /// Share of entries with PII, in percent.
    #[must_use]
    pub fn pii_percentage(&self) -> f64 {
        percentage(self.with_pii, self.total)
    }
}

/// `part` as a percentage of `total`; zero when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Write `entries` as CSV (RFC 4180 quoting, CRLF line endings).
pub fn write_csv<W: Write>(entries: &[FallbackEntry], mut out: W) -> std::io::Result<()> {
    write_row(&mut out, &CSV_HEADER)?;
    for entry in entries {
        let timestamp = entry.timestamp.to_rfc3339();
        let confidence = entry.result.confidence_score.value().to_string();
        let contains_pii = entry.result.contains_pii.to_string();
        write_row(
            &mut out,
            &[
                timestamp.as_str(),
                entry.result.ticket_type.as_str(),
                confidence.as_str(),
                contains_pii.as_str(),
                entry.ticket.as_str(),
            ],
        )?;
    }
    out.flush()
}

fn write_row<W: Write>(out: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let row: Vec<String> = fields.iter().map(|field| csv_field(field)).collect();
    write!(out, "{}\r\n", row.join(","))
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
