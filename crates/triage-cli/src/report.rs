//! Plain-text rendering of fallback review output.

use std::io::{self, Write};
use triage_governance::review::percentage;
use triage_governance::{FallbackEntry, FallbackSummary};

const RULE_WIDTH: usize = 70;
const PREVIEW_CHARS: usize = 200;

fn rule(out: &mut impl Write, ch: char) -> io::Result<()> {
    writeln!(out, "{}", ch.to_string().repeat(RULE_WIDTH))
}

/// Write the summary statistics block.
pub fn write_summary(out: &mut impl Write, summary: &FallbackSummary) -> io::Result<()> {
    if summary.total == 0 {
        return writeln!(out, "No entries to analyze");
    }

    rule(out, '=')?;
    writeln!(out, "FALLBACK LOG SUMMARY")?;
    rule(out, '=')?;
    writeln!(out, "Total entries: {}", summary.total)?;

    writeln!(out, "\nClassification distribution:")?;
    for (category, count) in &summary.categories {
        writeln!(
            out,
            "  {category:20}: {count:4} ({:5.1}%)",
            percentage(*count, summary.total)
        )?;
    }

    if let Some(stats) = summary.confidence {
        writeln!(out, "\nConfidence scores:")?;
        writeln!(out, "  Average: {:.2}", stats.average)?;
        writeln!(out, "  Range:   {:.2} - {:.2}", stats.min, stats.max)?;
    }

    writeln!(out, "\nPII detection:")?;
    writeln!(
        out,
        "  Tickets with PII: {} ({:.1}%)",
        summary.with_pii,
        summary.pii_percentage()
    )?;

    if let (Some(oldest), Some(newest)) = (summary.oldest, summary.newest) {
        writeln!(out, "\nDate range:")?;
        writeln!(out, "  Oldest: {}", oldest.as_datetime().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "  Newest: {}", newest.as_datetime().format("%Y-%m-%d %H:%M:%S"))?;
    }
    rule(out, '=')
}

/// Write up to `limit` entries.
pub fn write_entries(
    out: &mut impl Write,
    entries: &[FallbackEntry],
    limit: Option<usize>,
) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "No entries to display");
    }

    let shown = limit.map_or(entries.len(), |limit| limit.min(entries.len()));
    rule(out, '=')?;
    writeln!(out, "FALLBACK LOG ENTRIES")?;
    rule(out, '=')?;

    for (index, entry) in entries.iter().take(shown).enumerate() {
        writeln!(out, "\nEntry #{}", index + 1)?;
        rule(out, '-')?;
        writeln!(out, "Timestamp:    {}", entry.timestamp)?;
        writeln!(out, "Category:     {}", entry.result.ticket_type)?;
        writeln!(out, "Confidence:   {}", entry.result.confidence_score)?;
        writeln!(
            out,
            "Contains PII: {}",
            if entry.result.contains_pii { "Yes" } else { "No" }
        )?;
        writeln!(out, "Ticket text:  {}", preview(&entry.ticket))?;
    }

    if shown < entries.len() {
        writeln!(out, "\n... and {} more entries", entries.len() - shown)?;
    }
    rule(out, '=')
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
