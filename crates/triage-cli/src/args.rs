use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Longest review window accepted by `--days`.
pub const MAX_DAYS: i64 = 36_500;

/// Triage Guard: PII detection, redaction and ticket routing.
#[derive(Parser, Debug)]
#[command(name = "triage", version, about, long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan text for PII and print the matches as JSON
    Scan {
        /// Text to scan (read from stdin when omitted)
        text: Option<String>,
    },

    /// Redact PII from text and print the result as JSON
    Redact {
        /// Text to redact (read from stdin when omitted)
        text: Option<String>,
    },

    /// Classify a ticket, logging fallbacks to the audit log
    Classify {
        /// Ticket text (read from stdin when omitted)
        text: Option<String>,

        /// Audit log to append to (defaults to `<audit dir>/audit.jsonl`)
        #[arg(long, value_name = "PATH")]
        log_path: Option<PathBuf>,
    },

    /// Review low-confidence decisions from the fallback log
    Fallbacks(FallbackArgs),
}

#[derive(Args, Debug, Default)]
pub struct FallbackArgs {
    /// Audit log to read (defaults to `<audit dir>/audit.jsonl`)
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Only entries from the last N days
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(i64).range(0..=MAX_DAYS))]
    pub days: Option<i64>,

    /// Minimum confidence score
    #[arg(long, value_name = "X")]
    pub min_confidence: Option<f64>,

    /// Maximum confidence score
    #[arg(long, value_name = "X")]
    pub max_confidence: Option<f64>,

    /// Only this ticket category
    #[arg(long)]
    pub category: Option<String>,

    /// Only tickets that contained PII
    #[arg(long, conflicts_with = "no_pii")]
    pub contains_pii: bool,

    /// Only tickets without PII
    #[arg(long)]
    pub no_pii: bool,

    /// Show at most N entries
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Export the filtered entries to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Print summary statistics only
    #[arg(long)]
    pub stats_only: bool,
}

impl FallbackArgs {
    /// PII criterion selected by the flags.
    pub fn pii_filter(&self) -> Option<bool> {
        if self.contains_pii {
            Some(true)
        } else if self.no_pii {
            Some(false)
        } else {
            None
        }
    }
}
