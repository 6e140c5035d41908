use crate::args::FallbackArgs;
use crate::report;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use triage_core::AppConfig;
use triage_governance::review::{load_fallbacks, write_csv};
use triage_governance::{
    FallbackFilter, FallbackSummary, JsonlFileSink, KeywordClassifier, LatencyTracker,
    TicketRouter,
};
use triage_pii::{PatternLibrary, PiiScanner, Redactor};

/// File name of the audit log inside the audit directory.
pub const AUDIT_LOG_FILE: &str = "audit.jsonl";

/// Loaded configuration plus the pattern library it selects.
pub struct AppContext {
    pub config: AppConfig,
    pub library: Arc<PatternLibrary>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self> {
        let library = PatternLibrary::with_card_policy(config.detection.card_length)
            .context("failed to build pattern library")?;
        Ok(Self {
            config,
            library: Arc::new(library),
        })
    }

    fn audit_log(&self, override_path: Option<PathBuf>) -> Result<PathBuf> {
        match override_path {
            Some(path) => Ok(path),
            None => Ok(self
                .config
                .audit_dir()
                .context("failed to resolve audit directory")?
                .join(AUDIT_LOG_FILE)),
        }
    }
}

/// Use `text` if given, otherwise read all of stdin.
pub fn input_text(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn print_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn scan(ctx: &AppContext, text: &str, out: &mut impl Write) -> Result<()> {
    let scanner = PiiScanner::new(ctx.library.clone(), ctx.config.detection.policy);
    print_json(out, &scanner.scan(text))
}

pub fn redact(ctx: &AppContext, text: &str, out: &mut impl Write) -> Result<()> {
    let redactor = Redactor::new(ctx.library.clone());
    print_json(out, &redactor.redact(text))
}

pub fn classify(
    ctx: &AppContext,
    text: &str,
    log_path: Option<PathBuf>,
    out: &mut impl Write,
) -> Result<()> {
    let log_path = ctx.audit_log(log_path)?;
    let sink = Arc::new(JsonlFileSink::new(&log_path));

    let router = TicketRouter::new(Arc::new(KeywordClassifier::default()), sink.clone())
        .with_library(ctx.library.clone())
        .with_config(&ctx.config.governance);
    let tracker = LatencyTracker::new("classify", ctx.config.latency.clone(), sink);

    let decision = tracker
        .track_result(|| router.route(text))
        .context("failed to classify ticket")?;
    info!(log = %log_path.display(), "classification complete");
    print_json(out, &decision)
}

pub fn fallbacks(ctx: &AppContext, args: FallbackArgs, out: &mut impl Write) -> Result<()> {
    let log_path = ctx.audit_log(args.log_path.clone())?;
    let entries = load_fallbacks(&log_path)
        .with_context(|| format!("failed to read {}", log_path.display()))?;
    writeln!(out, "Loaded {} fallback entries from {}", entries.len(), log_path.display())?;

    let mut filter = FallbackFilter {
        min_confidence: args.min_confidence,
        max_confidence: args.max_confidence,
        category: args.category.clone(),
        contains_pii: args.pii_filter(),
        ..FallbackFilter::default()
    };
    if let Some(days) = args.days {
        filter = filter
            .within_days(days, Utc::now())
            .context("invalid --days window")?;
    }
    let entries = filter.apply(entries);
    if filter != FallbackFilter::default() {
        writeln!(out, "Filtered to {} entries", entries.len())?;
    }

    report::write_summary(out, &FallbackSummary::from_entries(&entries))?;
    if !args.stats_only {
        report::write_entries(out, &entries, args.limit)?;
    }

    if let Some(path) = args.export {
        export_csv(&entries, &path)?;
        writeln!(out, "Exported {} entries to {}", entries.len(), path.display())?;
    }
    Ok(())
}

fn export_csv(entries: &[triage_governance::FallbackEntry], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(entries, BufWriter::new(file))
        .with_context(|| format!("failed to write {}", path.display()))
}
