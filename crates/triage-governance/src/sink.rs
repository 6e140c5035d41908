//! Audit sinks: where governance records go.

use crate::error::{GovernanceError, Result};
use crate::record::{AuditRecord, RecordCategory};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

/// Append-only destination for audit records.
pub trait AuditSink: Send + Sync {
    /// Durably append one record.
    fn append(&self, record: &AuditRecord) -> Result<()>;
}

/// Appends records as JSON lines to a file.
///
/// Parent directories are created on first write. A mutex serializes
/// appenders within the process so lines never interleave.
#[derive(Debug)]
pub struct JsonlFileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonlFileSink {
    /// Create a sink writing to `path`. Nothing touches the disk until the
    /// first append.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record in the log. A missing file is an empty log.
    pub fn read_all(&self) -> Result<Vec<AuditRecord>> {
        read_records(&self.path)
    }
}

impl AuditSink for JsonlFileSink {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self
            .lock
            .lock()
            .map_err(|_| GovernanceError::Sink("lock poisoned".into()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        debug!(
            category = %record.category,
            id = %record.id,
            path = %self.path.display(),
            "appended audit record"
        );
        Ok(())
    }
}

/// Read audit records from a JSONL file, skipping lines that do not parse.
pub fn read_records(path: &Path) -> Result<Vec<AuditRecord>> {
    if !path.exists() {
        debug!(path = %path.display(), "audit log not found, treating as empty");
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = index + 1, error = %e, "skipping malformed audit record"),
        }
    }
    Ok(records)
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Records of one category.
    #[must_use]
    pub fn records_of(&self, category: RecordCategory) -> Vec<AuditRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.category == category)
            .collect()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no record has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &AuditRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| GovernanceError::Sink("lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }
}
