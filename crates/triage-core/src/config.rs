//! Configuration management for Triage Guard.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/triage/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PII detection settings
    pub detection: DetectionConfig,
    /// Governance (fallback logging, decision tracing) settings
    pub governance: GovernanceConfig,
    /// Latency thresholds for the timing middleware
    pub latency: LatencyConfig,
    /// Output validation settings
    pub validation: ValidationConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides in place.
    ///
    /// Supports the following environment variables:
    /// - `TRIAGE_CONFIDENCE_THRESHOLD`: Override the fallback confidence threshold
    /// - `TRIAGE_SCAN_POLICY`: `collect_all` or `first_match_wins`
    /// - `TRIAGE_AUDIT_DIR`: Override the audit log directory
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("TRIAGE_CONFIDENCE_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.governance.confidence_threshold = threshold;
                tracing::debug!("Override confidence_threshold from env: {}", threshold);
            }
        }

        if let Some(val) = lookup("TRIAGE_SCAN_POLICY") {
            match val.as_str() {
                "collect_all" => self.detection.policy = ScanPolicy::CollectAll,
                "first_match_wins" => self.detection.policy = ScanPolicy::FirstMatchWins,
                other => tracing::warn!("Ignoring unknown TRIAGE_SCAN_POLICY value: {}", other),
            }
        }

        if let Some(val) = lookup("TRIAGE_AUDIT_DIR") {
            tracing::debug!("Override audit_dir from env: {}", val);
            self.governance.audit_dir = Some(PathBuf::from(val));
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit_interval(
            "governance.confidence_threshold",
            self.governance.confidence_threshold,
        )?;
        check_unit_interval("validation.min_confidence", self.validation.min_confidence)?;

        if self.latency.warn_ms > self.latency.error_ms {
            return Err(ConfigError::InvalidValue {
                field: "latency.warn_ms".to_string(),
                reason: format!(
                    "must not exceed error_ms ({} > {})",
                    self.latency.warn_ms, self.latency.error_ms
                ),
            });
        }

        Ok(())
    }

    /// Resolve the directory audit logs are written to.
    ///
    /// Uses `governance.audit_dir` when set, otherwise `<data dir>/audit`.
    pub fn audit_dir(&self) -> ConfigResult<PathBuf> {
        match &self.governance.audit_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("audit")),
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/triage/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "triage", "triage").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/triage`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "triage", "triage").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

fn check_unit_interval(field: &str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be within [0.0, 1.0], got {value}"),
        })
    }
}

/// How the scanner walks the pattern library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Stop at the first category that produces a validated match
    FirstMatchWins,
    /// Evaluate every category and report every validated match
    #[default]
    CollectAll,
}

/// Accepted digit counts for bare card-number runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardLengthPolicy {
    /// 13 to 16 digits
    #[default]
    ThirteenToSixteen,
    /// Exactly 16 digits
    SixteenOnly,
}

/// PII detection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Scanning policy for detailed scans
    pub policy: ScanPolicy,
    /// Digit-count policy for bare card numbers
    pub card_length: CardLengthPolicy,
}

/// Governance orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceConfig {
    /// Decisions below this confidence are written to the fallback log
    pub confidence_threshold: f64,
    /// Write a decision trace record for every routed ticket
    pub trace_decisions: bool,
    /// Directory for audit logs (defaults to `<data dir>/audit`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_dir: Option<PathBuf>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            trace_decisions: false,
            audit_dir: None,
        }
    }
}

/// Latency thresholds in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    /// Durations at or above this are reported as `warn`
    pub warn_ms: u64,
    /// Durations at or above this are reported as `error`
    pub error_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            warn_ms: 500,
            error_ms: 2000,
        }
    }
}

/// Output validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum acceptable classifier confidence
    pub min_confidence: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,triage=debug".to_string(),
        }
    }
}
