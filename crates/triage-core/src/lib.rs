//! Triage Core - Foundation crate for the Triage Guard ticket pipeline.
//!
//! This crate provides shared types, error handling and configuration
//! management that the detection, governance and CLI crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`TicketCategory`, `Confidence`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use triage_core::{AppConfig, Confidence};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! config.validate()?;
//!
//! let confidence = Confidence::new(0.42)?;
//! assert!(confidence.is_below(config.governance.confidence_threshold));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, CardLengthPolicy, DetectionConfig, GovernanceConfig, LatencyConfig, LoggingConfig,
    ScanPolicy, ValidationConfig,
};
pub use error::{ConfigError, ConfigResult, Result, TriageError};
pub use types::{Confidence, TicketCategory, Timestamp};
