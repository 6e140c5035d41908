//! `triage`: command-line front-end for Triage Guard.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod args;
mod commands;
mod report;

use anyhow::{Context, Result};
use args::{Cli, Commands};
use clap::Parser;
use commands::AppContext;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error};
use triage_core::AppConfig;

fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    config.apply_env_overrides();
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    init_tracing(&config.logging.filter);
    debug!("triage v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli.command, config) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: AppConfig) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Scan { text } => commands::scan(&ctx, &commands::input_text(text)?, &mut out)?,
        Commands::Redact { text } => {
            commands::redact(&ctx, &commands::input_text(text)?, &mut out)?;
        }
        Commands::Classify { text, log_path } => {
            commands::classify(&ctx, &commands::input_text(text)?, log_path, &mut out)?;
        }
        Commands::Fallbacks(args) => commands::fallbacks(&ctx, args, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
