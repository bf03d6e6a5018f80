//! # hostfacts
//!
//! Point-in-time telemetry snapshot for guest VMs.
//!
//! ## Usage
//! ```text
//! hostfacts            # every fact as KEY=value lines
//! hostfacts json       # every fact as one JSON object
//! hostfacts cpu        # CPU_USAGE and ENHANCED_CPU only
//! hostfacts install    # write default config, seed the CPU baseline
//! ```
//!
//! Facts go to stdout; diagnostics go to stderr (or the configured log file).
//! The process exits non-zero only for configuration and `install` failures.

use anyhow::{Context, Result};
use clap::Parser;
use hostfacts_agent::cli::{Args, Mode};
use hostfacts_agent::config::{self, FactsConfig};
use hostfacts_agent::error::FactsError;
use hostfacts_agent::{install, render, snapshot};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Resolve the effective configuration from the config file and CLI flags.
///
/// An explicitly requested config file must load, except in `install`
/// mode where a missing file is about to be written. The default location
/// falls back to built-in defaults.
fn load_config(args: &Args, mode: Mode) -> Result<FactsConfig, FactsError> {
    let mut config = match &args.config {
        Some(path) => {
            let loaded = if mode == Mode::Install {
                FactsConfig::load_for_install(path)
            } else {
                FactsConfig::load_strict(path)
            };
            loaded.map_err(|e| {
                FactsError::config_load_failed(&path.display().to_string(), &e.to_string())
            })?
        }
        None => FactsConfig::load(),
    };

    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config
        .validate()
        .map_err(|e| FactsError::config_invalid(&e.to_string()))?;

    Ok(config)
}

/// Report a fatal error and exit.
fn exit_with(err: &FactsError, mode: Mode) -> ! {
    error!(code = %err.code_string(), error = %err, "hostfacts failed");

    if mode.is_json() {
        println!("{}", err.to_json());
    }
    eprintln!("{}", err);
    if let Some(resolution) = &err.resolution {
        eprintln!("  resolution: {}", resolution);
    }
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mode = args.mode.unwrap_or_default();

    // Load configuration first (before logging init)
    let config = load_config(&args, mode).unwrap_or_else(|e| exit_with(&e, mode));

    if let Err(e) = hostfacts_common::init_logging(
        &config.log_level,
        config.log_format,
        config.log_file_path().as_deref(),
    ) {
        exit_with(&FactsError::logging_init_failed(&format!("{:#}", e)), mode);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = ?mode,
        "hostfacts starting"
    );
    debug!(?config, "Configuration loaded");

    match mode {
        Mode::Install => {
            let config_path = args
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));
            let report = install::run_install(&config, &config_path)
                .unwrap_or_else(|e| exit_with(&e, mode));

            let mut out = std::io::stdout().lock();
            render::write_plain(&mut out, &report.lines())
                .context("Failed to write install report")?;
            out.flush().context("Failed to flush stdout")?;
        }
        Mode::Json => {
            let snapshot = snapshot::collect_snapshot(&config, mode.sections()).await;

            let mut out = std::io::stdout().lock();
            render::write_json(&mut out, &snapshot).context("Failed to write JSON snapshot")?;
            out.flush().context("Failed to flush stdout")?;
        }
        _ => {
            let snapshot = snapshot::collect_snapshot(&config, mode.sections()).await;
            let lines = render::plain_lines(&snapshot, mode.sections());

            let mut out = std::io::stdout().lock();
            render::write_plain(&mut out, &lines).context("Failed to write snapshot")?;
            out.flush().context("Failed to flush stdout")?;
        }
    }

    debug!(mode = ?mode, "hostfacts finished");
    Ok(())
}
