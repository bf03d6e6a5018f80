//! Logging initialization using tracing.
//!
//! Diagnostics are a side channel: every layer installed here writes to
//! stderr or to a log file, never to stdout, so the snapshot printed by the
//! binary stays machine-readable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Levels accepted by [`init_logging`] and by configuration validation.
pub const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Check whether `level` is one of the known tracing levels.
pub fn is_valid_level(level: &str) -> bool {
    VALID_LEVELS.contains(&level.to_lowercase().as_str())
}

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error). `RUST_LOG`
///   takes precedence when set.
/// * `format` - Format of the stderr layer.
/// * `log_file` - Optional file receiving a JSON copy of every event,
///   rotated daily.
///
/// # Example
/// ```no_run
/// use hostfacts_common::{init_logging, LogFormat};
///
/// init_logging("warn", LogFormat::Pretty, None).unwrap();
/// ```
pub fn init_logging(level: &str, format: LogFormat, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::daily(dir, file_name);
            Some(
                fmt::layer()
                    .json()
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(appender)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("failed to install tracing subscriber")?,
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoLocal::rfc_3339())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("failed to install tracing subscriber")?,
    }

    Ok(())
}
