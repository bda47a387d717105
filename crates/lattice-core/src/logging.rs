//! Tracing subscriber setup.
//!
//! Filter resolution: `LATTICE_LOG`, then `[log].filter`, then `info`.
//! Headless commands log to stderr; the terminal UI owns the screen and
//! logs to a file instead.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "LATTICE_LOG";
pub const LOG_FILE_NAME: &str = "lattice.log";
const DEFAULT_FILTER: &str = "info";

/// Builds the effective filter.
///
/// # Errors
/// Returns an error if the configured directive is malformed. A malformed
/// `LATTICE_LOG` falls back to the configured filter.
pub fn env_filter(configured: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    let directive = configured.unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directive).with_context(|| format!("Invalid log filter '{directive}'"))
}

/// Installs a stderr subscriber.
///
/// # Errors
/// Returns an error if the filter is invalid or a subscriber is already set.
pub fn init_stderr(configured: Option<&str>) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(configured)?)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .context("Failed to install log subscriber")
}

/// Installs a subscriber writing to `dir/lattice.log`.
///
/// Keep the returned guard alive until exit; dropping it flushes the writer.
///
/// # Errors
/// Returns an error if the directory cannot be created, the filter is
/// invalid, or a subscriber is already set.
pub fn init_file(dir: &Path, configured: Option<&str>) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter(configured)?)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(guard)
}
