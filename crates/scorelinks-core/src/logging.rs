//! Tracing subscriber setup.
//!
//! Command-line runs log to stderr. The TUI owns the terminal, so it logs to
//! a daily-rolling file under `$SCORELINKS_HOME/logs` instead.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SCORELINKS_LOG";

/// File name prefix for TUI logs.
pub const LOG_FILE_PREFIX: &str = "scorelinks.log";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Installs a compact stderr subscriber.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_stderr(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow!("install stderr logger: {e}"))
}

/// Installs a non-blocking file subscriber writing into `dir`.
///
/// Keep the returned guard alive for the whole run; dropping it flushes.
///
/// # Errors
/// Returns an error if `dir` cannot be created or a subscriber already exists.
pub fn init_file(dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install file logger: {e}"))?;

    Ok(guard)
}
