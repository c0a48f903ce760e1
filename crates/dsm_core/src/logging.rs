//! Logging bootstrap for Docker Simple Manager.
//!
//! This module provides:
//! - Global `tracing` subscriber setup with console output
//! - Optional daily-rolling file output under the workspace
//! - Archive pruning driven by the `logging` settings group
//!
//! Settings carry the `logging` group's level names (`DEBUG`,
//! `INFO`, `WARNING`, `ERROR`); they are mapped onto `tracing`
//! filter directives here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Active log file name; rolled archives get a date suffix.
pub const LOG_FILE_NAME: &str = "app.log";

/// Initialize console-only logging.
///
/// Respects the `RUST_LOG` environment variable when set, otherwise
/// falls back to the given settings level. Call once at startup.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Initialize console plus daily-rolling file logging.
///
/// The file layer writes `app.log` under `log_dir` through a
/// non-blocking worker. The returned guard must stay alive for the
/// lifetime of the process; dropping it loses buffered lines.
pub fn init_with_file(default_level: &str, log_dir: &Path) -> io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(env_filter(default_level))
        .init();

    Ok(guard)
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)))
}

/// Map a `logging.level` setting onto a `tracing` filter directive.
///
/// Unknown names fall back to `info`.
pub fn level_to_filter_str(level: &str) -> &'static str {
    match level {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        _ => "info",
    }
}

/// Delete the oldest rolled log archives beyond `keep`.
///
/// Rolled archives are named `app.log.YYYY-MM-DD`, so the date
/// suffix sorts chronologically by name. The active `app.log` is
/// never touched. Returns the number of files removed; a missing
/// directory removes nothing.
pub fn prune_archived_logs(log_dir: &Path, keep: usize) -> io::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let prefix = format!("{}.", LOG_FILE_NAME);
    let mut archived: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) {
            archived.push(entry.path());
        }
    }
    if archived.len() <= keep {
        return Ok(0);
    }

    archived.sort();
    let excess = archived.len() - keep;
    for path in &archived[..excess] {
        fs::remove_file(path)?;
        tracing::debug!("Pruned archived log {}", path.display());
    }
    Ok(excess)
}
