// src/logging.rs

//! Global `tracing` subscriber setup.
//!
//! The level comes from the `--log-level` flag when given, otherwise from
//! `GANTRY_LOG`, otherwise `info`. All output goes to stderr: stdout belongs
//! to the tasks, and the `--preprocess` hook in particular prints transformed
//! source there for the test runner to consume.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Install the process-wide subscriber. Call once, before any task runs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = cli_level
        .map(Level::from)
        .or_else(level_from_env)
        .unwrap_or(Level::INFO);

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_env() -> Option<Level> {
    std::env::var("GANTRY_LOG").ok()?.trim().parse().ok()
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
