//! Logger setup
//!
//! Lines look like `2024-01-01 12:00:00 - WARNING - message`. The `log` crate has
//! no level above error, so critical records are errors sent to the
//! [`CRITICAL`] target.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use env_logger::{Builder, Env, Target};
use log::Level;

use crate::import::types::TIMESTAMP_FORMAT;

/// Target for records that should be tagged `CRITICAL`
pub const CRITICAL: &str = "critical";

/// Severity name written to the log
pub fn level_label(level: Level, target: &str) -> &'static str {
    match level {
        Level::Error if target == CRITICAL => "CRITICAL",
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Install the global logger
///
/// `RUST_LOG` takes precedence over the default level. With a log file the
/// output is appended there instead of going to stderr.
pub fn init(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "debug,sqlx=warn"
    } else {
        "info,sqlx=warn"
    };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} - {} - {}",
            Utc::now().format(TIMESTAMP_FORMAT),
            level_label(record.level(), record.target()),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialise logger")?;
    Ok(())
}
