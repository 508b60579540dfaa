// src/logging.rs

//! Log setup with server-style formatting.
//!
//! Every record is written as `[timestamp] [LEVEL] message` to stdout and to
//! a log file in the output directory.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{Level, LevelFilter};

use crate::error::{AppError, Result};
use crate::models::LoggingConfig;

/// Writes each buffer to stdout and to a file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Trace => "TRACE",
        Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warn => "WARN",
        Level::Error => "ERROR",
    }
}

/// Timestamped log file name used when none is configured.
pub fn default_log_file_name() -> String {
    format!("scraper_{}.log", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Format a log line.
fn format_line(level: Level, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level_label(level), message)
}

/// Initialize the global logger. Returns the log file path.
///
/// Dependencies log at warning level at most; `RUST_LOG` overrides.
pub fn init(output_dir: &Path, config: &LoggingConfig) -> Result<PathBuf> {
    let level = config.level_filter()?;
    let file_name = config.file.clone().unwrap_or_else(default_log_file_name);
    let path = output_dir.join(file_name);

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::new()
        .filter_level(level.min(LevelFilter::Warn))
        .filter_module("bounty_timeline", level)
        .filter_module("bounty_scraper", level)
        .parse_env(env_logger::Env::default())
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(record.level(), &record.args().to_string())
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()
        .map_err(|e| AppError::config(format!("logger already initialized: {e}")))?;

    Ok(path)
}
