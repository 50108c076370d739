//! Logger utility for application-wide logging
//!
//! Works alongside the standard log crate: records go to stderr so tile
//! bytes written to stdout stay clean, and optionally to a log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Metadata, LevelFilter};

use crate::utils::sync::lock;

/// Custom logger implementation
pub struct Logger {
    level: LevelFilter,
    /// File handle for log output
    file: Mutex<Option<File>>,
}

impl Logger {
    /// Creates a logger writing records up to `level`
    ///
    /// # Arguments
    ///
    /// * `log_file` - Optional file that receives a copy of every record;
    ///   it is appended to, not truncated
    /// * `level` - Most verbose level that is emitted
    pub fn new(log_file: Option<&Path>, level: LevelFilter) -> io::Result<Self> {
        let file = match log_file {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Logger {
            level,
            file: Mutex::new(file),
        })
    }

    /// Logger that only reports to stderr
    pub fn console(level: LevelFilter) -> Self {
        Logger {
            level,
            file: Mutex::new(None),
        }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Appends a line to the log file, if there is one
    pub fn log(&self, message: &str) -> io::Result<()> {
        if let Some(file) = &mut *lock(&self.file) {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Installs a `Logger` as the global logger of the log crate
    ///
    /// The installed instance is returned so callers can write summaries
    /// through the same file handle.
    pub fn init_global_logger(log_file: Option<&Path>, level: LevelFilter) -> io::Result<&'static Logger> {
        let global_logger: &'static Logger = Box::leak(Box::new(Logger::new(log_file, level)?));

        if log::set_logger(global_logger).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level);
        Ok(global_logger)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = self.log(&message);
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Some(file) = &mut *lock(&self.file) {
            let _ = file.flush();
        }
    }
}
