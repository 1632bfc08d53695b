use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Console rendering; the file sink always gets the plain name.
    fn painted(self) -> String {
        match self {
            Level::Debug => self.name().dimmed().to_string(),
            Level::Info => self.name().to_string(),
            Level::Warning => self.name().yellow().to_string(),
            Level::Error => self.name().red().to_string(),
            Level::Critical => self.name().red().bold().to_string(),
        }
    }
}

/// Log sink handed to every component. Lines go to stderr and, when a log
/// file is configured, get appended there as well. DEBUG lines are dropped
/// unless verbose is set.
#[derive(Clone)]
pub struct Logger {
    verbose: bool,
    file: Option<Arc<FileSink>>,
}

/// File half of the logger. A failing write is reported on stderr once,
/// not per line.
struct FileSink {
    file: Mutex<File>,
    write_failed: AtomicBool,
}

impl Logger {
    pub fn new(verbose: bool, log_file: Option<&Path>) -> Result<Self> {
        let file = match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Some(Arc::new(FileSink {
                    file: Mutex::new(file),
                    write_failed: AtomicBool::new(false),
                }))
            }
            None => None,
        };
        Ok(Self { verbose, file })
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        if self.verbose {
            self.emit(Level::Debug, message.as_ref());
        }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(Level::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    pub fn critical(&self, message: impl AsRef<str>) {
        self.emit(Level::Critical, message.as_ref());
    }

    fn emit(&self, level: Level, message: &str) {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        eprintln!("{} {} {}", timestamp, level.painted(), message);

        if let Some(sink) = &self.file {
            let mut file = sink.file.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = writeln!(file, "{} {} {}", timestamp, level.name(), message) {
                if !sink.write_failed.swap(true, Ordering::Relaxed) {
                    eprintln!("log file write failed: {}", e);
                }
            }
        }
    }
}
