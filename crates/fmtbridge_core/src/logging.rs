//! Output log shared by every component.
//!
//! Records are forwarded to `tracing` and kept in a bounded in-memory buffer
//! that plays the role of the editor's output channel.

use std::collections::VecDeque;
use std::error::Error;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Default number of entries kept in the buffer.
const DEFAULT_CAPACITY: usize = 1000;

/// Log level, ordered from most to least verbose.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
    /// Nothing is recorded.
    None,
}

/// A recorded log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Error chain attached to the message, if any.
    pub detail: Option<String>,
}

/// Process-wide log sink.
#[derive(Debug)]
pub struct LoggingService {
    level: RwLock<LogLevel>,
    capacity: usize,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl LoggingService {
    /// Creates a service recording `level` and above.
    pub fn new(level: LogLevel) -> Self {
        Self::with_capacity(level, DEFAULT_CAPACITY)
    }

    /// Creates a service keeping at most `capacity` entries.
    pub fn with_capacity(level: LogLevel, capacity: usize) -> Self {
        Self {
            level: RwLock::new(level),
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn level(&self) -> LogLevel {
        *self.level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    pub fn log_debug(&self, message: &str) {
        debug!("{}", message);
        self.record(LogLevel::Debug, message, None);
    }

    pub fn log_info(&self, message: &str) {
        info!("{}", message);
        self.record(LogLevel::Info, message, None);
    }

    pub fn log_warning(&self, message: &str) {
        warn!("{}", message);
        self.record(LogLevel::Warning, message, None);
    }

    /// Logs an error with an optional cause.
    pub fn log_error(&self, message: &str, cause: Option<&dyn Error>) {
        let detail = cause.map(error_chain);
        match &detail {
            Some(detail) => error!("{}: {}", message, detail),
            None => error!("{}", message),
        }
        self.record(LogLevel::Error, message, detail);
    }

    /// Returns a snapshot of the buffered entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    /// Returns whether an entry at `level` contains `needle` in its message.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|entry| entry.level == level && entry.message.contains(needle))
    }

    /// Returns whether any entry at or above `level` was recorded.
    pub fn has_entries_at(&self, level: LogLevel) -> bool {
        self.entries.lock().iter().any(|entry| entry.level >= level)
    }

    /// Drops all buffered entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn record(&self, level: LogLevel, message: &str, detail: Option<String>) {
        let minimum = self.level();
        if minimum == LogLevel::None || level < minimum {
            return;
        }

        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            level,
            message: message.to_string(),
            detail,
        });
    }
}

impl Default for LoggingService {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

fn error_chain(error: &dyn Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
