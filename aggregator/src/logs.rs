//! Run logging.
//!
//! Every pipeline step reports through a process-wide [`Logger`]. Entries go
//! to stderr, either human-readable or as JSON lines, so stdout stays free
//! for command output.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// How entries are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level for sub-steps
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render as a single human-readable line.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

#[derive(Debug, Default)]
struct LoggerState {
    format: LogFormat,
    quiet: bool,
    #[cfg(test)]
    history: Vec<LogEntry>,
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Writes entries to stderr
#[derive(Debug, Default)]
pub struct Logger {
    state: Mutex<LoggerState>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_format(&self, format: LogFormat) {
        if let Ok(mut state) = self.state.lock() {
            state.format = format;
        }
    }

    /// Stop printing entries.
    pub fn set_quiet(&self, quiet: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.quiet = quiet;
        }
    }

    pub fn log(&self, entry: LogEntry) {
        let Ok(state) = self.state.lock() else {
            return;
        };

        if !state.quiet {
            let line = match state.format {
                LogFormat::Human => entry.render(),
                LogFormat::Json => {
                    serde_json::to_string(&entry).unwrap_or_else(|_| entry.render())
                }
            };
            // stderr may be closed; nothing useful to do about it
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }

        #[cfg(test)]
        {
            let mut state = state;
            state.history.push(entry);
        }
    }

    /// Entries logged so far
    #[cfg(test)]
    pub fn history(&self) -> Vec<LogEntry> {
        self.state
            .lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}
