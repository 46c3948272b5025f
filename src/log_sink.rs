//! Where operation results and invocation failures are reported.

use std::fmt;

use parking_lot::Mutex;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

pub trait LogSink: Send + Sync {
    fn emit(&self, severity: Severity, message: &str);
}

/// Forwards to the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "command_panel", "{message}"),
            Severity::Warning => tracing::warn!(target: "command_panel", "{message}"),
            Severity::Error => tracing::error!(target: "command_panel", "{message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Keeps every entry in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// Remove and return everything collected so far.
    pub fn drain(&self) -> Vec<LogEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl LogSink for MemorySink {
    fn emit(&self, severity: Severity, message: &str) {
        self.entries.lock().push(LogEntry {
            severity,
            message: message.to_string(),
        });
    }
}
