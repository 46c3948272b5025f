use std::fmt;

use serde::Serialize;
use ts_rs::TS;

/// Structured error type for the panel. Hosts can match on the error code to
/// decide how to present a failure; the `Display` text is what gets logged.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "code", content = "detail")]
#[ts(export)]
pub enum PanelError {
    /// A target declared malformed operation metadata.
    Discovery { message: String },
    UnknownCommand { name: String },
    MissingArgument { index: usize },
    /// A buffered or default value cannot be represented as the declared kind.
    Conversion {
        parameter: String,
        expected: String,
        found: String,
    },
    /// The operation itself failed.
    Invocation { message: String },
    InvalidValue { message: String },
    IoError { message: String },
    SettingsError { message: String },
}

impl PanelError {
    pub fn invocation(message: impl Into<String>) -> Self {
        PanelError::Invocation {
            message: message.into(),
        }
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Discovery { message } => {
                write!(f, "Malformed command metadata: {message}")
            }
            PanelError::UnknownCommand { name } => write!(f, "Unknown command: {name}"),
            PanelError::MissingArgument { index } => {
                write!(f, "Missing argument at position {index}")
            }
            PanelError::Conversion {
                parameter,
                expected,
                found,
            } => write!(
                f,
                "Cannot convert {found} to {expected} for parameter '{parameter}'"
            ),
            PanelError::Invocation { message } => write!(f, "{message}"),
            PanelError::InvalidValue { message } => write!(f, "Invalid value: {message}"),
            PanelError::IoError { message } => write!(f, "I/O error: {message}"),
            PanelError::SettingsError { message } => write!(f, "Settings error: {message}"),
        }
    }
}

impl std::error::Error for PanelError {}

impl From<std::io::Error> for PanelError {
    fn from(e: std::io::Error) -> Self {
        PanelError::IoError {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(e: serde_json::Error) -> Self {
        PanelError::SettingsError {
            message: e.to_string(),
        }
    }
}

impl From<String> for PanelError {
    fn from(s: String) -> Self {
        PanelError::Invocation { message: s }
    }
}

impl From<&str> for PanelError {
    fn from(s: &str) -> Self {
        PanelError::Invocation {
            message: s.to_string(),
        }
    }
}
