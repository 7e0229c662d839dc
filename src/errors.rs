//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure (including an empty duty roster).
    Config(String),
    /// Malformed user input: empty text, bad time format, non-numeric index.
    Validation(String),
    /// Requested idea (or poll) does not exist.
    NotFound(String),
    /// Reminder time has already elapsed today.
    PastTime(String),
    /// Durable record exists but cannot be parsed into the expected shape.
    DataCorruption(String),
    /// File-system or I/O operation failure.
    Io(String),
    /// Slack API or Socket Mode failure.
    Slack(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::PastTime(msg) => write!(f, "past time: {msg}"),
            Self::DataCorruption(msg) => write!(f, "data corruption: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Slack(msg) => write!(f, "slack: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}
