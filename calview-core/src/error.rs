//! Error types for calview.

use thiserror::Error;

/// Errors that can occur while parsing, editing, serializing or formatting events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalViewError {
    /// The ICS text is missing mandatory properties or contradicts itself.
    #[error("ICS parse error: {0}")]
    Parse(String),

    /// A caller asked for something outside the event's range.
    #[error("Range error: {0}")]
    Range(String),

    /// A TZID that chrono-tz does not know.
    #[error("Unknown timezone: {0}")]
    ZoneResolution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalViewError {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        CalViewError::Parse(msg.into())
    }

    pub(crate) fn range(msg: impl Into<String>) -> Self {
        CalViewError::Range(msg.into())
    }
}

/// Result type alias for calview operations.
pub type CalViewResult<T> = Result<T, CalViewError>;
