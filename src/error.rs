//! Unified error type for the print watcher.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  None of these are fatal: the
//! loop logs them and carries on.  Only configuration errors stop start-up.

use core::fmt;

use crate::app::ports::{ActuatorError, ConfigError, ConnectionError, NotificationError};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A telemetry payload could not be parsed.  Skip it; the session continues.
    TelemetryParse(TelemetryParseError),
    /// The printer stream failed to open or dropped.
    Connection(ConnectionError),
    /// A relay command failed.  State is left as it was so a retry is possible.
    Actuator(ActuatorError),
    /// A notification could not be queued or delivered.  Best effort only.
    Notification(NotificationError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TelemetryParse(e) => write!(f, "telemetry: {e}"),
            Self::Connection(e) => write!(f, "connection: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Notification(e) => write!(f, "notification: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Telemetry parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryParseError {
    /// Payload is not valid JSON.
    InvalidJson(String),
    /// Payload is valid JSON but not an object.
    NotAnObject,
    /// Binary frame that is not UTF-8.
    NotUtf8,
}

impl fmt::Display for TelemetryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(msg) => write!(f, "invalid JSON: {msg}"),
            Self::NotAnObject => write!(f, "payload is not a JSON object"),
            Self::NotUtf8 => write!(f, "payload is not UTF-8"),
        }
    }
}

impl std::error::Error for TelemetryParseError {}

impl From<TelemetryParseError> for Error {
    fn from(e: TelemetryParseError) -> Self {
        Self::TelemetryParse(e)
    }
}

impl From<ConnectionError> for Error {
    fn from(e: ConnectionError) -> Self {
        Self::Connection(e)
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

impl From<NotificationError> for Error {
    fn from(e: NotificationError) -> Self {
        Self::Notification(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
