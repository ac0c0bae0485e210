//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (relay, chat API, printer stream, config source) implement
//! these traits.  The [`MonitorService`](super::service::MonitorService)
//! consumes them via generics, so the domain core never touches a socket
//! directly.
//!
//! ## Delivery notes
//!
//! - **NotificationSink** implementations MUST NOT block on the network.
//!   Enqueue and return; report a full queue as an error.
//! - **ActuatorPort** errors are surfaced to whoever issued the command.
//! - **TelemetryLink** delivers inbound frames out-of-band (through the
//!   runtime inbox), tagged with the [`SessionId`] passed to `open`.

use crate::config::MonitorConfig;

use super::events::ImageSource;

/// Identifies one opened telemetry connection.  Monotonic per process.
pub type SessionId = u64;

// ───────────────────────────────────────────────────────────────
// Notification sink (driven adapter: domain → chat)
// ───────────────────────────────────────────────────────────────

/// Outbound notifications.  Fire-and-forget from the domain's point of view.
pub trait NotificationSink {
    /// Send a plain text message to the allow-listed recipient.
    fn send_text(&mut self, message: &str) -> Result<(), NotificationError>;

    /// Send a photo fetched from `image` with the given caption.
    fn send_photo(&mut self, image: ImageSource, caption: &str) -> Result<(), NotificationError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → power relay)
// ───────────────────────────────────────────────────────────────

/// The power relay feeding the printer.
pub trait ActuatorPort {
    /// Query the relay's current output.
    fn get(&mut self) -> Result<bool, ActuatorError>;

    /// Energise (`true`) or de-energise (`false`) the relay.
    fn set(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Release the underlying driver connection before process exit.
    fn release(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Telemetry link (driven adapter: printer stream → inbox)
// ───────────────────────────────────────────────────────────────

/// Opens and closes the printer's status stream.
pub trait TelemetryLink {
    /// Start streaming for `session`.  Frames and the eventual close notice
    /// are delivered asynchronously, tagged with `session`.
    fn open(&mut self, session: SessionId) -> Result<(), ConnectionError>;

    /// Stop streaming for `session`.  Safe to call repeatedly or for a
    /// session that already ended.
    fn close(&mut self, session: SessionId);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: environment → domain)
// ───────────────────────────────────────────────────────────────

/// Loads the monitor configuration.
///
/// Implementations MUST validate before returning.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<MonitorConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`NotificationSink`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The outbound queue is full; the notification was dropped.
    QueueFull,
    /// The notification worker has stopped.
    Closed,
    /// The chat API rejected or failed the request.
    Delivery(String),
}

/// Errors from [`ActuatorPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActuatorError {
    /// The relay could not be reached.
    Unreachable(String),
    /// The relay answered with something we could not interpret.
    BadResponse(String),
    /// The relay reported a state different from the one commanded.
    NotApplied { requested: bool },
}

/// Errors from [`TelemetryLink`] operations and stream loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The stream could not be established.
    OpenFailed(String),
    /// The stream ended without a close being requested.
    Closed(String),
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is missing.  Carries the setting name.
    Missing(&'static str),
    /// The config file could not be parsed.
    Malformed(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The config file could not be read.
    IoError(String),
}

impl core::fmt::Display for NotificationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::QueueFull => write!(f, "notification queue full"),
            Self::Closed => write!(f, "notification worker stopped"),
            Self::Delivery(msg) => write!(f, "delivery failed: {}", msg),
        }
    }
}

impl core::fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unreachable(msg) => write!(f, "relay unreachable: {}", msg),
            Self::BadResponse(msg) => write!(f, "unexpected relay response: {}", msg),
            Self::NotApplied { requested } => {
                write!(f, "relay did not switch {}", if *requested { "on" } else { "off" })
            }
        }
    }
}

impl core::fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OpenFailed(msg) => write!(f, "could not open printer stream: {}", msg),
            Self::Closed(msg) => write!(f, "printer stream closed: {}", msg),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "missing setting {}", name),
            Self::Malformed(msg) => write!(f, "config malformed: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for NotificationError {}
impl std::error::Error for ActuatorError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}
