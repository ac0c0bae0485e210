//! Mock port adapters for integration tests.
//!
//! Record every relay, link and notification call so tests can assert on
//! the full history without a printer, a plug or a chat on the network.

use printwatch::app::events::{ImageSource, Notification};
use printwatch::app::ports::{
    ActuatorError, ActuatorPort, ConnectionError, NotificationError, NotificationSink, SessionId,
    TelemetryLink,
};

// ── Relay ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCall {
    Get,
    Set(bool),
    Release,
}

pub struct MockRelay {
    pub calls: Vec<RelayCall>,
    pub on: bool,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn new() -> Self {
        Self::starting(false)
    }

    pub fn starting(on: bool) -> Self {
        Self {
            calls: Vec::new(),
            on,
            fail: false,
        }
    }

    /// Every `set` call, in order.
    pub fn sets(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RelayCall::Set(on) => Some(*on),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorPort for MockRelay {
    fn get(&mut self) -> Result<bool, ActuatorError> {
        self.calls.push(RelayCall::Get);
        if self.fail {
            return Err(ActuatorError::Unreachable("mock".into()));
        }
        Ok(self.on)
    }

    fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.fail {
            return Err(ActuatorError::Unreachable("mock".into()));
        }
        self.calls.push(RelayCall::Set(on));
        self.on = on;
        Ok(())
    }

    fn release(&mut self) {
        self.calls.push(RelayCall::Release);
    }
}

// ── Telemetry link ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCall {
    Open(SessionId),
    Close(SessionId),
}

#[derive(Default)]
pub struct MockLink {
    pub calls: Vec<LinkCall>,
    pub refuse: bool,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the most recent successful open.
    pub fn last_opened(&self) -> Option<SessionId> {
        self.calls.iter().rev().find_map(|c| match c {
            LinkCall::Open(id) => Some(*id),
            LinkCall::Close(_) => None,
        })
    }

    pub fn opens(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, LinkCall::Open(_))).count()
    }
}

impl TelemetryLink for MockLink {
    fn open(&mut self, session: SessionId) -> Result<(), ConnectionError> {
        if self.refuse {
            return Err(ConnectionError::OpenFailed("refused".into()));
        }
        self.calls.push(LinkCall::Open(session));
        Ok(())
    }

    fn close(&mut self, session: SessionId) {
        self.calls.push(LinkCall::Close(session));
    }
}

// ── Notification sink ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Vec<Notification>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.sent
            .iter()
            .filter_map(|n| match n {
                Notification::Text(t) => Some(t.as_str()),
                Notification::Photo { .. } => None,
            })
            .collect()
    }

    pub fn photos(&self) -> Vec<(ImageSource, &str)> {
        self.sent
            .iter()
            .filter_map(|n| match n {
                Notification::Photo { image, caption } => Some((*image, caption.as_str())),
                Notification::Text(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl NotificationSink for RecordingSink {
    fn send_text(&mut self, message: &str) -> Result<(), NotificationError> {
        self.sent.push(Notification::text(message));
        Ok(())
    }

    fn send_photo(&mut self, image: ImageSource, caption: &str) -> Result<(), NotificationError> {
        self.sent.push(Notification::photo(image, caption));
        Ok(())
    }
}
