//! The control loop's inbox.
//!
//! Uses an `embassy-sync` bounded MPMC channel to bridge the producer
//! threads (printer stream reader, chat poller, signal handler) with the
//! single control loop.  Every inbound event travels through this one
//! queue, so the loop sees them in arrival order and handles them one at a
//! time.
//!
//! ```text
//! ┌──────────────┐  Telemetry   ┌──────────────┐
//! │ WS reader    │─────────────▶│              │
//! ├──────────────┤  Command     │ Control Loop │
//! │ Chat poller  │─────────────▶│   (async)    │
//! ├──────────────┤  Shutdown    │              │
//! │ Signal       │─────────────▶│              │
//! └──────────────┘              └──────────────┘
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::info;

use crate::app::commands::AppCommand;
use crate::app::ports::{ConnectionError, SessionId};

/// Everything the control loop reacts to, apart from its own timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A command from the allow-listed chat.
    Command(AppCommand),
    /// One frame from the printer stream.
    Telemetry { session: SessionId, payload: Vec<u8> },
    /// The printer stream for `session` ended or never opened.
    LinkClosed {
        session: SessionId,
        reason: ConnectionError,
    },
    /// SIGINT / SIGTERM.
    Shutdown,
}

/// Channel depth for inbound events.
pub const INBOX_DEPTH: usize = 32;

pub type Inbox = Channel<CriticalSectionRawMutex, Inbound, INBOX_DEPTH>;

/// Shared handle to the inbox.  Cheap to clone; one per producer.
#[derive(Clone)]
pub struct InboxHandle(Arc<Inbox>);

impl Default for InboxHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl InboxHandle {
    pub fn new() -> Self {
        Self(Arc::new(Channel::new()))
    }

    /// Post from a producer thread, blocking while the inbox is full.
    pub fn post(&self, msg: Inbound) {
        futures_lite::future::block_on(self.0.send(msg));
    }

    /// Queue [`Inbound::Shutdown`] from the signal handler thread.  Waits
    /// for room rather than dropping the request when the inbox is full.
    pub fn request_shutdown(&self) {
        if self.0.try_send(Inbound::Shutdown).is_err() {
            info!("RUNTIME: inbox full, waiting to queue shutdown");
            self.post(Inbound::Shutdown);
        }
    }

    /// Wait for the next event.
    pub async fn next(&self) -> Inbound {
        self.0.receive().await
    }

    pub fn try_next(&self) -> Option<Inbound> {
        self.0.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
