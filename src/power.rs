//! Power sequencer: the relay and the printer stream, switched together.
//!
//! ```text
//!          power_on(delay)                  power_on_due(gen)
//!   OFF ─────────────────▶ PENDING ─(timer)─▶ set(true) ─▶ open session
//!    ▲                        │
//!    └──── power_off ─────────┴──── cancel timer · set(false) · close
//! ```
//!
//! The sequencer never sleeps.  `power_on` hands back a
//! [`PendingActuation`]; the control loop arms a timer for it and calls
//! [`PowerSequencer::power_on_due`] with its generation when it fires.  A
//! cancelled or superseded timer carries a stale generation and is ignored.

use core::time::Duration;

use log::{info, warn};

use crate::app::ports::{
    ActuatorError, ActuatorPort, ConnectionError, NotificationSink, SessionId, TelemetryLink,
};
use crate::fsm::{JobState, Transition};
use crate::session::ConnectionSession;
use crate::telemetry::Scoreboard;

pub const MSG_PRINTER_ON: &str = "Printer is on";
pub const MSG_CONNECTION_LOST: &str = "Lost connection to the printer";

/// A scheduled power-on.  At most one exists at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingActuation {
    pub generation: u64,
    pub delay: Duration,
}

/// Coordinates the relay with the connection session.
#[derive(Debug, Default)]
pub struct PowerSequencer {
    session: ConnectionSession,
    pending: Option<PendingActuation>,
    next_generation: u64,
    /// The relay is known to be on, by our command or found that way at start-up.
    energized: bool,
}

impl PowerSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Commands ──────────────────────────────────────────────

    /// Schedule a power-on after `delay`.
    ///
    /// Returns the actuation to arm, or `None` when the printer is not off
    /// (a power-on is already pending or the job is running).
    pub fn power_on(&mut self, delay: Duration) -> Option<PendingActuation> {
        if self.state() != JobState::Off || self.pending.is_some() {
            info!("POWER: on ignored in state {}", self.state());
            return None;
        }
        self.next_generation += 1;
        let actuation = PendingActuation {
            generation: self.next_generation,
            delay,
        };
        self.pending = Some(actuation);
        self.session.set_state(JobState::Pending);
        info!(
            "POWER: on scheduled in {} (gen {})",
            humantime::format_duration(delay),
            actuation.generation
        );
        Some(actuation)
    }

    /// The power-on timer for `generation` fired.
    pub fn power_on_due(
        &mut self,
        generation: u64,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) {
        match self.pending {
            Some(p) if p.generation == generation => self.pending = None,
            _ => {
                info!("POWER: ignoring stale timer (gen {})", generation);
                return;
            }
        }

        if let Err(e) = hw.set(true) {
            warn!("POWER: relay on failed: {}", e);
            self.session.set_state(JobState::Off);
            notify(sink, &format!("Could not switch the printer on: {}", e));
            return;
        }
        self.energized = true;
        self.open_session(link, sink);
    }

    /// Cancel any pending power-on, switch the relay off and close the
    /// stream.
    ///
    /// Returns `Ok(false)` when there was nothing to do.  On relay failure
    /// nothing changes, so the command can be retried.
    pub fn power_off(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
    ) -> Result<bool, ActuatorError> {
        let active = self.energized
            || self.pending.is_some()
            || self.session.is_open()
            || self.state() != JobState::Off;
        if !active {
            return Ok(false);
        }

        if self.energized {
            hw.set(false)?;
            self.energized = false;
        }
        if let Some(p) = self.pending.take() {
            info!("POWER: cancelled pending on (gen {})", p.generation);
        }
        self.session.close(link);
        self.session.set_state(JobState::Off);
        info!("POWER: off");
        Ok(true)
    }

    /// Start-up: adopt a relay that is already on by opening the stream
    /// straight away, without commanding it again.
    pub fn adopt(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) -> Result<bool, ActuatorError> {
        let on = self.query_actuator(hw)?;
        info!("POWER: relay is {} at start-up", if on { "on" } else { "off" });
        if on && self.state() == JobState::Off {
            self.energized = true;
            self.session.set_state(JobState::Pending);
            self.open_session(link, sink);
        }
        Ok(on)
    }

    /// Process exit: drop any pending power-on and close the stream.  The
    /// relay is left as it is.
    pub fn shutdown(&mut self, link: &mut impl TelemetryLink) {
        self.pending = None;
        self.session.close(link);
    }

    fn open_session(&mut self, link: &mut impl TelemetryLink, sink: &mut impl NotificationSink) {
        match self.session.open(link) {
            Ok(_) => notify(sink, MSG_PRINTER_ON),
            Err(e) => self.connection_lost(&e, sink),
        }
    }

    // ── Stream events ─────────────────────────────────────────

    /// A frame arrived from `session`.
    pub fn on_telemetry(
        &mut self,
        session: SessionId,
        payload: &[u8],
        sink: &mut impl NotificationSink,
    ) -> Option<Transition> {
        self.session.on_message(session, payload, sink)
    }

    /// The link reported that `session` ended.  Stale reports (a session
    /// we already closed) are ignored.
    pub fn on_link_closed(
        &mut self,
        session: SessionId,
        reason: &ConnectionError,
        sink: &mut impl NotificationSink,
    ) {
        if !self.session.detach(session) {
            return;
        }
        self.connection_lost(reason, sink);
    }

    fn connection_lost(&mut self, reason: &ConnectionError, sink: &mut impl NotificationSink) {
        // Relay stays as it is; a later `off` still switches it off.
        warn!("POWER: {}", reason);
        self.session.set_state(JobState::Off);
        notify(sink, MSG_CONNECTION_LOST);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Ask the relay for its current output.
    pub fn query_actuator(&self, hw: &mut impl ActuatorPort) -> Result<bool, ActuatorError> {
        hw.get()
    }

    pub fn state(&self) -> JobState {
        self.session.state()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        self.session.scoreboard()
    }

    pub fn pending(&self) -> Option<PendingActuation> {
        self.pending
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }

    pub fn session(&self) -> &ConnectionSession {
        &self.session
    }
}

fn notify(sink: &mut impl NotificationSink, message: &str) {
    if let Err(e) = sink.send_text(message) {
        warn!("POWER: notification dropped: {}", e);
    }
}
