//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the power sequencer (and through it the
//! connection session, job state and scoreboard).  Every inbound event
//! goes through one of its `handle_*` methods, one at a time, from the
//! control loop.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  commands ──▶ ┌──────────────────────────┐ ──▶ NotificationSink
//!  frames   ──▶ │      MonitorService       │
//!  timer    ──▶ │ PowerSequencer · Session  │ ──▶ ActuatorPort
//!               │ FSM · Scoreboard          │ ──▶ TelemetryLink
//!               └──────────────────────────┘
//! ```

use core::time::Duration;

use log::{info, warn};

use crate::config::MonitorConfig;
use crate::fsm::JobState;
use crate::power::{PendingActuation, PowerSequencer};
use crate::report::status_message;
use crate::telemetry::Scoreboard;

use super::commands::AppCommand;
use super::events::{ImageSource, Notification};
use super::ports::{ActuatorPort, ConnectionError, NotificationSink, SessionId, TelemetryLink};

pub const MSG_READY: &str = "The bot is ready to receive commands.";
pub const MSG_OFF: &str = "Printer is off";
pub const MSG_TURNING_ON: &str = "Printer is turning on...";
pub const MSG_TURNING_OFF: &str = "Printer is turning off...";
pub const MSG_SHUTTING_DOWN: &str = "Bot is shutting down...";

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct MonitorService {
    power: PowerSequencer,
    power_on_delay: Duration,
    stopping: bool,
}

impl MonitorService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the relay; call [`start`](Self::start) next.
    pub fn new(config: &MonitorConfig) -> Self {
        Self::with_delay(config.power_on_delay())
    }

    pub fn with_delay(power_on_delay: Duration) -> Self {
        Self {
            power: PowerSequencer::new(),
            power_on_delay,
            stopping: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce readiness and adopt a relay that is already on.
    pub fn start(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) {
        send(sink, &Notification::text(MSG_READY));
        if let Err(e) = self.power.adopt(hw, link, sink) {
            warn!("{}; assuming the printer is off", crate::Error::from(e));
        }
        info!("MonitorService started in {}", self.power.state());
    }

    /// Announce shutdown, close the stream and release the relay driver.
    /// Commands are ignored from here on.
    pub fn shutdown(
        &mut self,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) {
        if self.stopping {
            return;
        }
        self.stopping = true;
        send(sink, &Notification::text(MSG_SHUTTING_DOWN));
        self.power.shutdown(link);
        hw.release();
        info!("MonitorService stopped");
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a command from the allow-listed chat.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) {
        if self.stopping {
            info!("Ignoring {} during shutdown", cmd);
            return;
        }
        info!("Command {} in state {}", cmd, self.power.state());
        match cmd {
            AppCommand::Status => {
                let reply = match self.power.state() {
                    JobState::Off => Notification::text(MSG_OFF),
                    state => Notification::photo(
                        ImageSource::Snapshot,
                        status_message(state, self.power.scoreboard()),
                    ),
                };
                send(sink, &reply);
            }
            AppCommand::PowerOn => {
                if self.power.power_on(self.power_on_delay).is_some() {
                    send(sink, &Notification::text(MSG_TURNING_ON));
                }
            }
            AppCommand::PowerOff => match self.power.power_off(hw, link) {
                Ok(_) => send(sink, &Notification::text(MSG_TURNING_OFF)),
                Err(e) => {
                    warn!("Power off failed, state kept: {}", e);
                    send(
                        sink,
                        &Notification::text(format!("Could not switch the printer off: {}", e)),
                    );
                }
            },
        }
    }

    // ── Stream and timer events ───────────────────────────────

    pub fn handle_telemetry(
        &mut self,
        session: SessionId,
        payload: &[u8],
        sink: &mut impl NotificationSink,
    ) {
        self.power.on_telemetry(session, payload, sink);
    }

    pub fn handle_link_closed(
        &mut self,
        session: SessionId,
        reason: &ConnectionError,
        sink: &mut impl NotificationSink,
    ) {
        self.power.on_link_closed(session, reason, sink);
    }

    pub fn handle_power_on_due(
        &mut self,
        generation: u64,
        hw: &mut impl ActuatorPort,
        link: &mut impl TelemetryLink,
        sink: &mut impl NotificationSink,
    ) {
        if self.stopping {
            return;
        }
        self.power.power_on_due(generation, hw, link, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current job state.
    pub fn state(&self) -> JobState {
        self.power.state()
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        self.power.scoreboard()
    }

    /// The power-on the control loop should have a timer armed for.
    pub fn pending(&self) -> Option<PendingActuation> {
        self.power.pending()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping
    }
}

fn send(sink: &mut impl NotificationSink, notification: &Notification) {
    if let Err(e) = notification.deliver(sink) {
        warn!("Notification dropped: {}", e);
    }
}
