//! The printer connection session.
//!
//! One long-lived [`ConnectionSession`] owns the job state and the
//! scoreboard for the whole process.  Each power cycle opens a fresh
//! stream under a new [`SessionId`]; frames still in flight from an older
//! stream carry the old id and are dropped.
//!
//! ```text
//!  frame ──▶ on_message ──parse──▶ merge ──▶ fsm::advance ──▶ apply effects
//!                │                                              │
//!           stale id? drop                         scoreboard / NotificationSink
//! ```

use log::{debug, info, warn};

use crate::app::ports::{ConnectionError, NotificationSink, SessionId, TelemetryLink};
use crate::fsm::context::Effect;
use crate::fsm::{self, JobState, Transition};
use crate::telemetry::{Field, Scoreboard, TelemetryRecord};

/// Job state plus the scoreboard it is derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorContext {
    pub state: JobState,
    pub scoreboard: Scoreboard,
}

/// Owns the stream lifecycle and dispatches frames into the state machine.
#[derive(Debug, Default)]
pub struct ConnectionSession {
    ctx: MonitorContext,
    current: Option<SessionId>,
    next_id: SessionId,
}

impl ConnectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Open a new stream.  Any stream still open is closed first, so at
    /// most one is ever live.
    pub fn open(&mut self, link: &mut impl TelemetryLink) -> Result<SessionId, ConnectionError> {
        self.close(link);
        self.next_id += 1;
        let id = self.next_id;
        link.open(id)?;
        self.current = Some(id);
        info!("SESSION {}: opened", id);
        Ok(id)
    }

    /// Close the live stream, if any.  Idempotent.
    pub fn close(&mut self, link: &mut impl TelemetryLink) {
        if let Some(id) = self.current.take() {
            link.close(id);
            info!("SESSION {}: closed", id);
        }
    }

    /// Forget the live stream without touching the link.  Used when the
    /// link itself reported the loss.
    pub(crate) fn detach(&mut self, session: SessionId) -> bool {
        if self.current == Some(session) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<SessionId> {
        self.current
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    // ── Inbound frames ────────────────────────────────────────

    /// Handle one frame from `session`.
    ///
    /// Malformed frames are logged and skipped.  Returns the transition if
    /// the frame moved the job to a new state.
    pub fn on_message(
        &mut self,
        session: SessionId,
        payload: &[u8],
        sink: &mut impl NotificationSink,
    ) -> Option<Transition> {
        if self.current != Some(session) {
            debug!("SESSION {}: dropping frame, live session is {:?}", session, self.current);
            return None;
        }
        let record = match decode(payload) {
            Ok(record) => record,
            Err(e) => {
                warn!("SESSION {}: skipping frame: {}", session, e);
                return None;
            }
        };
        let transition = self.on_record(&record, sink);
        transition.changed().then_some(transition)
    }

    /// Merge `record` and run it through the state machine.
    pub fn on_record(&mut self, record: &TelemetryRecord, sink: &mut impl NotificationSink) -> Transition {
        self.ctx.scoreboard.merge(record);
        let transition = fsm::advance(self.ctx.state, &self.ctx.scoreboard, record);
        self.ctx.state = transition.next;
        for effect in &transition.effects {
            self.apply(effect, sink);
        }
        transition
    }

    fn apply(&mut self, effect: &Effect, sink: &mut impl NotificationSink) {
        match effect {
            Effect::CaptureJobFile(Some(name)) => {
                self.ctx.scoreboard.set(Field::PrintFileName, name.clone());
            }
            Effect::CaptureJobFile(None) => self.ctx.scoreboard.clear(&[Field::PrintFileName]),
            Effect::ClearJobFields => self.ctx.scoreboard.clear(&Field::JOB),
            Effect::Notify(notification) => {
                if let Err(e) = notification.deliver(sink) {
                    warn!("SESSION: notification dropped: {}", e);
                }
            }
        }
    }

    // ── State access ──────────────────────────────────────────

    pub fn state(&self) -> JobState {
        self.ctx.state
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.ctx.scoreboard
    }

    /// Power commands are the only writers besides the state machine.
    pub(crate) fn set_state(&mut self, state: JobState) {
        if self.ctx.state != state {
            info!("JOB transition: {} -> {} (power)", self.ctx.state, state);
            self.ctx.state = state;
        }
    }
}

fn decode(payload: &[u8]) -> crate::Result<TelemetryRecord> {
    Ok(TelemetryRecord::parse_bytes(payload)?)
}
