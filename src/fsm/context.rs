//! Read-only context handed to every state handler, and the effects they emit.
//!
//! Handlers never mutate anything directly.  They look at the state the
//! record arrived in, the merged scoreboard and the record itself, and
//! push [`Effect`]s that the connection session applies afterwards.

use log::warn;

use crate::app::events::Notification;
use crate::telemetry::{FieldValue, Scoreboard, TelemetryRecord};

/// Upper bound on effects a single record can produce.
pub const MAX_EFFECTS: usize = 4;

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Store the job's file name on the scoreboard.  `None` clears it.
    CaptureJobFile(Option<FieldValue>),
    /// Drop file name, elapsed and remaining time from the scoreboard.
    ClearJobFields,
    /// Send a message to the recipient.
    Notify(Notification),
}

pub type Effects = heapless::Vec<Effect, MAX_EFFECTS>;

/// Append an effect, logging instead of panicking if the list is full.
pub fn push_effect(effects: &mut Effects, effect: Effect) {
    if let Err(dropped) = effects.push(effect) {
        warn!("FSM: effect list full, dropping {:?}", dropped);
    }
}

/// Everything a handler may inspect.
pub struct JobContext<'a> {
    /// State the record arrived in.  `on_enter` handlers see the state
    /// being left, which is what status captions report.
    pub state: super::JobState,
    /// Scoreboard with `record` already merged.
    pub scoreboard: &'a Scoreboard,
    pub record: &'a TelemetryRecord,
}

impl<'a> JobContext<'a> {
    pub fn new(
        state: super::JobState,
        scoreboard: &'a Scoreboard,
        record: &'a TelemetryRecord,
    ) -> Self {
        Self {
            state,
            scoreboard,
            record,
        }
    }
}
