//! Function-pointer job state machine.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │  STATE_TABLE                                  │
//! │  ┌──────────┬────────────────┬──────────────┐ │
//! │  │ JobState │ on_enter       │ on_record    │ │
//! │  ├──────────┼────────────────┼──────────────┤ │
//! │  │ Off      │ -              │ fn(ctx)->Opt │ │
//! │  │ Pending  │ -              │ fn(ctx)->Opt │ │
//! │  │ Idle     │ -              │ fn(ctx)->Opt │ │
//! │  │ Setup    │ fn(ctx, fx)    │ fn(ctx)->Opt │ │
//! │  │ Printing │ -              │ fn(ctx)->Opt │ │
//! │  │ Complete │ fn(ctx, fx)    │ fn(ctx)->Opt │ │
//! │  │ Aborted  │ fn(ctx, fx)    │ fn(ctx)->Opt │ │
//! │  └──────────┴────────────────┴──────────────┘ │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! [`advance`] runs `on_record` for the current state once per telemetry
//! record.  If it names a different state, that state's `on_enter` pushes
//! the transition's effects.  At most one edge is taken per record.
//! `Off` and `Pending` are entered only through power commands.

pub mod context;
pub mod states;

use context::{Effects, JobContext};
use log::info;
use states::STATE_TABLE;

use crate::telemetry::{Scoreboard, TelemetryRecord};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Coarse lifecycle of the monitored print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum JobState {
    #[default]
    Off = 0,
    Pending = 1,
    Idle = 2,
    Setup = 3,
    Printing = 4,
    Complete = 5,
    Aborted = 6,
}

impl JobState {
    /// Total number of states; sizes the table array.
    pub const COUNT: usize = 7;

    pub const ALL: [JobState; Self::COUNT] = [
        Self::Off,
        Self::Pending,
        Self::Idle,
        Self::Setup,
        Self::Printing,
        Self::Complete,
        Self::Aborted,
    ];

    /// Lower-case label used in captions and logs.
    pub fn label(self) -> &'static str {
        STATE_TABLE[self as usize].name
    }

    /// Whether `self → next` is an edge of the lifecycle graph.  Staying put
    /// is always allowed; `→ Off` is the power-off command.
    pub fn can_transition_to(self, next: JobState) -> bool {
        if self == next || next == JobState::Off {
            return true;
        }
        matches!(
            (self, next),
            (JobState::Off, JobState::Pending)
                | (JobState::Pending, JobState::Idle)
                | (JobState::Idle, JobState::Setup)
                | (JobState::Setup, JobState::Printing)
                | (JobState::Printing, JobState::Complete | JobState::Aborted)
                | (JobState::Complete | JobState::Aborted, JobState::Idle)
        )
    }
}

impl core::fmt::Display for JobState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Handler signatures
// ---------------------------------------------------------------------------

/// Per-record decision.  `Some(next)` requests a transition.
pub type StateRecordFn = fn(&JobContext<'_>) -> Option<JobState>;

/// Runs once when the state is entered from telemetry.
pub type StateEnterFn = fn(&JobContext<'_>, &mut Effects);

/// One row in the table.
pub struct StateDescriptor {
    pub id: JobState,
    pub name: &'static str,
    pub on_enter: Option<StateEnterFn>,
    pub on_record: StateRecordFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Result of evaluating one record.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: JobState,
    pub next: JobState,
    pub effects: Effects,
}

impl Transition {
    fn stay(state: JobState) -> Self {
        Self {
            from: state,
            next: state,
            effects: Effects::new(),
        }
    }

    pub fn changed(&self) -> bool {
        self.from != self.next
    }
}

/// Evaluate one record against the current state.
///
/// `scoreboard` must already have `record` merged.  Pure: the caller applies
/// the returned effects.
pub fn advance(state: JobState, scoreboard: &Scoreboard, record: &TelemetryRecord) -> Transition {
    let ctx = JobContext::new(state, scoreboard, record);
    let next = match (STATE_TABLE[state as usize].on_record)(&ctx) {
        Some(next) if next != state => next,
        _ => return Transition::stay(state),
    };
    debug_assert!(state.can_transition_to(next), "illegal edge {state} -> {next}");

    info!("JOB transition: {} -> {}", state, next);

    let mut effects = Effects::new();
    if let Some(enter) = STATE_TABLE[next as usize].on_enter {
        enter(&ctx, &mut effects);
    }
    Transition {
        from: state,
        next,
        effects,
    }
}
