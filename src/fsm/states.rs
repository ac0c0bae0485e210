//! Concrete state handler functions and the state table.
//!
//! Each state is two plain `fn` pointers: `on_record` decides whether the
//! incoming record moves the job on, `on_enter` emits the effects of
//! arriving.  Every check reads the *record*, not the scoreboard.
//!
//! ```text
//!  OFF ──[on cmd]──▶ PENDING ──[first record]──▶ IDLE ──[printStartTime]──▶ SETUP
//!                                                 ▲                           │
//!                                                 │                  [withSelfTest = 100]
//!                                             [fan = 0]                       ▼
//!                                     COMPLETE / ABORTED ◀──[left = 0 / state = 4]── PRINTING
//!
//!  Any state ──[off cmd]──▶ OFF
//! ```

use log::info;

use super::context::{Effect, Effects, JobContext, push_effect};
use super::{JobState, StateDescriptor};
use crate::app::events::{ImageSource, Notification};
use crate::report::status_message;
use crate::telemetry::{Field, FieldValue};

/// `withSelfTest` value meaning calibration finished.
pub const SELF_TEST_DONE: f64 = 100.0;
/// `state` value the printer reports for a stopped job.
pub const STATUS_ABORTED: f64 = 4.0;

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

/// Indexed by `JobState as usize`.
pub static STATE_TABLE: [StateDescriptor; JobState::COUNT] = [
    StateDescriptor {
        id: JobState::Off,
        name: "off",
        on_enter: None,
        on_record: off_record,
    },
    StateDescriptor {
        id: JobState::Pending,
        name: "pending",
        on_enter: None,
        on_record: pending_record,
    },
    StateDescriptor {
        id: JobState::Idle,
        name: "idle",
        on_enter: None,
        on_record: idle_record,
    },
    StateDescriptor {
        id: JobState::Setup,
        name: "setup",
        on_enter: Some(setup_enter),
        on_record: setup_record,
    },
    StateDescriptor {
        id: JobState::Printing,
        name: "printing",
        on_enter: None,
        on_record: printing_record,
    },
    StateDescriptor {
        id: JobState::Complete,
        name: "complete",
        on_enter: Some(complete_enter),
        on_record: finished_record,
    },
    StateDescriptor {
        id: JobState::Aborted,
        name: "aborted",
        on_enter: Some(aborted_enter),
        on_record: finished_record,
    },
];

fn field_equals(ctx: &JobContext<'_>, field: Field, target: f64) -> bool {
    ctx.record.get(field).is_some_and(|v| v.equals(target))
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF / PENDING: driven by power commands
// ═══════════════════════════════════════════════════════════════════════════

fn off_record(_ctx: &JobContext<'_>) -> Option<JobState> {
    // Only the power-on command leaves Off.
    None
}

fn pending_record(_ctx: &JobContext<'_>) -> Option<JobState> {
    // First frame of a fresh session, greeting included.
    Some(JobState::Idle)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_record(ctx: &JobContext<'_>) -> Option<JobState> {
    if ctx.record.is_handshake() {
        return None;
    }
    if ctx
        .record
        .get(Field::PrintStartTime)
        .is_some_and(FieldValue::is_truthy)
    {
        return Some(JobState::Setup);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  SETUP: heating and calibration before the first layer
// ═══════════════════════════════════════════════════════════════════════════

fn setup_enter(ctx: &JobContext<'_>, effects: &mut Effects) {
    let file = ctx.record.get(Field::PrintFileName).cloned();
    let name = file
        .as_ref()
        .map_or_else(|| "unknown file".to_owned(), FieldValue::to_string);
    info!("SETUP: job started for {}", name);

    push_effect(effects, Effect::CaptureJobFile(file));
    push_effect(
        effects,
        Effect::Notify(Notification::photo(
            ImageSource::JobThumbnail,
            format!("Started printing {}", name),
        )),
    );
}

fn setup_record(ctx: &JobContext<'_>) -> Option<JobState> {
    if ctx.record.is_handshake() {
        return None;
    }
    field_equals(ctx, Field::SelfTest, SELF_TEST_DONE).then_some(JobState::Printing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRINTING
// ═══════════════════════════════════════════════════════════════════════════

fn printing_record(ctx: &JobContext<'_>) -> Option<JobState> {
    if ctx.record.is_handshake() {
        return None;
    }
    // An explicit stop outranks a zero remaining time in the same frame.
    if field_equals(ctx, Field::Status, STATUS_ABORTED) {
        return Some(JobState::Aborted);
    }
    if field_equals(ctx, Field::PrintLeftTime, 0.0) {
        return Some(JobState::Complete);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COMPLETE / ABORTED: waiting for the cooldown fan to stop
// ═══════════════════════════════════════════════════════════════════════════

fn complete_enter(ctx: &JobContext<'_>, effects: &mut Effects) {
    finish(ctx, effects, "Printing complete!");
}

fn aborted_enter(ctx: &JobContext<'_>, effects: &mut Effects) {
    finish(ctx, effects, "Printing aborted!");
}

fn finish(ctx: &JobContext<'_>, effects: &mut Effects, headline: &str) {
    // Caption reflects the job as it was, before the fields are cleared.
    let caption = format!("{}\n\n{}", headline, status_message(ctx.state, ctx.scoreboard));
    push_effect(
        effects,
        Effect::Notify(Notification::photo(ImageSource::Snapshot, caption)),
    );
    push_effect(effects, Effect::ClearJobFields);
}

fn finished_record(ctx: &JobContext<'_>) -> Option<JobState> {
    if ctx.record.is_handshake() {
        return None;
    }
    field_equals(ctx, Field::Fan, 0.0).then_some(JobState::Idle)
}
