//! Fuzz target: telemetry parse -> merge -> advance
//!
//! Feeds arbitrary bytes through the record parser and, when they parse,
//! through the scoreboard merge and the job state machine from every
//! state.  Nothing may panic and every transition must be a legal edge.
//!
//! cargo fuzz run fuzz_telemetry_record

#![no_main]

use libfuzzer_sys::fuzz_target;
use printwatch::fsm::{self, JobState};
use printwatch::telemetry::{Scoreboard, TelemetryRecord};

fuzz_target!(|data: &[u8]| {
    let Ok(record) = TelemetryRecord::parse_bytes(data) else {
        return;
    };

    let mut scoreboard = Scoreboard::new();
    scoreboard.merge(&record);

    for state in JobState::ALL {
        let t = fsm::advance(state, &scoreboard, &record);
        assert!(state.can_transition_to(t.next), "{state} -> {} is not an edge", t.next);
    }
});
