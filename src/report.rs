//! Human-readable status captions.
//!
//! ```text
//! State: printing
//! Current position: X:110.00 Y:110.00 Z:2.40
//! Nozzle temperature: 210°C
//! Bed temperature: 60°C
//! Box temperature: 31°C
//! File: part.gcode            ┐
//! Progress: 42%               │ only while printing
//! Time elapsed: 12m 30s       │
//! Time left: 17m 15s          ┘
//! ```

use core::fmt::Write;
use std::time::Duration;

use crate::fsm::JobState;
use crate::telemetry::{Field, FieldValue, Scoreboard};

const UNKNOWN: &str = "unknown";

/// Build the status caption for `state` from the scoreboard.
pub fn status_message(state: JobState, scoreboard: &Scoreboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "State: {}", state.label());
    let _ = writeln!(
        out,
        "Current position: {}",
        scoreboard
            .get(Field::CurPosition)
            .map_or_else(|| UNKNOWN.to_owned(), FieldValue::to_string)
    );
    let _ = writeln!(out, "Nozzle temperature: {}", temperature(scoreboard, Field::NozzleTemp));
    let _ = writeln!(out, "Bed temperature: {}", temperature(scoreboard, Field::BedTemp));
    let _ = write!(out, "Box temperature: {}", temperature(scoreboard, Field::BoxTemp));

    if state == JobState::Printing {
        let elapsed = scoreboard.number(Field::PrintJobTime);
        let remaining = scoreboard.number(Field::PrintLeftTime);
        let _ = write!(
            out,
            "\nFile: {}\nProgress: {}%\nTime elapsed: {}\nTime left: {}",
            scoreboard
                .get(Field::PrintFileName)
                .map_or_else(|| UNKNOWN.to_owned(), FieldValue::to_string),
            progress_percent(elapsed.unwrap_or(0.0), remaining.unwrap_or(0.0)),
            duration(elapsed),
            duration(remaining),
        );
    }
    out
}

/// `elapsed / (elapsed + remaining) * 100`, rounded; 0 when nothing is known.
pub fn progress_percent(elapsed: f64, remaining: f64) -> u32 {
    let total = elapsed + remaining;
    if total <= 0.0 || !total.is_finite() {
        return 0;
    }
    (elapsed / total * 100.0).round().clamp(0.0, 100.0) as u32
}

fn temperature(scoreboard: &Scoreboard, field: Field) -> String {
    match scoreboard.number(field) {
        Some(celsius) => format!("{}°C", celsius.round() as i64),
        None => UNKNOWN.to_owned(),
    }
}

fn duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s >= 0.0 => {
            humantime::format_duration(Duration::from_secs(s.round() as u64)).to_string()
        }
        _ => UNKNOWN.to_owned(),
    }
}
