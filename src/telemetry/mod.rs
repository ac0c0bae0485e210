//! Printer telemetry: the field catalogue, parsed records and the scoreboard.
//!
//! ```text
//!  WebSocket frame ──parse──▶ TelemetryRecord ──merge──▶ Scoreboard
//! ```
//!
//! The printer pushes JSON objects carrying an arbitrary subset of its
//! status fields.  Only the fields listed in [`Field`] are kept; the rest
//! are ignored at parse time.

pub mod record;
pub mod scoreboard;

pub use record::TelemetryRecord;
pub use scoreboard::Scoreboard;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field catalogue
// ---------------------------------------------------------------------------

/// Every telemetry field the watcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CurPosition,
    NozzleTemp,
    BedTemp,
    BoxTemp,
    PrintJobTime,
    PrintLeftTime,
    PrintFileName,
    PrintStartTime,
    SelfTest,
    Status,
    Fan,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::CurPosition,
        Field::NozzleTemp,
        Field::BedTemp,
        Field::BoxTemp,
        Field::PrintJobTime,
        Field::PrintLeftTime,
        Field::PrintFileName,
        Field::PrintStartTime,
        Field::SelfTest,
        Field::Status,
        Field::Fan,
    ];

    /// Fields that describe the current job; cleared when it ends.
    pub const JOB: [Field; 3] = [Field::PrintFileName, Field::PrintJobTime, Field::PrintLeftTime];

    /// Key used by the printer on the wire.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::CurPosition => "curPosition",
            Self::NozzleTemp => "nozzleTemp",
            Self::BedTemp => "bedTemp0",
            Self::BoxTemp => "boxTemp",
            Self::PrintJobTime => "printJobTime",
            Self::PrintLeftTime => "printLeftTime",
            Self::PrintFileName => "printFileName",
            Self::PrintStartTime => "printStartTime",
            Self::SelfTest => "withSelfTest",
            Self::Status => "state",
            Self::Fan => "fan",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A reported value.  The printer mixes numbers and strings freely
/// (temperatures arrive as `"210.370000"` on some firmware).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric view.  Text is parsed if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Non-zero number or non-empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
        }
    }

    /// True when the value is numerically equal to `target`.
    pub fn equals(&self, target: f64) -> bool {
        self.as_f64() == Some(target)
    }
}

impl core::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_wire(field.wire_name()), Some(field));
        }
        assert_eq!(Field::from_wire("model"), None);
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(FieldValue::from("210.370000").as_f64(), Some(210.37));
        assert_eq!(FieldValue::from("X:1 Y:2").as_f64(), None);
        assert_eq!(FieldValue::Number(f64::NAN).as_f64(), None);
    }

    #[test]
    fn truthiness_matches_printer_semantics() {
        assert!(FieldValue::Number(1_700_000_000.0).is_truthy());
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(FieldValue::from("part.gcode").is_truthy());
        assert!(!FieldValue::from("").is_truthy());
    }

    #[test]
    fn equals_compares_numerically() {
        assert!(FieldValue::Number(100.0).equals(100.0));
        assert!(FieldValue::from("4").equals(4.0));
        assert!(!FieldValue::Number(99.0).equals(100.0));
    }
}
