//! One parsed status payload from the printer stream.

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use super::{Field, FieldValue};
use crate::error::TelemetryParseError;

/// Key the printer sets on the greeting frame it sends right after connect.
const HANDSHAKE_KEY: &str = "connect";

/// A partial telemetry update.
///
/// Each known field is either absent (not in the payload), reported as the
/// unset sentinel (`null`: the printer did not report it this tick), or
/// reported with a value.  Only the last kind overwrites the scoreboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryRecord {
    fields: BTreeMap<Field, Option<FieldValue>>,
    handshake: bool,
}

impl TelemetryRecord {
    /// An empty record.  Merging it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one text frame.  Unknown keys are ignored.
    pub fn parse(payload: &str) -> Result<Self, TelemetryParseError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| TelemetryParseError::InvalidJson(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(TelemetryParseError::NotAnObject);
        };

        let mut record = Self::new();
        for (key, raw) in &map {
            if key == HANDSHAKE_KEY {
                record.handshake = json_truthy(raw);
                continue;
            }
            let Some(field) = Field::from_wire(key) else {
                continue;
            };
            match raw {
                Value::Null => {
                    record.fields.insert(field, None);
                }
                Value::Number(n) => {
                    if let Some(n) = n.as_f64() {
                        record.fields.insert(field, Some(FieldValue::Number(n)));
                    }
                }
                Value::String(s) => {
                    record.fields.insert(field, Some(FieldValue::Text(s.clone())));
                }
                Value::Bool(b) => {
                    let n = if *b { 1.0 } else { 0.0 };
                    record.fields.insert(field, Some(FieldValue::Number(n)));
                }
                Value::Array(_) | Value::Object(_) => {
                    debug!("telemetry: ignoring structured value for {}", field);
                }
            }
        }
        Ok(record)
    }

    /// Parse a binary frame (UTF-8 JSON).
    pub fn parse_bytes(payload: &[u8]) -> Result<Self, TelemetryParseError> {
        let text = core::str::from_utf8(payload).map_err(|_| TelemetryParseError::NotUtf8)?;
        Self::parse(text)
    }

    /// Builder: report `field` with `value`.
    #[must_use]
    pub fn with(mut self, field: Field, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field, Some(value.into()));
        self
    }

    /// Builder: report `field` as the unset sentinel.
    #[must_use]
    pub fn with_unset(mut self, field: Field) -> Self {
        self.fields.insert(field, None);
        self
    }

    /// Builder: mark as the greeting frame.
    #[must_use]
    pub fn as_handshake(mut self) -> Self {
        self.handshake = true;
        self
    }

    /// The reported value of `field`, if present and not the sentinel.
    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field).and_then(Option::as_ref)
    }

    /// Whether the key appeared at all (including as the sentinel).
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Every field reported with a real value.
    pub fn reported(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.fields
            .iter()
            .filter_map(|(field, value)| value.as_ref().map(|v| (*field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Greeting frames update the scoreboard but never drive job transitions.
    pub fn is_handshake(&self) -> bool {
        self.handshake
    }
}

fn json_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
