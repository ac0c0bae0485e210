//! Latest-known-value cache of telemetry fields.

use std::collections::BTreeMap;

use super::{Field, FieldValue, TelemetryRecord};

/// Last observed value per field.  Starts empty; nothing is ever required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    values: BTreeMap<Field, FieldValue>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a partial update.  Every field reported with a real value
    /// replaces the stored one; absent and sentinel fields leave it alone.
    pub fn merge(&mut self, record: &TelemetryRecord) {
        for (field, value) in record.reported() {
            self.values.insert(field, value.clone());
        }
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Numeric view of a field, see [`FieldValue::as_f64`].
    pub fn number(&self, field: Field) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_f64)
    }

    pub fn set(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.values.insert(field, value.into());
    }

    /// Remove the given fields, leaving the rest in place.
    pub fn clear(&mut self, fields: &[Field]) {
        for field in fields {
            self.values.remove(field);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

/// Functional form of [`Scoreboard::merge`].
pub fn merge(scoreboard: &Scoreboard, record: &TelemetryRecord) -> Scoreboard {
    let mut next = scoreboard.clone();
    next.merge(record);
    next
}
