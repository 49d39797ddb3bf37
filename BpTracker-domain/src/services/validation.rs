//! Plausibility and consistency checks for a submitted triplet

use std::fmt;
use indexmap::IndexMap;
use serde::Serialize;
use validator::Validate;

use crate::entities::reading::Measurement;

// Ranges for valid blood pressure and pulse readings. The same bounds are
// declared on `Measurement`'s validation attributes.
pub const MIN_SYSTOLIC: i32 = 60;
pub const MAX_SYSTOLIC: i32 = 250;
pub const MIN_DIASTOLIC: i32 = 40;
pub const MAX_DIASTOLIC: i32 = 150;
pub const MIN_PULSE: i32 = 40;
pub const MAX_PULSE: i32 = 200;

/// Largest allowed spread (mmHg) between the three readings of a triplet
pub const MAX_READING_DIFF: i32 = 15;

/// Measurement fields in reporting order, with their label prefix
const FIELD_LABELS: [(&str, &str); 3] = [
    ("systolic", "Systolic"),
    ("diastolic", "Diastolic"),
    ("pulse", "Pulse"),
];

/// Validation failures keyed by field label, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation against a field label
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Message recorded for a field label
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// (field, message) pairs in the order found
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation errors:")?;
        for (field, message) in self.iter() {
            writeln!(f, "- {}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a triplet of measurements.
///
/// Every per-reading problem is reported. The cross-reading spread checks
/// only run once each reading is individually valid, so a bad value never
/// also shows up as an inconsistency. An empty result means the triplet
/// may be averaged.
pub fn validate(readings: &[Measurement; 3]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (index, measurement) in readings.iter().enumerate() {
        check_measurement(measurement, index + 1, &mut errors);
    }

    if errors.is_empty() {
        check_consistency(readings, &mut errors);
    }

    errors
}

fn check_measurement(measurement: &Measurement, number: usize, errors: &mut ValidationErrors) {
    if let Err(validation_errors) = measurement.validate() {
        let field_errors = validation_errors.field_errors();

        for (field, label) in FIELD_LABELS {
            if let Some(field_error) = field_errors.get(field) {
                let message = field_error
                    .iter()
                    .map(|err| match &err.message {
                        Some(msg) => msg.to_string(),
                        None => format!("invalid {}", field),
                    })
                    .collect::<Vec<String>>()
                    .join(", ");
                errors.add(format!("{} Reading {}", label, number), message);
            }
        }
    }

    if measurement.systolic <= measurement.diastolic {
        errors.add(
            format!("Reading {}", number),
            "systolic pressure must be higher than diastolic pressure",
        );
    }
}

fn check_consistency(readings: &[Measurement; 3], errors: &mut ValidationErrors) {
    let systolic = readings.map(|m| m.systolic);
    if spread(&systolic) > MAX_READING_DIFF {
        errors.add("Systolic Readings", consistency_message());
    }

    // No spread rule for pulse
    let diastolic = readings.map(|m| m.diastolic);
    if spread(&diastolic) > MAX_READING_DIFF {
        errors.add("Diastolic Readings", consistency_message());
    }
}

fn spread(values: &[i32; 3]) -> i32 {
    let max = values.iter().max().copied().unwrap_or_default();
    let min = values.iter().min().copied().unwrap_or_default();
    max - min
}

fn consistency_message() -> String {
    format!("difference between readings cannot exceed {} mmHg", MAX_READING_DIFF)
}
