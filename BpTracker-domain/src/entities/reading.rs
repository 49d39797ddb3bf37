use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use super::category::BpCategory;

/// One clinical data point: the representative reading of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Identifier assigned by the store, absent before persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Systolic blood pressure in mmHg
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Category name, set once the reading has been classified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

impl Reading {
    /// Create an unpersisted, unclassified reading
    pub fn new(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32, pulse: i32) -> Self {
        Self {
            id: None,
            timestamp,
            systolic,
            diastolic,
            pulse,
            classification: None,
        }
    }

    /// Cache the category label on the reading
    pub fn with_classification(mut self, category: BpCategory) -> Self {
        self.classification = Some(category.name().to_string());
        self
    }

    /// Category cached on the reading, if it names a known one
    pub fn category(&self) -> Option<BpCategory> {
        self.classification.as_deref().and_then(BpCategory::from_name)
    }
}

/// One raw (systolic, diastolic, pulse) measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Measurement {
    /// Systolic blood pressure in mmHg
    #[validate(range(min = 60, max = 250, message = "must be between 60 and 250"))]
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg
    #[validate(range(min = 40, max = 150, message = "must be between 40 and 150"))]
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    #[validate(range(min = 40, max = 200, message = "must be between 40 and 200"))]
    pub pulse: i32,
}

impl Measurement {
    pub const fn new(systolic: i32, diastolic: i32, pulse: i32) -> Self {
        Self { systolic, diastolic, pulse }
    }
}

/// Submission payload: three consecutive measurements and an optional
/// timestamp in `YYYY-MM-DD HH:MM:SS` form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingInput {
    /// Caller-supplied timestamp; unparseable values fall back to now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// The triplet, in the order taken
    pub readings: [Measurement; 3],
}

impl ReadingInput {
    /// Create an input without a timestamp
    pub fn new(readings: [Measurement; 3]) -> Self {
        Self { timestamp: None, readings }
    }

    /// Attach a caller-supplied timestamp
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Average and sample count for one time window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Rounded mean reading; absent when the window is empty
    pub average: Option<Reading>,

    /// Number of readings in the window
    pub count: usize,
}

impl WindowStats {
    /// A window with no readings
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Snapshot of the reading history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Latest reading; absent when the history is empty
    pub last_reading: Option<Reading>,

    /// Readings in the last 7 days
    pub seven_day: WindowStats,

    /// Readings in the last 30 days
    pub thirty_day: WindowStats,

    /// Every reading up to now
    pub all_time: WindowStats,
}
