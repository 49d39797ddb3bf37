use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Unique identifier assigned by the store
    pub id: Uuid,

    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Systolic blood pressure (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Category name cached at classification time
    pub classification: String,
}

/// Input data for storing a new reading. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReadingRecord {
    /// When the reading was taken
    pub timestamp: DateTime<Utc>,

    /// Systolic blood pressure (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Category name, empty when the reading was never classified
    pub classification: String,
}

impl NewReadingRecord {
    /// Attach a store-assigned id
    pub fn into_record(self, id: Uuid) -> ReadingRecord {
        ReadingRecord {
            id,
            timestamp: self.timestamp,
            systolic: self.systolic,
            diastolic: self.diastolic,
            pulse: self.pulse,
            classification: self.classification,
        }
    }
}

/// Field sums and row count over the readings of one time range.
///
/// This is the store-side half of a window average: the store adds up what
/// falls in the range, the caller decides how to turn sums into means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSummary {
    /// Number of readings in the range
    pub count: usize,

    /// Sum of systolic values
    pub systolic_sum: i64,

    /// Sum of diastolic values
    pub diastolic_sum: i64,

    /// Sum of pulse values
    pub pulse_sum: i64,
}

impl RangeSummary {
    /// Add one reading's values to the running sums
    pub fn record(&mut self, systolic: i32, diastolic: i32, pulse: i32) {
        self.count += 1;
        self.systolic_sum += i64::from(systolic);
        self.diastolic_sum += i64::from(diastolic);
        self.pulse_sum += i64::from(pulse);
    }

    /// True when no reading fell in the range
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
