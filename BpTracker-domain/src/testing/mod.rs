// Testing utilities and fixtures for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use bp_tracker_data::repository::tests::MockReadingRepository;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;
use bp_tracker_data::models::ReadingRecord;

use crate::clock::FixedClock;
use crate::entities::reading::{Measurement, ReadingInput};
use crate::services::classification::classify;
use crate::services::readings::ReadingService;

/// The instant fixtures are anchored to
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 20, 18, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A triplet that passes validation, averaging to 120/78/67
pub fn valid_triplet() -> [Measurement; 3] {
    [
        Measurement::new(118, 76, 65),
        Measurement::new(120, 78, 68),
        Measurement::new(122, 80, 70),
    ]
}

/// A submission of `valid_triplet` stamped `days_ago` days before `fixture_now`
pub fn input_days_ago(days_ago: i64) -> ReadingInput {
    let timestamp = fixture_now() - Duration::days(days_ago);
    ReadingInput::new(valid_triplet())
        .with_timestamp(timestamp.format(crate::services::aggregation::TIMESTAMP_FORMAT).to_string())
}

/// A stored, classified record
pub fn record_at(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32, pulse: i32) -> ReadingRecord {
    ReadingRecord {
        id: Uuid::new_v4(),
        timestamp,
        systolic,
        diastolic,
        pulse,
        classification: classify(systolic, diastolic).name().to_string(),
    }
}

/// Create a reading service over a mock store, pinned to `fixture_now`
pub fn create_mock_reading_service(
    repository: MockReadingRepository,
) -> ReadingService<MockReadingRepository, FixedClock> {
    ReadingService::with_clock(repository, FixedClock::new(fixture_now()))
}
