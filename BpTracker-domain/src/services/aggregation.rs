use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeZone, Utc};
use tracing::warn;

use crate::clock::Clock;
use crate::entities::reading::{Measurement, Reading};

/// Format accepted for caller-supplied timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reduce a validated triplet to one reading.
///
/// Each field is the sum of the three values divided by three with integer
/// truncation, so (120 + 121 + 123) / 3 is 121. The reading is left
/// unclassified. A missing or unparseable timestamp falls back to the
/// clock's current time.
pub fn average<C>(readings: &[Measurement; 3], timestamp: Option<&str>, clock: &C) -> Reading
where
    C: Clock + ?Sized,
{
    let timestamp = parse_timestamp(timestamp).unwrap_or_else(|| clock.now().trunc_subsecs(0));

    Reading::new(
        timestamp,
        truncated_mean(readings.map(|m| m.systolic)),
        truncated_mean(readings.map(|m| m.diastolic)),
        truncated_mean(readings.map(|m| m.pulse)),
    )
}

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp as UTC.
/// Empty or malformed input yields `None`.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }

    match NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        Ok(naive) => Some(Utc.from_utc_datetime(&naive)),
        Err(e) => {
            warn!("Ignoring unparseable timestamp {:?}: {}", raw, e);
            None
        }
    }
}

fn truncated_mean(values: [i32; 3]) -> i32 {
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    // The quotient of three i32 values by 3 always fits back into i32
    (sum / 3) as i32
}
