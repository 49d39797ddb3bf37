//! Development data for an empty history

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::entities::reading::Reading;
use crate::services::classification::classify;

/// Days back from now, with systolic, diastolic and pulse
const SAMPLE_DATA: [(i64, i32, i32, i32); 12] = [
    (100, 125, 83, 70),
    (95, 120, 79, 68),
    (45, 133, 86, 74),
    (35, 128, 82, 71),
    (25, 142, 91, 78),
    (15, 138, 87, 76),
    (10, 126, 83, 72),
    (8, 121, 79, 69),
    (6, 118, 78, 65),
    (5, 122, 81, 70),
    (3, 135, 88, 75),
    (1, 141, 90, 76),
];

/// Hours between generated readings on the same day
const GENERATED_SPACING_HOURS: i64 = 4;

/// The fixed twelve-reading data set, spread over the 100 days before `now`,
/// oldest first and classified
pub fn sample_readings(now: DateTime<Utc>) -> Vec<Reading> {
    SAMPLE_DATA
        .iter()
        .map(|&(days_ago, systolic, diastolic, pulse)| {
            classified(now - Duration::days(days_ago), systolic, diastolic, pulse)
        })
        .collect()
}

/// Random history covering the `days` days before `now`.
///
/// Each day gets one to three readings, four hours apart starting at the
/// day's offset from `now`. Values are drawn from a mildly elevated band:
/// systolic 110-149, diastolic 70-89, pulse 60-89.
pub fn generate_readings<R: Rng + ?Sized>(now: DateTime<Utc>, days: u32, rng: &mut R) -> Vec<Reading> {
    let start = now - Duration::days(i64::from(days));
    let mut readings = Vec::new();

    for day in 0..i64::from(days) {
        let per_day: i64 = rng.gen_range(1..=3);

        for slot in 0..per_day {
            let timestamp =
                start + Duration::days(day) + Duration::hours(slot * GENERATED_SPACING_HOURS);
            let systolic = rng.gen_range(110..150);
            let diastolic = rng.gen_range(70..90);
            let pulse = rng.gen_range(60..90);

            readings.push(classified(timestamp, systolic, diastolic, pulse));
        }
    }

    readings
}

fn classified(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32, pulse: i32) -> Reading {
    Reading::new(timestamp, systolic, diastolic, pulse)
        .with_classification(classify(systolic, diastolic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::entities::category::BpCategory;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 20, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_sample_readings() {
        let readings = sample_readings(now());

        assert_eq!(readings.len(), 12);
        assert_eq!(readings[0].timestamp, now() - Duration::days(100));
        assert_eq!(readings[11].timestamp, now() - Duration::days(1));
        assert!(readings.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
        assert!(readings.iter().all(|r| r.id.is_none()));
    }

    #[test]
    fn test_sample_labels_follow_classifier() {
        let readings = sample_readings(now());

        // 120/79 is elevated and 128/82 is stage 1, whatever a hand label says
        assert_eq!(readings[1].category(), Some(BpCategory::Elevated));
        assert_eq!(readings[3].category(), Some(BpCategory::Hypertension1));
        assert_eq!(readings[11].category(), Some(BpCategory::Hypertension2));
        for reading in &readings {
            assert_eq!(reading.category(), Some(classify(reading.systolic, reading.diastolic)));
        }
    }

    #[test]
    fn test_generated_readings_stay_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let readings = generate_readings(now(), 60, &mut rng);

        assert!(readings.len() >= 60 && readings.len() <= 180);
        for reading in &readings {
            assert!((110..150).contains(&reading.systolic));
            assert!((70..90).contains(&reading.diastolic));
            assert!((60..90).contains(&reading.pulse));
            assert!(reading.timestamp >= now() - Duration::days(60));
            assert!(reading.timestamp < now());
            assert_eq!(reading.category(), Some(classify(reading.systolic, reading.diastolic)));
        }
    }

    #[test]
    fn test_generated_readings_are_four_hours_apart_within_a_day() {
        let mut rng = StdRng::seed_from_u64(42);
        let start = now() - Duration::days(10);
        let readings = generate_readings(now(), 10, &mut rng);

        for reading in &readings {
            let offset = reading.timestamp - start;
            let within_day = offset - Duration::days(offset.num_days());
            assert_eq!(within_day.num_minutes() % (GENERATED_SPACING_HOURS * 60), 0);
            assert!(within_day < Duration::hours(12));
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let first = generate_readings(now(), 30, &mut StdRng::seed_from_u64(1));
        let second = generate_readings(now(), 30, &mut StdRng::seed_from_u64(1));
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_days_is_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(generate_readings(now(), 0, &mut rng).is_empty());
    }
}
