//! Rolling statistics over the reading history
//!
//! Window averages round half away from zero (`f64::round`), unlike the
//! truncating average used when a submission is reduced to one reading.

use std::fmt;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, error};

use bp_tracker_data::models::RangeSummary;
use bp_tracker_data::repository::{ReadingRepositoryTrait, RepositoryError};

use crate::clock::Clock;
use crate::entities::conversions;
use crate::entities::reading::{Reading, Stats, WindowStats};

/// Statistics errors
#[derive(Debug, Error)]
pub enum StatisticsError {
    /// The latest-reading query failed
    #[error("error getting last reading: {0}")]
    LastReading(#[source] RepositoryError),

    /// A window query failed
    #[error("error calculating {window} average: {source}")]
    Window {
        window: Window,
        #[source]
        source: RepositoryError,
    },
}

/// The three reporting windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    SevenDay,
    ThirtyDay,
    AllTime,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::SevenDay, Window::ThirtyDay, Window::AllTime];

    /// Inclusive lower bound of the window ending at `now`; `None` for all-time
    pub fn start(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Window::SevenDay => Some(now - Duration::days(7)),
            Window::ThirtyDay => Some(now - Duration::days(30)),
            Window::AllTime => None,
        }
    }

    /// Whether `timestamp` falls in `[start, now)`
    pub fn contains(self, now: DateTime<Utc>, timestamp: DateTime<Utc>) -> bool {
        let after_start = self.start(now).map_or(true, |start| timestamp >= start);
        after_start && timestamp < now
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::SevenDay => f.write_str("7-day"),
            Window::ThirtyDay => f.write_str("30-day"),
            Window::AllTime => f.write_str("all-time"),
        }
    }
}

/// Compute the latest reading and the three window averages from a store.
///
/// The clock is read once, and that instant bounds every window. The four
/// queries run concurrently; if any of them fails the whole computation
/// fails.
pub async fn compute_stats<R, C>(repository: &R, clock: &C) -> Result<Stats, StatisticsError>
where
    R: ReadingRepositoryTrait + ?Sized,
    C: Clock + ?Sized,
{
    let now = clock.now();
    debug!(%now, "Computing blood pressure statistics");

    let (last_reading, seven_day, thirty_day, all_time) = futures::try_join!(
        last_reading(repository),
        window_stats(repository, Window::SevenDay, now),
        window_stats(repository, Window::ThirtyDay, now),
        window_stats(repository, Window::AllTime, now),
    )?;

    Ok(Stats {
        last_reading,
        seven_day,
        thirty_day,
        all_time,
    })
}

/// Compute the same statistics from a history already in memory.
///
/// `history` is expected newest first, in the order
/// [`ReadingRepositoryTrait::get_all`] returns it. Among readings sharing
/// the latest timestamp the first one wins, which is the one the store
/// inserted last.
pub fn stats_from_history(history: &[Reading], now: DateTime<Utc>) -> Stats {
    let last_reading = history
        .iter()
        .reduce(|latest, reading| {
            if reading.timestamp > latest.timestamp {
                reading
            } else {
                latest
            }
        })
        .cloned();

    let summarize = |window: Window| {
        let mut summary = RangeSummary::default();
        for reading in history.iter().filter(|r| window.contains(now, r.timestamp)) {
            summary.record(reading.systolic, reading.diastolic, reading.pulse);
        }
        summarize_window(&summary, now)
    };

    Stats {
        last_reading,
        seven_day: summarize(Window::SevenDay),
        thirty_day: summarize(Window::ThirtyDay),
        all_time: summarize(Window::AllTime),
    }
}

/// Turn a range summary into a window average.
///
/// An empty range has no average at all rather than a zero-valued one. The
/// averaged reading is stamped with the window end and left unclassified.
pub fn summarize_window(summary: &RangeSummary, now: DateTime<Utc>) -> WindowStats {
    if summary.is_empty() {
        return WindowStats::empty();
    }

    let average = Reading::new(
        now,
        rounded_mean(summary.systolic_sum, summary.count),
        rounded_mean(summary.diastolic_sum, summary.count),
        rounded_mean(summary.pulse_sum, summary.count),
    );

    WindowStats {
        average: Some(average),
        count: summary.count,
    }
}

async fn last_reading<R>(repository: &R) -> Result<Option<Reading>, StatisticsError>
where
    R: ReadingRepositoryTrait + ?Sized,
{
    match repository.most_recent().await {
        Ok(record) => Ok(record.map(conversions::convert_to_domain_reading)),
        Err(e) if e.is_no_rows() => Ok(None),
        Err(e) => {
            error!("Error getting last reading: {}", e);
            Err(StatisticsError::LastReading(e))
        }
    }
}

async fn window_stats<R>(
    repository: &R,
    window: Window,
    now: DateTime<Utc>,
) -> Result<WindowStats, StatisticsError>
where
    R: ReadingRepositoryTrait + ?Sized,
{
    match repository.range_summary(window.start(now), now).await {
        Ok(summary) => Ok(summarize_window(&summary, now)),
        Err(e) if e.is_no_rows() => Ok(WindowStats::empty()),
        Err(source) => {
            error!("Error getting {} average: {}", window, source);
            Err(StatisticsError::Window { window, source })
        }
    }
}

/// Mean of `count` values summing to `sum`, rounded half away from zero
fn rounded_mean(sum: i64, count: usize) -> i32 {
    (sum as f64 / count as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_tracker_data::models::ReadingRecord;
    use bp_tracker_data::repository::tests::MockReadingRepository;
    use bp_tracker_data::repository::{ReadingRepository, StoreConfig};
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::clock::{FixedClock, MockClock};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 20, 18, 0, 0).unwrap()
    }

    fn record(timestamp: DateTime<Utc>, systolic: i32, diastolic: i32, pulse: i32) -> ReadingRecord {
        ReadingRecord {
            id: Uuid::new_v4(),
            timestamp,
            systolic,
            diastolic,
            pulse,
            classification: "Normal".to_string(),
        }
    }

    #[test]
    fn test_rounded_mean_rounds_half_away_from_zero() {
        assert_eq!(rounded_mean(241, 2), 121); // 120.5
        assert_eq!(rounded_mean(361, 3), 120); // 120.33
        assert_eq!(rounded_mean(362, 3), 121); // 120.67
        assert_eq!(rounded_mean(-241, 2), -121);
    }

    #[test]
    fn test_window_bounds() {
        let now = now();
        assert!(Window::SevenDay.contains(now, now - Duration::days(7)));
        assert!(!Window::SevenDay.contains(now, now - Duration::days(7) - Duration::seconds(1)));
        assert!(Window::SevenDay.contains(now, now - Duration::seconds(1)));
        assert!(!Window::SevenDay.contains(now, now));
        assert!(Window::AllTime.contains(now, now - Duration::days(3650)));
        assert!(!Window::AllTime.contains(now, now));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let repository = MockReadingRepository::new();
        let stats = compute_stats(&repository, &FixedClock::new(now())).await.unwrap();

        assert!(stats.last_reading.is_none());
        for window in [&stats.seven_day, &stats.thirty_day, &stats.all_time] {
            assert_eq!(window.count, 0);
            assert!(window.average.is_none());
        }
    }

    #[tokio::test]
    async fn test_single_reading_in_every_window() {
        let only = record(now() - Duration::hours(2), 124, 81, 66);
        let repository = MockReadingRepository::with_readings(vec![only.clone()]);

        let stats = compute_stats(&repository, &FixedClock::new(now())).await.unwrap();

        let last = stats.last_reading.unwrap();
        assert_eq!(last.id, Some(only.id));
        assert_eq!(last.systolic, 124);

        for window in [&stats.seven_day, &stats.thirty_day, &stats.all_time] {
            assert_eq!(window.count, 1);
            let average = window.average.as_ref().unwrap();
            assert_eq!((average.systolic, average.diastolic, average.pulse), (124, 81, 66));
            assert!(average.classification.is_none());
        }
    }

    #[tokio::test]
    async fn test_windows_select_by_age_and_round() {
        let now = now();
        let repository = MockReadingRepository::with_readings(vec![
            record(now - Duration::days(1), 120, 80, 70),
            record(now - Duration::days(3), 121, 81, 71),
            record(now - Duration::days(10), 140, 90, 80),
            record(now - Duration::days(45), 150, 95, 90),
        ]);

        let stats = compute_stats(&repository, &FixedClock::new(now)).await.unwrap();

        // 120.5 / 80.5 / 70.5 round up
        assert_eq!(stats.seven_day.count, 2);
        let seven = stats.seven_day.average.unwrap();
        assert_eq!((seven.systolic, seven.diastolic, seven.pulse), (121, 81, 71));

        // 381 / 3 = 127, 251 / 3 = 83.67, 221 / 3 = 73.67
        assert_eq!(stats.thirty_day.count, 3);
        let thirty = stats.thirty_day.average.unwrap();
        assert_eq!((thirty.systolic, thirty.diastolic, thirty.pulse), (127, 84, 74));

        // 531 / 4 = 132.75, 346 / 4 = 86.5, 311 / 4 = 77.75
        assert_eq!(stats.all_time.count, 4);
        let all = stats.all_time.average.unwrap();
        assert_eq!((all.systolic, all.diastolic, all.pulse), (133, 87, 78));

        assert_eq!(stats.last_reading.unwrap().systolic, 120);
    }

    #[tokio::test]
    async fn test_window_boundaries() {
        let now = now();
        let at_seven_day_start = record(now - Duration::days(7), 130, 85, 70);
        let at_thirty_day_start = record(now - Duration::days(30), 140, 90, 80);
        let before_thirty_day_start =
            record(now - Duration::days(30) - Duration::seconds(1), 150, 95, 90);
        let at_now = record(now, 180, 110, 100);
        let repository = MockReadingRepository::with_readings(vec![
            at_seven_day_start,
            at_thirty_day_start,
            before_thirty_day_start,
            at_now.clone(),
        ]);

        let stats = compute_stats(&repository, &FixedClock::new(now)).await.unwrap();

        // Start bounds are inclusive, end bound is exclusive
        assert_eq!(stats.seven_day.count, 1);
        assert_eq!(stats.seven_day.average.unwrap().systolic, 130);
        assert_eq!(stats.thirty_day.count, 2);
        assert_eq!(stats.thirty_day.average.unwrap().systolic, 135);
        assert_eq!(stats.all_time.count, 3);

        // The reading at `now` is still the latest reading
        assert_eq!(stats.last_reading.unwrap().id, Some(at_now.id));
    }

    #[test]
    fn test_history_tie_prefers_first_in_newest_first_order() {
        let now = now();
        let taken = now - Duration::hours(6);
        let later_insert = Reading::new(taken, 140, 90, 70);
        let earlier_insert = Reading::new(taken, 120, 80, 70);
        let older = Reading::new(now - Duration::days(1), 110, 70, 60);

        let stats = stats_from_history(&[later_insert.clone(), earlier_insert, older], now);

        assert_eq!(stats.last_reading, Some(later_insert));
    }

    #[tokio::test]
    async fn test_reading_after_captured_now_is_excluded() {
        let now = now();
        let repository = MockReadingRepository::with_readings(vec![
            record(now + Duration::seconds(1), 120, 80, 70),
        ]);

        let stats = compute_stats(&repository, &FixedClock::new(now)).await.unwrap();

        assert_eq!(stats.all_time.count, 0);
        assert!(stats.all_time.average.is_none());
        assert!(stats.last_reading.is_some());
    }

    #[tokio::test]
    async fn test_window_failure_fails_whole_computation() {
        let repository = MockReadingRepository::with_readings(vec![
            record(now() - Duration::days(1), 120, 80, 70),
        ])
        .with_range_summary_failure();

        let error = compute_stats(&repository, &FixedClock::new(now())).await.unwrap_err();
        assert!(matches!(error, StatisticsError::Window { .. }));
        assert!(error.to_string().contains("average"));
    }

    #[tokio::test]
    async fn test_last_reading_failure_fails_whole_computation() {
        let repository = MockReadingRepository::new().with_most_recent_failure();

        let error = compute_stats(&repository, &FixedClock::new(now())).await.unwrap_err();
        assert!(matches!(error, StatisticsError::LastReading(RepositoryError::Query(_))));
    }

    #[tokio::test]
    async fn test_no_rows_window_is_empty_not_an_error() {
        let repository = MockReadingRepository::new().with_range_summary_no_rows();

        let stats = compute_stats(&repository, &FixedClock::new(now())).await.unwrap();
        assert_eq!(stats.thirty_day, WindowStats::empty());
    }

    #[tokio::test]
    async fn test_clock_is_read_once() {
        let mut clock = MockClock::new();
        clock.expect_now().times(1).returning(now);

        let repository = MockReadingRepository::with_readings(vec![
            record(now() - Duration::days(2), 120, 80, 70),
        ]);

        let stats = compute_stats(&repository, &clock).await.unwrap();
        assert_eq!(repository.range_summary_calls(), 3);
        assert_eq!(stats.seven_day.average.unwrap().timestamp, now());
    }

    #[tokio::test]
    async fn test_store_and_in_memory_history_agree() {
        let now = now();
        let readings: Vec<Reading> = (0..40i64)
            .map(|day| {
                Reading::new(
                    now - Duration::days(day) - Duration::hours(3),
                    110 + day as i32,
                    70 + (day % 7) as i32,
                    60 + (day % 11) as i32,
                )
            })
            .collect();

        let repository = ReadingRepository::new(StoreConfig::default());
        for reading in &readings {
            repository
                .insert(conversions::convert_to_data_new_record(reading))
                .await
                .unwrap();
        }

        let from_store = compute_stats(&repository, &FixedClock::new(now)).await.unwrap();
        let from_history = stats_from_history(&readings, now);

        assert_eq!(from_store.seven_day, from_history.seven_day);
        assert_eq!(from_store.thirty_day, from_history.thirty_day);
        assert_eq!(from_store.all_time, from_history.all_time);
        assert_eq!(
            from_store.last_reading.map(|r| r.timestamp),
            from_history.last_reading.map(|r| r.timestamp)
        );
    }
}
