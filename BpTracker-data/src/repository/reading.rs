use std::future::Future;
use std::time::Duration;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::reading::{NewReadingRecord, RangeSummary, ReadingRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;

/// Default time a single store query may take
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Repository trait for the reading history.
///
/// This is the whole surface the domain layer needs from a store: a way to
/// add readings, ask for the latest one, and sum up a time range, plus the
/// maintenance operations used for cleanup and seeding.
#[async_trait]
pub trait ReadingRepositoryTrait: Send + Sync {
    /// Store a new reading and return it with its assigned id
    async fn insert(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError>;

    /// Get the reading with the latest timestamp, if any
    async fn most_recent(&self) -> Result<Option<ReadingRecord>, RepositoryError>;

    /// Sum the readings with `start <= timestamp < end`; `None` start is unbounded
    async fn range_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: DateTime<Utc>,
    ) -> Result<RangeSummary, RepositoryError>;

    /// Get all readings, newest first
    async fn get_all(&self) -> Result<Vec<ReadingRecord>, RepositoryError>;

    /// Delete one reading; `NoRows` when the id is unknown
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// Delete every reading, returning how many were removed
    async fn clear(&self) -> Result<usize, RepositoryError>;

    /// Delete readings strictly before the instant
    async fn delete_before(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError>;

    /// Delete readings strictly after the instant
    async fn delete_after(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError>;

    /// Store many readings at once; all or nothing
    async fn seed(&self, readings: Vec<NewReadingRecord>) -> Result<usize, RepositoryError>;
}

/// Store adapter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on a single store query
    pub query_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Repository for blood pressure readings backed by in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct ReadingRepository {
    storage: InMemoryStorage,
    config: StoreConfig,
}

impl ReadingRepository {
    /// Create a new repository
    pub fn new(config: StoreConfig) -> Self {
        Self {
            storage: InMemoryStorage::new(),
            config,
        }
    }

    /// Run a store operation under the configured query timeout
    async fn timed<T, F>(&self, operation: &'static str, query: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>> + Send,
    {
        match tokio::time::timeout(self.config.query_timeout, query).await {
            Ok(result) => {
                if let Err(e) = &result {
                    if !e.is_no_rows() {
                        error!(operation, "Store operation failed: {}", e);
                    }
                }
                result
            }
            Err(_) => {
                error!(operation, timeout = ?self.config.query_timeout, "Store operation timed out");
                Err(RepositoryError::Timeout(self.config.query_timeout))
            }
        }
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn insert(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        debug!("Storing blood pressure reading taken at {}", reading.timestamp);
        self.timed("insert", self.storage.store_reading(reading)).await
    }

    async fn most_recent(&self) -> Result<Option<ReadingRecord>, RepositoryError> {
        debug!("Getting most recent blood pressure reading");
        self.timed("most_recent", self.storage.most_recent()).await
    }

    async fn range_summary(
        &self,
        start: Option<DateTime<Utc>>,
        end: DateTime<Utc>,
    ) -> Result<RangeSummary, RepositoryError> {
        debug!(?start, %end, "Summarizing blood pressure readings");
        self.timed("range_summary", self.storage.summarize(start, end)).await
    }

    async fn get_all(&self) -> Result<Vec<ReadingRecord>, RepositoryError> {
        debug!("Getting all blood pressure readings");
        self.timed("get_all", self.storage.get_all()).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        debug!("Deleting blood pressure reading {}", id);
        self.timed("delete", self.storage.delete(&id)).await?;
        info!("Deleted blood pressure reading {}", id);
        Ok(())
    }

    async fn clear(&self) -> Result<usize, RepositoryError> {
        let removed = self.timed("clear", self.storage.delete_matching(|_| true)).await?;
        info!("Cleared {} blood pressure readings", removed);
        Ok(removed)
    }

    async fn delete_before(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let removed = self
            .timed("delete_before", self.storage.delete_matching(|r| r.timestamp < instant))
            .await?;
        info!("Deleted {} readings before {}", removed, instant);
        Ok(removed)
    }

    async fn delete_after(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let removed = self
            .timed("delete_after", self.storage.delete_matching(|r| r.timestamp > instant))
            .await?;
        info!("Deleted {} readings after {}", removed, instant);
        Ok(removed)
    }

    async fn seed(&self, readings: Vec<NewReadingRecord>) -> Result<usize, RepositoryError> {
        let seeded = self.timed("seed", self.storage.store_many(readings)).await?;
        info!("Seeded {} blood pressure readings", seeded);
        Ok(seeded)
    }
}

/// Mock reading repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock implementation of ReadingRepositoryTrait for testing.
    ///
    /// Keeps readings in a plain vector and can be told to fail specific
    /// queries, so callers can check how store failures propagate.
    #[derive(Default)]
    pub struct MockReadingRepository {
        readings: Mutex<Vec<ReadingRecord>>,
        fail_insert: bool,
        fail_most_recent: bool,
        fail_range_summary: bool,
        no_rows_range_summary: bool,
        range_summary_calls: AtomicUsize,
    }

    impl MockReadingRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<ReadingRecord>) -> Self {
            Self {
                readings: Mutex::new(readings),
                ..Self::default()
            }
        }

        /// Configure the mock to fail inserts
        pub fn with_insert_failure(mut self) -> Self {
            self.fail_insert = true;
            self
        }

        /// Configure the mock to fail the latest-reading query
        pub fn with_most_recent_failure(mut self) -> Self {
            self.fail_most_recent = true;
            self
        }

        /// Configure the mock to fail every range query
        pub fn with_range_summary_failure(mut self) -> Self {
            self.fail_range_summary = true;
            self
        }

        /// Configure range queries to answer `NoRows` instead of a summary
        pub fn with_range_summary_no_rows(mut self) -> Self {
            self.no_rows_range_summary = true;
            self
        }

        /// Number of range queries answered so far
        pub fn range_summary_calls(&self) -> usize {
            self.range_summary_calls.load(Ordering::SeqCst)
        }

        /// Snapshot of the stored readings
        pub fn stored(&self) -> Vec<ReadingRecord> {
            self.readings.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReadingRepositoryTrait for MockReadingRepository {
        async fn insert(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
            if self.fail_insert {
                return Err(RepositoryError::Query("mock insert failure".to_string()));
            }
            let record = reading.into_record(Uuid::new_v4());
            self.readings.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn most_recent(&self) -> Result<Option<ReadingRecord>, RepositoryError> {
            if self.fail_most_recent {
                return Err(RepositoryError::Query("mock most_recent failure".to_string()));
            }
            let latest = self.readings.lock().unwrap().iter()
                .max_by_key(|r| r.timestamp)
                .cloned();
            Ok(latest)
        }

        async fn range_summary(
            &self,
            start: Option<DateTime<Utc>>,
            end: DateTime<Utc>,
        ) -> Result<RangeSummary, RepositoryError> {
            self.range_summary_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_range_summary {
                return Err(RepositoryError::Query("mock range_summary failure".to_string()));
            }
            if self.no_rows_range_summary {
                return Err(RepositoryError::NoRows("mock range_summary".to_string()));
            }

            let mut summary = RangeSummary::default();
            for r in self.readings.lock().unwrap().iter() {
                let after_start = start.map_or(true, |s| r.timestamp >= s);
                if after_start && r.timestamp < end {
                    summary.record(r.systolic, r.diastolic, r.pulse);
                }
            }
            Ok(summary)
        }

        async fn get_all(&self) -> Result<Vec<ReadingRecord>, RepositoryError> {
            let mut readings = self.stored();
            readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(readings)
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            let mut readings = self.readings.lock().unwrap();
            let before = readings.len();
            readings.retain(|r| r.id != id);
            if readings.len() == before {
                return Err(RepositoryError::NoRows(format!("no reading found with id {}", id)));
            }
            Ok(())
        }

        async fn clear(&self) -> Result<usize, RepositoryError> {
            let mut readings = self.readings.lock().unwrap();
            let removed = readings.len();
            readings.clear();
            Ok(removed)
        }

        async fn delete_before(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError> {
            let mut readings = self.readings.lock().unwrap();
            let before = readings.len();
            readings.retain(|r| r.timestamp >= instant);
            Ok(before - readings.len())
        }

        async fn delete_after(&self, instant: DateTime<Utc>) -> Result<usize, RepositoryError> {
            let mut readings = self.readings.lock().unwrap();
            let before = readings.len();
            readings.retain(|r| r.timestamp <= instant);
            Ok(before - readings.len())
        }

        async fn seed(&self, readings: Vec<NewReadingRecord>) -> Result<usize, RepositoryError> {
            if self.fail_insert {
                return Err(RepositoryError::Query("mock seed failure".to_string()));
            }
            let count = readings.len();
            let mut stored = self.readings.lock().unwrap();
            stored.extend(readings.into_iter().map(|r| r.into_record(Uuid::new_v4())));
            Ok(count)
        }
    }
}
