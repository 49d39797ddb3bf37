use std::sync::Arc;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::reading::{NewReadingRecord, RangeSummary, ReadingRecord};
use super::errors::RepositoryError;

/// In-memory storage for blood pressure readings.
///
/// Readings are kept in insertion order, so among readings sharing a
/// timestamp the most recently inserted one is treated as the latest.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    readings: Arc<RwLock<Vec<ReadingRecord>>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reading in memory, assigning it a fresh id
    pub async fn store_reading(&self, reading: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let record = reading.into_record(Uuid::new_v4());
        self.readings.write().await.push(record.clone());
        Ok(record)
    }

    /// Store several readings under a single write lock, so either all of
    /// them become visible or none do
    pub async fn store_many(&self, readings: Vec<NewReadingRecord>) -> Result<usize, RepositoryError> {
        let records: Vec<ReadingRecord> = readings
            .into_iter()
            .map(|reading| reading.into_record(Uuid::new_v4()))
            .collect();
        let count = records.len();

        self.readings.write().await.extend(records);
        Ok(count)
    }

    /// Get all readings, newest first
    pub async fn get_all(&self) -> Result<Vec<ReadingRecord>, RepositoryError> {
        let store = self.readings.read().await;
        let mut readings: Vec<ReadingRecord> = store.iter().rev().cloned().collect();
        // Stable sort keeps later insertions ahead of earlier ones on ties
        readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(readings)
    }

    /// Get the reading with the latest timestamp
    pub async fn most_recent(&self) -> Result<Option<ReadingRecord>, RepositoryError> {
        let store = self.readings.read().await;
        Ok(store.iter().max_by_key(|reading| reading.timestamp).cloned())
    }

    /// Sum up the readings with `start <= timestamp < end`.
    /// A missing start means the range is unbounded below.
    pub async fn summarize(
        &self,
        start: Option<DateTime<Utc>>,
        end: DateTime<Utc>,
    ) -> Result<RangeSummary, RepositoryError> {
        let store = self.readings.read().await;
        let mut summary = RangeSummary::default();

        for reading in store.iter() {
            if start.map_or(false, |start| reading.timestamp < start) {
                continue;
            }
            if reading.timestamp >= end {
                continue;
            }
            summary.record(reading.systolic, reading.diastolic, reading.pulse);
        }

        Ok(summary)
    }

    /// Delete a reading by id
    pub async fn delete(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut store = self.readings.write().await;
        let before = store.len();
        store.retain(|reading| reading.id != *id);

        if store.len() == before {
            return Err(RepositoryError::NoRows(format!("no reading found with id {}", id)));
        }
        Ok(())
    }

    /// Delete every reading matching the predicate, returning how many went
    pub async fn delete_matching<F>(&self, predicate: F) -> Result<usize, RepositoryError>
    where
        F: Fn(&ReadingRecord) -> bool,
    {
        let mut store = self.readings.write().await;
        let before = store.len();
        store.retain(|reading| !predicate(reading));
        Ok(before - store.len())
    }
}
