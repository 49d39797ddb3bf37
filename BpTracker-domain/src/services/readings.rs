use thiserror::Error;
use tracing::{info, instrument, warn};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use rand::RngCore;
use async_trait::async_trait;

use bp_tracker_data::repository::{ReadingRepository, ReadingRepositoryTrait, RepositoryError};

use crate::clock::{Clock, SystemClock};
use crate::config::{TrackerConfig, DEFAULT_SEED_DAYS};
use crate::entities::category::BpCategory;
use crate::entities::conversions;
use crate::entities::reading::{Reading, ReadingInput, Stats};
use crate::services::aggregation::{self, TIMESTAMP_FORMAT};
use crate::services::classification::{classify, recommend};
use crate::services::seed::generate_readings;
use crate::services::statistics::{compute_stats, StatisticsError};
use crate::services::validation::{validate, ValidationErrors};

/// Date format accepted by the cleanup operations
pub const CLEANUP_DATE_FORMAT: &str = "%Y-%m-%d";

/// Reading service errors
#[derive(Debug, Error)]
pub enum ReadingServiceError {
    /// The submitted triplet failed validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// A malformed id or date
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Not found error
    #[error("Reading not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[source] RepositoryError),

    /// Statistics could not be computed
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
}

/// Map repository errors to service errors
fn map_repo_error(err: RepositoryError) -> ReadingServiceError {
    match err {
        RepositoryError::NoRows(msg) => ReadingServiceError::NotFound(msg),
        other => ReadingServiceError::Repository(other),
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    /// The stored, classified reading
    pub reading: Reading,

    pub category: BpCategory,

    pub recommendation: String,

    /// Statistics recomputed after the insert
    pub stats: Stats,
}

/// Trait for reading service operations
#[async_trait]
pub trait ReadingServiceTrait: Send + Sync {
    /// Validate a submission without storing anything
    fn validate_input(&self, input: &ReadingInput) -> Result<(), ReadingServiceError>;

    /// Validate, average, classify and store a submission, then report the
    /// refreshed statistics
    async fn submit(&self, input: ReadingInput) -> Result<Submission, ReadingServiceError>;

    /// Latest reading and window averages as of now
    async fn stats(&self) -> Result<Stats, ReadingServiceError>;

    /// Every stored reading, newest first
    async fn all_readings(&self) -> Result<Vec<Reading>, ReadingServiceError>;

    /// Delete one reading by id
    async fn delete_reading(&self, id: &str) -> Result<(), ReadingServiceError>;

    /// Delete every reading
    async fn clear(&self) -> Result<usize, ReadingServiceError>;

    /// Delete readings strictly before a `YYYY-MM-DD` date (midnight UTC)
    async fn delete_before(&self, date: &str) -> Result<usize, ReadingServiceError>;

    /// Delete readings strictly after a `YYYY-MM-DD` date (midnight UTC)
    async fn delete_after(&self, date: &str) -> Result<usize, ReadingServiceError>;

    /// Store many readings at once, classifying each one
    async fn seed(&self, readings: Vec<Reading>) -> Result<usize, ReadingServiceError>;

    /// Generate and store random history for the configured number of days
    /// before now
    async fn seed_generated(&self, rng: &mut (dyn RngCore + Send)) -> Result<usize, ReadingServiceError>;
}

/// Implementation of the reading service
pub struct ReadingService<R, C = SystemClock> {
    repository: R,
    clock: C,
    seed_days: u32,
}

impl<R: ReadingRepositoryTrait> ReadingService<R> {
    /// Create a new reading service on the wall clock
    pub fn new(repository: R) -> Self {
        Self::with_clock(repository, SystemClock)
    }
}

impl<R: ReadingRepositoryTrait, C: Clock> ReadingService<R, C> {
    /// Create a new reading service reading time from `clock`
    pub fn with_clock(repository: R, clock: C) -> Self {
        Self {
            repository,
            clock,
            seed_days: DEFAULT_SEED_DAYS,
        }
    }

    /// Days of history `seed_generated` covers
    pub fn with_seed_days(mut self, seed_days: u32) -> Self {
        self.seed_days = seed_days;
        self
    }

    /// The underlying store
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

#[async_trait]
impl<R, C> ReadingServiceTrait for ReadingService<R, C>
where
    R: ReadingRepositoryTrait,
    C: Clock,
{
    fn validate_input(&self, input: &ReadingInput) -> Result<(), ReadingServiceError> {
        let errors = validate(&input.readings);
        if errors.is_empty() {
            Ok(())
        } else {
            warn!("Rejected submission with {} validation errors", errors.len());
            Err(ReadingServiceError::Validation(errors))
        }
    }

    #[instrument(skip(self, input))]
    async fn submit(&self, input: ReadingInput) -> Result<Submission, ReadingServiceError> {
        self.validate_input(&input)?;

        let average = aggregation::average(&input.readings, input.timestamp.as_deref(), &self.clock);
        let category = classify(average.systolic, average.diastolic);
        let average = average.with_classification(category);

        let record = self
            .repository
            .insert(conversions::convert_to_data_new_record(&average))
            .await
            .map_err(map_repo_error)?;
        let reading = conversions::convert_to_domain_reading(record);
        info!(
            systolic = reading.systolic,
            diastolic = reading.diastolic,
            pulse = reading.pulse,
            "Stored {} reading",
            category
        );

        // The reading stays stored even when the refresh fails
        let stats = self.stats().await?;

        Ok(Submission {
            reading,
            category,
            recommendation: recommend(category).to_string(),
            stats,
        })
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> Result<Stats, ReadingServiceError> {
        Ok(compute_stats(&self.repository, &self.clock).await?)
    }

    #[instrument(skip(self))]
    async fn all_readings(&self) -> Result<Vec<Reading>, ReadingServiceError> {
        let records = self.repository.get_all().await.map_err(map_repo_error)?;

        Ok(records
            .into_iter()
            .map(conversions::convert_to_domain_reading)
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_reading(&self, id: &str) -> Result<(), ReadingServiceError> {
        let id = conversions::parse_string_to_uuid(id).map_err(ReadingServiceError::InvalidRequest)?;
        self.repository.delete(id).await.map_err(map_repo_error)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<usize, ReadingServiceError> {
        self.repository.clear().await.map_err(map_repo_error)
    }

    #[instrument(skip(self))]
    async fn delete_before(&self, date: &str) -> Result<usize, ReadingServiceError> {
        let instant = parse_cleanup_date(date)?;
        self.repository.delete_before(instant).await.map_err(map_repo_error)
    }

    #[instrument(skip(self))]
    async fn delete_after(&self, date: &str) -> Result<usize, ReadingServiceError> {
        let instant = parse_cleanup_date(date)?;
        self.repository.delete_after(instant).await.map_err(map_repo_error)
    }

    #[instrument(skip(self, readings), fields(count = readings.len()))]
    async fn seed(&self, readings: Vec<Reading>) -> Result<usize, ReadingServiceError> {
        let records = readings
            .into_iter()
            .map(|reading| {
                let category = classify(reading.systolic, reading.diastolic);
                conversions::convert_to_data_new_record(&reading.with_classification(category))
            })
            .collect();

        self.repository.seed(records).await.map_err(map_repo_error)
    }

    #[instrument(skip(self, rng), fields(days = self.seed_days))]
    async fn seed_generated(&self, rng: &mut (dyn RngCore + Send)) -> Result<usize, ReadingServiceError> {
        let readings = generate_readings(self.clock.now(), self.seed_days, rng);
        let seeded = self.seed(readings).await?;
        info!("Generated {} readings over {} days", seeded, self.seed_days);
        Ok(seeded)
    }
}

/// Parse a cleanup cutoff: a `YYYY-MM-DD` date means midnight UTC, and a
/// full `YYYY-MM-DD HH:MM:SS` timestamp is taken as is
pub fn parse_cleanup_date(raw: &str) -> Result<DateTime<Utc>, ReadingServiceError> {
    let raw = raw.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(raw, CLEANUP_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            ReadingServiceError::InvalidRequest(format!(
                "Invalid date format: {}. Use YYYY-MM-DD",
                raw
            ))
        })
}

/// Create a reading service backed by the in-memory store
pub fn create_default_reading_service(config: &TrackerConfig) -> impl ReadingServiceTrait {
    ReadingService::new(ReadingRepository::new(config.store_config())).with_seed_days(config.seed_days)
}
