pub mod aggregation;
pub mod classification;
pub mod readings;
pub mod seed;
pub mod statistics;
pub mod validation;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use readings::{
    create_default_reading_service, ReadingService, ReadingServiceError, ReadingServiceTrait,
    Submission,
};
pub use statistics::{compute_stats, stats_from_history, StatisticsError, Window};
pub use validation::{validate, ValidationErrors};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use crate::testing::create_mock_reading_service;
