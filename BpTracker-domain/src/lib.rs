// BP Tracker Domain
// This crate contains the business logic for the blood pressure tracker

// Source of the current time
pub mod clock;

// Environment configuration
pub mod config;

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Logging setup
pub mod telemetry;

// Re-export the repository module from bp_tracker_data for convenience
pub use bp_tracker_data::repository;

// Testing utilities - only available in tests or with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
