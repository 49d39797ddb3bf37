// BP Tracker Data
// This crate owns the reading history store used by the domain layer

// Storage models
pub mod models;

// Repository implementations for data access
pub mod repository;
