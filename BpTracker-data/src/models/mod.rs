// Storage models for the reading history
pub mod reading;

pub use reading::{NewReadingRecord, RangeSummary, ReadingRecord};
