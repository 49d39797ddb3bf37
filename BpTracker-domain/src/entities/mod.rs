// Domain entities and value objects
pub mod category;
pub mod conversions;
pub mod reading;

// Re-export common types for easier imports
pub use category::{BpCategory, CategoryDetails, RiskLevel};
pub use reading::{Measurement, Reading, ReadingInput, Stats, WindowStats};
