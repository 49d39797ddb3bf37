// Repository module structure
pub mod errors;
mod reading;
mod in_memory;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use reading::{ReadingRepository, ReadingRepositoryTrait, StoreConfig, DEFAULT_QUERY_TIMEOUT};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use reading::tests;
