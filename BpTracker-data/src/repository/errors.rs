use std::time::Duration;
use thiserror::Error;

/// Error type for repository operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The query ran but matched nothing it was required to match
    #[error("No rows: {0}")]
    NoRows(String),

    /// The store could not answer the query
    #[error("Query failed: {0}")]
    Query(String),

    /// The store did not answer within the configured timeout
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

impl RepositoryError {
    /// True for the "nothing matched" case, as opposed to a failed query
    pub fn is_no_rows(&self) -> bool {
        matches!(self, RepositoryError::NoRows(_))
    }
}

impl From<String> for RepositoryError {
    fn from(error: String) -> Self {
        RepositoryError::Query(error)
    }
}
