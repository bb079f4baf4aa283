//! Search error types

use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Search-specific error types
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Query error: {0}")]
    Query(String),

    #[error("Search mode not available: {0}")]
    Unsupported(String),
}

impl From<SearchError> for nasab_core::Error {
    fn from(err: SearchError) -> Self {
        Self::Search(err.to_string())
    }
}
