//! Error types for Nasab Core

use crate::child::ChildLinkId;
use crate::limits::ValidationError;
use crate::marriage::MarriageId;
use crate::person::PersonId;
use thiserror::Error;

/// Result type alias using Nasab's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Nasab error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    #[error("Marriage not found: {0}")]
    MarriageNotFound(MarriageId),

    #[error("Child link not found: {0}")]
    ChildLinkNotFound(ChildLinkId),

    #[error("Person {child} is already a child of marriage {marriage}")]
    DuplicateChild {
        marriage: MarriageId,
        child: PersonId,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Traversal cancelled")]
    Cancelled,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
