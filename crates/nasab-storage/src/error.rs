//! Storage error types

use nasab_core::limits::ValidationError;
use nasab_core::{ChildLinkId, MarriageId, PersonId};
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

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

    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[cfg(feature = "redb")]
    #[error("ReDB error: {0}")]
    Redb(#[from] ::redb::Error),

    #[cfg(feature = "redb")]
    #[error("ReDB database error: {0}")]
    RedbDatabase(#[from] ::redb::DatabaseError),

    #[cfg(feature = "redb")]
    #[error("ReDB table error: {0}")]
    RedbTable(#[from] ::redb::TableError),

    #[cfg(feature = "redb")]
    #[error("ReDB storage error: {0}")]
    RedbStorage(#[from] ::redb::StorageError),

    #[cfg(feature = "redb")]
    #[error("ReDB commit error: {0}")]
    RedbCommit(#[from] ::redb::CommitError),

    #[cfg(feature = "redb")]
    #[error("ReDB transaction error: {0}")]
    RedbTransaction(#[from] ::redb::TransactionError),
}

impl From<StorageError> for nasab_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::PersonNotFound(id) => Self::PersonNotFound(id),
            StorageError::MarriageNotFound(id) => Self::MarriageNotFound(id),
            StorageError::ChildLinkNotFound(id) => Self::ChildLinkNotFound(id),
            StorageError::DuplicateChild { marriage, child } => {
                Self::DuplicateChild { marriage, child }
            }
            StorageError::Validation(err) => Self::Validation(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}
