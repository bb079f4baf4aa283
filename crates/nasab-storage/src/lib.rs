//! Nasab Storage - Storage backends for family records
//!
//! This crate provides the storage trait and its backends for persisting
//! people, marriages and child links.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod migration;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use migration::{migration_for, Migratable, SchemaVersion, CURRENT_VERSION, MIGRATIONS};
pub use traits::StorageBackend;

#[cfg(feature = "redb")]
pub use redb::RedbStorage;

pub use memory::MemoryStorage;
