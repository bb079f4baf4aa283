//! Storage backend trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use nasab_core::{
    ChildLink, ChildLinkId, FamilySnapshot, Marriage, MarriageId, NewMarriage, NewPerson, Person,
    PersonId,
};

/// Trait for storage backend implementations
///
/// Ids are allocated by the backend from per-kind counters starting at 1.
/// Listing methods return records in ascending id order.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Close the storage connection
    async fn close(&self) -> StorageResult<()>;

    /// Health check
    async fn health_check(&self) -> StorageResult<bool>;

    // ─────────────────────────────────────────────────────────────────────────
    // Person Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and store a new person
    async fn insert_person(&self, person: NewPerson) -> StorageResult<Person>;

    /// Replace an existing person record
    async fn update_person(&self, person: &Person) -> StorageResult<()>;

    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>>;

    async fn list_people(&self) -> StorageResult<Vec<Person>>;

    /// Delete a person, their child links, and their spouse slots
    async fn delete_person(&self, id: PersonId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Marriage Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_marriage(&self, marriage: NewMarriage) -> StorageResult<Marriage>;

    async fn update_marriage(&self, marriage: &Marriage) -> StorageResult<()>;

    async fn get_marriage(&self, id: MarriageId) -> StorageResult<Option<Marriage>>;

    async fn list_marriages(&self) -> StorageResult<Vec<Marriage>>;

    /// Delete a marriage and every child link it owns
    async fn delete_marriage(&self, id: MarriageId) -> StorageResult<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Child Link Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record `child` as a child of `marriage`
    async fn add_child(&self, marriage: MarriageId, child: PersonId) -> StorageResult<ChildLink>;

    async fn remove_child(&self, id: ChildLinkId) -> StorageResult<()>;

    /// Child links owned by one marriage
    async fn list_children(&self, marriage: MarriageId) -> StorageResult<Vec<ChildLink>>;

    async fn list_child_links(&self) -> StorageResult<Vec<ChildLink>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load every record as one snapshot
    async fn load_snapshot(&self) -> StorageResult<FamilySnapshot> {
        let people = self.list_people().await?;
        let marriages = self.list_marriages().await?;
        let children = self.list_child_links().await?;
        Ok(FamilySnapshot {
            people,
            marriages,
            children,
        })
    }

    /// Write a snapshot keeping its ids, overwriting records with the same id
    ///
    /// Id counters are advanced past the largest imported id.
    async fn import_snapshot(&self, snapshot: &FamilySnapshot) -> StorageResult<()>;
}
