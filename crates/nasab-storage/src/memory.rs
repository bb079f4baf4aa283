//! In-memory storage backend for testing

use crate::error::{StorageError, StorageResult};
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nasab_core::limits;
use nasab_core::{
    ChildLink, ChildLinkId, FamilySnapshot, Marriage, MarriageId, NewMarriage, NewPerson, Person,
    PersonId,
};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    people: BTreeMap<PersonId, Person>,
    marriages: BTreeMap<MarriageId, Marriage>,
    children: BTreeMap<ChildLinkId, ChildLink>,
    next_person: u64,
    next_marriage: u64,
    next_child: u64,
}

impl Tables {
    fn new() -> Self {
        Self {
            next_person: 1,
            next_marriage: 1,
            next_child: 1,
            ..Default::default()
        }
    }

    fn check_spouses(&self, husband: Option<PersonId>, wife: Option<PersonId>) -> StorageResult<()> {
        for id in husband.into_iter().chain(wife) {
            if !self.people.contains_key(&id) {
                return Err(StorageError::PersonNotFound(id));
            }
        }
        Ok(())
    }

    /// Reject a link whose (marriage, child) pair is already held by another link id
    fn check_unique_link(&self, link: &ChildLink) -> StorageResult<()> {
        let clash = self.children.values().any(|l| {
            l.id != link.id && l.marriage_id == link.marriage_id && l.child_id == link.child_id
        });
        if clash {
            return Err(StorageError::DuplicateChild {
                marriage: link.marriage_id,
                child: link.child_id,
            });
        }
        Ok(())
    }
}

/// Hand out the counter's value and move it on by one
fn take_id(counter: &mut u64, kind: &'static str) -> StorageResult<u64> {
    let id = *counter;
    limits::validate_record_id(kind, id)?;
    *counter = id + 1;
    Ok(id)
}

/// Keep the counter above an id written by an import
fn bump_past(counter: &mut u64, used: u64, kind: &'static str) -> StorageResult<()> {
    let next = used
        .checked_add(1)
        .ok_or(limits::ValidationError::InvalidId { kind, id: used })?;
    *counter = (*counter).max(next);
    Ok(())
}

/// In-memory storage backend
///
/// Useful for testing and temporary storage.
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StorageError::Database(format!("Lock error: {}", e)))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        Ok(true)
    }

    // Person operations

    async fn insert_person(&self, person: NewPerson) -> StorageResult<Person> {
        limits::validate_new_person(&person)?;
        let mut tables = self.write()?;
        let id = PersonId(take_id(&mut tables.next_person, "person")?);
        let person = person.into_person(id);
        tables.people.insert(id, person.clone());
        Ok(person)
    }

    async fn update_person(&self, person: &Person) -> StorageResult<()> {
        limits::validate_person(person)?;
        let mut tables = self.write()?;
        match tables.people.get_mut(&person.id) {
            Some(existing) => {
                *existing = person.clone();
                Ok(())
            }
            None => Err(StorageError::PersonNotFound(person.id)),
        }
    }

    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        Ok(self.read()?.people.get(&id).cloned())
    }

    async fn list_people(&self) -> StorageResult<Vec<Person>> {
        Ok(self.read()?.people.values().cloned().collect())
    }

    async fn delete_person(&self, id: PersonId) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.people.remove(&id).is_none() {
            return Err(StorageError::PersonNotFound(id));
        }
        tables.children.retain(|_, link| link.child_id != id);
        for marriage in tables.marriages.values_mut() {
            if marriage.husband_id == Some(id) {
                marriage.husband_id = None;
            }
            if marriage.wife_id == Some(id) {
                marriage.wife_id = None;
            }
        }
        Ok(())
    }

    // Marriage operations

    async fn insert_marriage(&self, marriage: NewMarriage) -> StorageResult<Marriage> {
        limits::validate_new_marriage(&marriage)?;
        let mut tables = self.write()?;
        tables.check_spouses(marriage.husband_id, marriage.wife_id)?;
        let id = MarriageId(take_id(&mut tables.next_marriage, "marriage")?);
        let marriage = marriage.into_marriage(id);
        tables.marriages.insert(id, marriage.clone());
        Ok(marriage)
    }

    async fn update_marriage(&self, marriage: &Marriage) -> StorageResult<()> {
        limits::validate_marriage(marriage)?;
        let mut tables = self.write()?;
        tables.check_spouses(marriage.husband_id, marriage.wife_id)?;
        match tables.marriages.get_mut(&marriage.id) {
            Some(existing) => {
                *existing = marriage.clone();
                Ok(())
            }
            None => Err(StorageError::MarriageNotFound(marriage.id)),
        }
    }

    async fn get_marriage(&self, id: MarriageId) -> StorageResult<Option<Marriage>> {
        Ok(self.read()?.marriages.get(&id).cloned())
    }

    async fn list_marriages(&self) -> StorageResult<Vec<Marriage>> {
        Ok(self.read()?.marriages.values().cloned().collect())
    }

    async fn delete_marriage(&self, id: MarriageId) -> StorageResult<()> {
        let mut tables = self.write()?;
        if tables.marriages.remove(&id).is_none() {
            return Err(StorageError::MarriageNotFound(id));
        }
        tables.children.retain(|_, link| link.marriage_id != id);
        Ok(())
    }

    // Child link operations

    async fn add_child(&self, marriage: MarriageId, child: PersonId) -> StorageResult<ChildLink> {
        let mut tables = self.write()?;
        if !tables.marriages.contains_key(&marriage) {
            return Err(StorageError::MarriageNotFound(marriage));
        }
        if !tables.people.contains_key(&child) {
            return Err(StorageError::PersonNotFound(child));
        }
        if tables
            .children
            .values()
            .any(|l| l.marriage_id == marriage && l.child_id == child)
        {
            return Err(StorageError::DuplicateChild { marriage, child });
        }

        let id = ChildLinkId(take_id(&mut tables.next_child, "child link")?);
        let link = ChildLink::new(id, marriage, child);
        tables.children.insert(id, link);
        Ok(link)
    }

    async fn remove_child(&self, id: ChildLinkId) -> StorageResult<()> {
        let mut tables = self.write()?;
        tables
            .children
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::ChildLinkNotFound(id))
    }

    async fn list_children(&self, marriage: MarriageId) -> StorageResult<Vec<ChildLink>> {
        Ok(self
            .read()?
            .children
            .values()
            .filter(|l| l.marriage_id == marriage)
            .copied()
            .collect())
    }

    async fn list_child_links(&self) -> StorageResult<Vec<ChildLink>> {
        Ok(self.read()?.children.values().copied().collect())
    }

    // Bulk operations

    async fn import_snapshot(&self, snapshot: &FamilySnapshot) -> StorageResult<()> {
        limits::validate_snapshot(snapshot)?;

        let mut tables = self.write()?;
        // Checked against a scratch copy so a rejected import leaves the store untouched
        let mut staged = Tables {
            children: tables.children.clone(),
            ..Tables::new()
        };
        for link in &snapshot.children {
            staged.check_unique_link(link)?;
            staged.children.insert(link.id, *link);
        }

        for person in &snapshot.people {
            bump_past(&mut tables.next_person, person.id.0, "person")?;
            tables.people.insert(person.id, person.clone());
        }
        for marriage in &snapshot.marriages {
            bump_past(&mut tables.next_marriage, marriage.id.0, "marriage")?;
            tables.marriages.insert(marriage.id, marriage.clone());
        }
        for link in &snapshot.children {
            bump_past(&mut tables.next_child, link.id.0, "child link")?;
        }
        tables.children = staged.children;

        tracing::debug!(
            "Imported {} people, {} marriages, {} child links",
            snapshot.people.len(),
            snapshot.marriages.len(),
            snapshot.children.len()
        );
        Ok(())
    }
}
