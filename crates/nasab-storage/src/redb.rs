//! ReDB storage backend

use crate::error::{StorageError, StorageResult};
use crate::migration::Migratable;
use crate::traits::StorageBackend;
use async_trait::async_trait;
use nasab_core::limits;
use nasab_core::{
    ChildLink, ChildLinkId, FamilySnapshot, Marriage, MarriageId, NewMarriage, NewPerson, Person,
    PersonId,
};
use redb::{
    Database, ReadTransaction, ReadableTable, Table, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

type RecordTable = TableDefinition<'static, u64, &'static [u8]>;

// Table definitions
const PEOPLE: RecordTable = TableDefinition::new("people");
const MARRIAGES: RecordTable = TableDefinition::new("marriages");
const CHILDREN: RecordTable = TableDefinition::new("children");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const NEXT_PERSON_KEY: &str = "next_person";
const NEXT_MARRIAGE_KEY: &str = "next_marriage";
const NEXT_CHILD_KEY: &str = "next_child";

/// ReDB storage backend
///
/// Records are stored as JSON keyed by their numeric id. Id counters and the
/// schema version live in the `meta` table.
pub struct RedbStorage {
    db: Mutex<Database>,
}

impl RedbStorage {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Mutex::new(db) };
        storage.migrate_to_latest()?;
        Ok(storage)
    }

    fn db(&self) -> StorageResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|e| StorageError::Database(e.to_string()))
    }

    /// Run `f` in a write transaction, committing only if it succeeds
    fn write<T>(&self, f: impl FnOnce(&WriteTransaction) -> StorageResult<T>) -> StorageResult<T> {
        let db = self.db()?;
        let txn = db.begin_write()?;
        let out = f(&txn)?;
        txn.commit()?;
        Ok(out)
    }

    fn read<T>(&self, f: impl FnOnce(&ReadTransaction) -> StorageResult<T>) -> StorageResult<T> {
        let db = self.db()?;
        let txn = db.begin_read()?;
        f(&txn)
    }

    fn get_record<R: DeserializeOwned>(&self, def: RecordTable, id: u64) -> StorageResult<Option<R>> {
        self.read(|txn| {
            let table = txn.open_table(def)?;
            let value = table.get(id)?;
            let record = match value {
                Some(bytes) => Some(serde_json::from_slice(bytes.value())?),
                None => None,
            };
            Ok(record)
        })
    }

    fn list_records<R: DeserializeOwned>(&self, def: RecordTable) -> StorageResult<Vec<R>> {
        self.read(|txn| {
            let table = txn.open_table(def)?;
            decode_all(&table)
        })
    }
}

fn decode_all<R, T>(table: &T) -> StorageResult<Vec<R>>
where
    R: DeserializeOwned,
    T: ReadableTable<u64, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

fn contains<T: ReadableTable<u64, &'static [u8]>>(table: &T, id: u64) -> StorageResult<bool> {
    let value = table.get(id)?;
    Ok(value.is_some())
}

fn put<R: Serialize>(table: &mut Table<'_, u64, &'static [u8]>, id: u64, record: &R) -> StorageResult<()> {
    let bytes = serde_json::to_vec(record)?;
    table.insert(id, bytes.as_slice())?;
    Ok(())
}

fn counter_kind(key: &str) -> &'static str {
    match key {
        NEXT_PERSON_KEY => "person",
        NEXT_MARRIAGE_KEY => "marriage",
        _ => "child link",
    }
}

/// Take the next id for `key`, starting at 1
fn allocate(meta: &mut Table<'_, &'static str, u64>, key: &str) -> StorageResult<u64> {
    let current = meta.get(key)?.map(|v| v.value());
    let next = current.unwrap_or(1);
    limits::validate_record_id(counter_kind(key), next)?;
    meta.insert(key, next + 1)?;
    Ok(next)
}

/// Make sure the counter for `key` will hand out ids above `used`
fn advance(meta: &mut Table<'_, &'static str, u64>, key: &str, used: u64) -> StorageResult<()> {
    let current = meta.get(key)?.map(|v| v.value());
    let next = used
        .checked_add(1)
        .ok_or(limits::ValidationError::InvalidId {
            kind: counter_kind(key),
            id: used,
        })?;
    if current.unwrap_or(1) < next {
        meta.insert(key, next)?;
    }
    Ok(())
}

fn check_spouses(
    people: &Table<'_, u64, &'static [u8]>,
    husband: Option<PersonId>,
    wife: Option<PersonId>,
) -> StorageResult<()> {
    for id in husband.into_iter().chain(wife) {
        if !contains(people, id.0)? {
            return Err(StorageError::PersonNotFound(id));
        }
    }
    Ok(())
}

impl Migratable for RedbStorage {
    fn get_schema_version(&self) -> StorageResult<u32> {
        // The meta table may not exist yet on a fresh file
        self.write(|txn| {
            let meta = txn.open_table(META)?;
            let version = meta.get(SCHEMA_VERSION_KEY)?.map(|v| v.value());
            Ok(version.unwrap_or(0) as u32)
        })
    }

    fn set_schema_version(&self, version: u32) -> StorageResult<()> {
        self.write(|txn| {
            let mut meta = txn.open_table(META)?;
            meta.insert(SCHEMA_VERSION_KEY, u64::from(version))?;
            Ok(())
        })
    }

    fn run_migration(&self, version: u32) -> StorageResult<()> {
        match version {
            1 => self.write(|txn| {
                txn.open_table(PEOPLE)?;
                txn.open_table(MARRIAGES)?;
                txn.open_table(CHILDREN)?;
                txn.open_table(META)?;
                Ok(())
            }),
            other => Err(StorageError::Migration(format!(
                "Unknown schema version {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl StorageBackend for RedbStorage {
    async fn initialize(&self) -> StorageResult<()> {
        self.migrate_to_latest()
    }

    async fn close(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> StorageResult<bool> {
        self.read(|txn| {
            txn.open_table(META)?;
            Ok(true)
        })
    }

    async fn insert_person(&self, person: NewPerson) -> StorageResult<Person> {
        limits::validate_new_person(&person)?;
        self.write(|txn| {
            let mut meta = txn.open_table(META)?;
            let mut people = txn.open_table(PEOPLE)?;
            let id = allocate(&mut meta, NEXT_PERSON_KEY)?;
            let person = person.into_person(PersonId(id));
            put(&mut people, id, &person)?;
            Ok(person)
        })
    }

    async fn update_person(&self, person: &Person) -> StorageResult<()> {
        limits::validate_person(person)?;
        self.write(|txn| {
            let mut people = txn.open_table(PEOPLE)?;
            if !contains(&people, person.id.0)? {
                return Err(StorageError::PersonNotFound(person.id));
            }
            put(&mut people, person.id.0, person)
        })
    }

    async fn get_person(&self, id: PersonId) -> StorageResult<Option<Person>> {
        self.get_record(PEOPLE, id.0)
    }

    async fn list_people(&self) -> StorageResult<Vec<Person>> {
        self.list_records(PEOPLE)
    }

    async fn delete_person(&self, id: PersonId) -> StorageResult<()> {
        self.write(|txn| {
            let mut people = txn.open_table(PEOPLE)?;
            let removed = people.remove(id.0)?.is_some();
            if !removed {
                return Err(StorageError::PersonNotFound(id));
            }

            let mut children = txn.open_table(CHILDREN)?;
            let links: Vec<ChildLink> = decode_all(&children)?;
            let orphaned: Vec<ChildLink> = links.into_iter().filter(|l| l.child_id == id).collect();
            for link in &orphaned {
                children.remove(link.id.0)?;
            }

            let mut marriages = txn.open_table(MARRIAGES)?;
            let all: Vec<Marriage> = decode_all(&marriages)?;
            let mut cleared = 0;
            for mut marriage in all.into_iter().filter(|m| m.involves(id)) {
                if marriage.husband_id == Some(id) {
                    marriage.husband_id = None;
                }
                if marriage.wife_id == Some(id) {
                    marriage.wife_id = None;
                }
                put(&mut marriages, marriage.id.0, &marriage)?;
                cleared += 1;
            }

            tracing::debug!(
                "Deleted person {}: {} child links removed, {} marriages cleared",
                id,
                orphaned.len(),
                cleared
            );
            Ok(())
        })
    }

    async fn insert_marriage(&self, marriage: NewMarriage) -> StorageResult<Marriage> {
        limits::validate_new_marriage(&marriage)?;
        self.write(|txn| {
            let people = txn.open_table(PEOPLE)?;
            check_spouses(&people, marriage.husband_id, marriage.wife_id)?;

            let mut meta = txn.open_table(META)?;
            let mut marriages = txn.open_table(MARRIAGES)?;
            let id = allocate(&mut meta, NEXT_MARRIAGE_KEY)?;
            let marriage = marriage.into_marriage(MarriageId(id));
            put(&mut marriages, id, &marriage)?;
            Ok(marriage)
        })
    }

    async fn update_marriage(&self, marriage: &Marriage) -> StorageResult<()> {
        limits::validate_marriage(marriage)?;
        self.write(|txn| {
            let people = txn.open_table(PEOPLE)?;
            check_spouses(&people, marriage.husband_id, marriage.wife_id)?;

            let mut marriages = txn.open_table(MARRIAGES)?;
            if !contains(&marriages, marriage.id.0)? {
                return Err(StorageError::MarriageNotFound(marriage.id));
            }
            put(&mut marriages, marriage.id.0, marriage)
        })
    }

    async fn get_marriage(&self, id: MarriageId) -> StorageResult<Option<Marriage>> {
        self.get_record(MARRIAGES, id.0)
    }

    async fn list_marriages(&self) -> StorageResult<Vec<Marriage>> {
        self.list_records(MARRIAGES)
    }

    async fn delete_marriage(&self, id: MarriageId) -> StorageResult<()> {
        self.write(|txn| {
            let mut marriages = txn.open_table(MARRIAGES)?;
            let removed = marriages.remove(id.0)?.is_some();
            if !removed {
                return Err(StorageError::MarriageNotFound(id));
            }

            let mut children = txn.open_table(CHILDREN)?;
            let links: Vec<ChildLink> = decode_all(&children)?;
            for link in links.iter().filter(|l| l.marriage_id == id) {
                children.remove(link.id.0)?;
            }
            Ok(())
        })
    }

    async fn add_child(&self, marriage: MarriageId, child: PersonId) -> StorageResult<ChildLink> {
        self.write(|txn| {
            let marriages = txn.open_table(MARRIAGES)?;
            if !contains(&marriages, marriage.0)? {
                return Err(StorageError::MarriageNotFound(marriage));
            }
            let people = txn.open_table(PEOPLE)?;
            if !contains(&people, child.0)? {
                return Err(StorageError::PersonNotFound(child));
            }

            let mut children = txn.open_table(CHILDREN)?;
            let links: Vec<ChildLink> = decode_all(&children)?;
            if links
                .iter()
                .any(|l| l.marriage_id == marriage && l.child_id == child)
            {
                return Err(StorageError::DuplicateChild { marriage, child });
            }

            let mut meta = txn.open_table(META)?;
            let id = allocate(&mut meta, NEXT_CHILD_KEY)?;
            let link = ChildLink::new(id, marriage, child);
            put(&mut children, id, &link)?;
            Ok(link)
        })
    }

    async fn remove_child(&self, id: ChildLinkId) -> StorageResult<()> {
        self.write(|txn| {
            let mut children = txn.open_table(CHILDREN)?;
            let removed = children.remove(id.0)?.is_some();
            if removed {
                Ok(())
            } else {
                Err(StorageError::ChildLinkNotFound(id))
            }
        })
    }

    async fn list_children(&self, marriage: MarriageId) -> StorageResult<Vec<ChildLink>> {
        let links: Vec<ChildLink> = self.list_records(CHILDREN)?;
        Ok(links
            .into_iter()
            .filter(|l| l.marriage_id == marriage)
            .collect())
    }

    async fn list_child_links(&self) -> StorageResult<Vec<ChildLink>> {
        self.list_records(CHILDREN)
    }

    async fn import_snapshot(&self, snapshot: &FamilySnapshot) -> StorageResult<()> {
        limits::validate_snapshot(snapshot)?;

        self.write(|txn| {
            let mut meta = txn.open_table(META)?;
            {
                let mut people = txn.open_table(PEOPLE)?;
                for person in &snapshot.people {
                    put(&mut people, person.id.0, person)?;
                    advance(&mut meta, NEXT_PERSON_KEY, person.id.0)?;
                }
            }
            {
                let mut marriages = txn.open_table(MARRIAGES)?;
                for marriage in &snapshot.marriages {
                    put(&mut marriages, marriage.id.0, marriage)?;
                    advance(&mut meta, NEXT_MARRIAGE_KEY, marriage.id.0)?;
                }
            }
            {
                let mut children = txn.open_table(CHILDREN)?;
                let mut held: Vec<ChildLink> = decode_all(&children)?;
                for link in &snapshot.children {
                    let clash = held.iter().any(|l| {
                        l.id != link.id
                            && l.marriage_id == link.marriage_id
                            && l.child_id == link.child_id
                    });
                    if clash {
                        return Err(StorageError::DuplicateChild {
                            marriage: link.marriage_id,
                            child: link.child_id,
                        });
                    }
                    held.retain(|l| l.id != link.id);
                    held.push(*link);
                    put(&mut children, link.id.0, link)?;
                    advance(&mut meta, NEXT_CHILD_KEY, link.id.0)?;
                }
            }
            Ok(())
        })?;

        tracing::debug!(
            "Batch imported {} people, {} marriages, {} child links in single transaction",
            snapshot.people.len(),
            snapshot.marriages.len(),
            snapshot.children.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CURRENT_VERSION;
    use nasab_core::Gender;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_redb_storage() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        let storage = RedbStorage::open(&db_path).unwrap();
        storage.initialize().await.unwrap();
        assert!(storage.health_check().await.unwrap());

        let person = storage
            .insert_person(NewPerson::new("Hajar", Gender::Female))
            .await
            .unwrap();
        assert_eq!(person.id, PersonId(1));

        let retrieved = storage.get_person(person.id).await.unwrap();
        assert_eq!(retrieved.unwrap().name, "Hajar");

        storage.delete_person(person.id).await.unwrap();
        assert!(storage.get_person(person.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("family.redb");

        {
            let storage = RedbStorage::open(&db_path).unwrap();
            let husband = storage
                .insert_person(NewPerson::new("Ibrahim", Gender::Male))
                .await
                .unwrap();
            let wife = storage
                .insert_person(NewPerson::new("Hajar", Gender::Female))
                .await
                .unwrap();
            let child = storage
                .insert_person(NewPerson::new("Ismail", Gender::Male))
                .await
                .unwrap();
            let marriage = storage
                .insert_marriage(NewMarriage::new(Some(husband.id), Some(wife.id)))
                .await
                .unwrap();
            storage.add_child(marriage.id, child.id).await.unwrap();
        }

        let storage = RedbStorage::open(&db_path).unwrap();
        let snapshot = storage.load_snapshot().await.unwrap();
        assert_eq!(snapshot.people.len(), 3);
        assert_eq!(snapshot.marriages.len(), 1);
        assert_eq!(snapshot.children.len(), 1);

        // Counters survive the reopen
        let next = storage
            .insert_person(NewPerson::new("Ishaq", Gender::Male))
            .await
            .unwrap();
        assert_eq!(next.id, PersonId(4));
    }

    #[tokio::test]
    async fn test_duplicate_child_and_cascade() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();

        let a = storage.insert_person(NewPerson::new("A", Gender::Male)).await.unwrap();
        let b = storage.insert_person(NewPerson::new("B", Gender::Female)).await.unwrap();
        let c = storage.insert_person(NewPerson::new("C", Gender::Male)).await.unwrap();
        let marriage = storage
            .insert_marriage(NewMarriage::new(Some(a.id), Some(b.id)))
            .await
            .unwrap();

        storage.add_child(marriage.id, c.id).await.unwrap();
        let err = storage.add_child(marriage.id, c.id).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateChild { .. }));

        storage.delete_person(a.id).await.unwrap();
        let stored = storage.get_marriage(marriage.id).await.unwrap().unwrap();
        assert_eq!(stored.husband_id, None);
        assert_eq!(stored.wife_id, Some(b.id));

        storage.delete_marriage(marriage.id).await.unwrap();
        assert!(storage.list_child_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_records() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();

        let err = storage.delete_marriage(MarriageId(3)).await.unwrap_err();
        assert!(matches!(err, StorageError::MarriageNotFound(MarriageId(3))));

        let err = storage.remove_child(ChildLinkId(8)).await.unwrap_err();
        assert!(matches!(err, StorageError::ChildLinkNotFound(ChildLinkId(8))));

        let ghost = Person::new(40, "Ghost", Gender::Unknown);
        let err = storage.update_person(&ghost).await.unwrap_err();
        assert!(matches!(err, StorageError::PersonNotFound(PersonId(40))));
    }

    #[tokio::test]
    async fn test_import_snapshot() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();

        let snapshot = FamilySnapshot::new()
            .with_people(vec![
                Person::new(7, "Musa", Gender::Male),
                Person::new(9, "Safura", Gender::Female),
            ])
            .with_marriages(vec![Marriage::couple(2, PersonId(7), PersonId(9))])
            .with_children(vec![ChildLink::new(4, 2, 7)]);
        storage.import_snapshot(&snapshot).await.unwrap();

        assert_eq!(storage.load_snapshot().await.unwrap(), snapshot);

        let next = storage.insert_person(NewPerson::new("Harun", Gender::Male)).await.unwrap();
        assert_eq!(next.id, PersonId(10));
    }

    #[tokio::test]
    async fn test_import_rejects_duplicate_child_pairs() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();

        let family = FamilySnapshot::new()
            .with_people(vec![
                Person::new(1, "Musa", Gender::Male),
                Person::new(2, "Safura", Gender::Female),
                Person::new(3, "Gersom", Gender::Male),
            ])
            .with_marriages(vec![Marriage::couple(1, PersonId(1), PersonId(2))]);

        let twice = family
            .clone()
            .with_children(vec![ChildLink::new(1, 1, 3), ChildLink::new(2, 1, 3)]);
        let err = storage.import_snapshot(&twice).await.unwrap_err();
        assert!(matches!(err, StorageError::DuplicateChild { .. }));
        // The whole transaction rolled back
        assert!(storage.list_people().await.unwrap().is_empty());

        storage
            .import_snapshot(&family.with_children(vec![ChildLink::new(1, 1, 3)]))
            .await
            .unwrap();
        let merged = FamilySnapshot::new().with_children(vec![ChildLink::new(5, 1, 3)]);
        let err = storage.import_snapshot(&merged).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::DuplicateChild {
                marriage: MarriageId(1),
                child: PersonId(3)
            }
        ));
        assert_eq!(storage.list_child_links().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_out_of_range_ids() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();

        let overflowing =
            FamilySnapshot::new().with_people(vec![Person::new(u64::MAX, "A", Gender::Male)]);
        let err = storage.import_snapshot(&overflowing).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let zero_link = FamilySnapshot::new().with_children(vec![ChildLink::new(0, 1, 1)]);
        assert!(storage.import_snapshot(&zero_link).await.is_err());

        // The highest legal id imports, but the counter then refuses to go further
        let highest = FamilySnapshot::new().with_people(vec![Person::new(
            limits::MAX_RECORD_ID,
            "Last",
            Gender::Male,
        )]);
        storage.import_snapshot(&highest).await.unwrap();
        let err = storage
            .insert_person(NewPerson::new("Overflow", Gender::Male))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[test]
    fn test_schema_version_set_on_open() {
        let dir = tempdir().unwrap();
        let storage = RedbStorage::open(dir.path().join("t.redb")).unwrap();
        assert_eq!(storage.get_schema_version().unwrap(), CURRENT_VERSION);
    }
}
