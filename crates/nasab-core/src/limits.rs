//! Input validation limits for records entering a store

use crate::family::FamilySnapshot;
use crate::marriage::{Marriage, NewMarriage};
use crate::person::{NewPerson, Person, PersonId};
use chrono::NaiveDate;

/// Maximum length for person names (120 chars)
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length for notes on a person or marriage (64KB)
pub const MAX_NOTES_LEN: usize = 64 * 1024;

/// Maximum records in a single snapshot import (100000)
pub const MAX_IMPORT_RECORDS: usize = 100_000;

/// Largest record id a store will accept, leaving room for the next counter value
pub const MAX_RECORD_ID: u64 = u64::MAX - 1;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    NameTooLong { len: usize, max: usize },
    NotesTooLong { len: usize, max: usize },
    DeathBeforeBirth { birth: NaiveDate, death: NaiveDate },
    SameSpouse,
    TooManyRecords { count: usize, max: usize },
    InvalidId { kind: &'static str, id: u64 },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong { len, max } => {
                write!(f, "Name too long: {} chars (max {})", len, max)
            }
            Self::NotesTooLong { len, max } => {
                write!(f, "Notes too long: {} bytes (max {})", len, max)
            }
            Self::DeathBeforeBirth { birth, death } => {
                write!(f, "Death date {} is before birth date {}", death, birth)
            }
            Self::SameSpouse => write!(f, "Husband and wife must be different people"),
            Self::TooManyRecords { count, max } => {
                write!(f, "Too many records in import: {} (max {})", count, max)
            }
            Self::InvalidId { kind, id } => {
                write!(f, "Invalid {} id {} (must be 1..={})", kind, id, MAX_RECORD_ID)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a person name
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate free-form notes
pub fn validate_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    match notes {
        Some(text) if text.len() > MAX_NOTES_LEN => Err(ValidationError::NotesTooLong {
            len: text.len(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validate that a death date does not precede the birth date
pub fn validate_dates(
    birth: Option<NaiveDate>,
    death: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (birth, death) {
        (Some(birth), Some(death)) if death < birth => {
            Err(ValidationError::DeathBeforeBirth { birth, death })
        }
        _ => Ok(()),
    }
}

pub fn validate_new_person(person: &NewPerson) -> Result<(), ValidationError> {
    validate_name(&person.name)?;
    validate_notes(person.notes.as_deref())?;
    validate_dates(person.birth_date, person.death_date)
}

pub fn validate_person(person: &Person) -> Result<(), ValidationError> {
    validate_name(&person.name)?;
    validate_notes(person.notes.as_deref())?;
    validate_dates(person.birth_date, person.death_date)
}

fn validate_spouses(
    husband: Option<PersonId>,
    wife: Option<PersonId>,
) -> Result<(), ValidationError> {
    match (husband, wife) {
        (Some(h), Some(w)) if h == w => Err(ValidationError::SameSpouse),
        _ => Ok(()),
    }
}

pub fn validate_new_marriage(marriage: &NewMarriage) -> Result<(), ValidationError> {
    validate_spouses(marriage.husband_id, marriage.wife_id)?;
    validate_notes(marriage.notes.as_deref())
}

pub fn validate_marriage(marriage: &Marriage) -> Result<(), ValidationError> {
    validate_spouses(marriage.husband_id, marriage.wife_id)?;
    validate_notes(marriage.notes.as_deref())
}

/// Validate the total record count of an import
pub fn validate_import_size(count: usize) -> Result<(), ValidationError> {
    if count > MAX_IMPORT_RECORDS {
        return Err(ValidationError::TooManyRecords {
            count,
            max: MAX_IMPORT_RECORDS,
        });
    }
    Ok(())
}

/// Validate a stored record id: positive and below the counter ceiling
pub fn validate_record_id(kind: &'static str, id: u64) -> Result<(), ValidationError> {
    if id == 0 || id > MAX_RECORD_ID {
        return Err(ValidationError::InvalidId { kind, id });
    }
    Ok(())
}

/// Validate every record of a snapshot before it is written to a store
///
/// Checks the record count, each record's fields, and every id a record
/// carries or references. Cross-record rules such as duplicate child links
/// depend on what is already stored and are left to the store.
pub fn validate_snapshot(snapshot: &FamilySnapshot) -> Result<(), ValidationError> {
    validate_import_size(
        snapshot.people.len() + snapshot.marriages.len() + snapshot.children.len(),
    )?;
    for person in &snapshot.people {
        validate_record_id("person", person.id.0)?;
        validate_person(person)?;
    }
    for marriage in &snapshot.marriages {
        validate_record_id("marriage", marriage.id.0)?;
        for spouse in marriage.husband_id.into_iter().chain(marriage.wife_id) {
            validate_record_id("person", spouse.0)?;
        }
        validate_marriage(marriage)?;
    }
    for link in &snapshot.children {
        validate_record_id("child link", link.id.0)?;
        validate_record_id("marriage", link.marriage_id.0)?;
        validate_record_id("person", link.child_id.0)?;
    }
    Ok(())
}
