//! Marriage records

use crate::layout::Port;
use crate::person::PersonId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a marriage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarriageId(pub u64);

impl MarriageId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for MarriageId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MarriageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A marriage between up to two people
///
/// Either spouse may be absent. A marriage with no spouse at all is kept as
/// a record but contributes nothing to the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marriage {
    /// Unique identifier
    pub id: MarriageId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub husband_id: Option<PersonId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wife_id: Option<PersonId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Marriage {
    pub fn new(
        id: impl Into<MarriageId>,
        husband_id: Option<PersonId>,
        wife_id: Option<PersonId>,
    ) -> Self {
        Self {
            id: id.into(),
            husband_id,
            wife_id,
            marriage_date: None,
            notes: None,
        }
    }

    /// Marriage with both spouses present
    pub fn couple(id: impl Into<MarriageId>, husband: PersonId, wife: PersonId) -> Self {
        Self::new(id, Some(husband), Some(wife))
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.marriage_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Present spouse ids, husband first
    pub fn spouses(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.husband_id.into_iter().chain(self.wife_id)
    }

    pub fn involves(&self, person: PersonId) -> bool {
        self.husband_id == Some(person) || self.wife_id == Some(person)
    }

    /// The other spouse, if `person` is one of them and the other is recorded
    pub fn partner_of(&self, person: PersonId) -> Option<PersonId> {
        if self.husband_id == Some(person) {
            self.wife_id
        } else if self.wife_id == Some(person) {
            self.husband_id
        } else {
            None
        }
    }

    /// Which row of the marriage node `person` occupies
    pub fn port_of(&self, person: PersonId) -> Option<Port> {
        if self.husband_id == Some(person) {
            Some(Port::Husband)
        } else if self.wife_id == Some(person) {
            Some(Port::Wife)
        } else {
            None
        }
    }
}

/// Data for creating a new marriage (the store assigns the id)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMarriage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub husband_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wife_id: Option<PersonId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marriage_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewMarriage {
    pub fn new(husband_id: Option<PersonId>, wife_id: Option<PersonId>) -> Self {
        Self {
            husband_id,
            wife_id,
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.marriage_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn into_marriage(self, id: MarriageId) -> Marriage {
        Marriage {
            id,
            husband_id: self.husband_id,
            wife_id: self.wife_id,
            marriage_date: self.marriage_date,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spouses_order() {
        let marriage = Marriage::couple(1, PersonId(10), PersonId(20));
        let spouses: Vec<_> = marriage.spouses().collect();
        assert_eq!(spouses, vec![PersonId(10), PersonId(20)]);
    }

    #[test]
    fn test_partial_marriage() {
        let marriage = Marriage::new(2, None, Some(PersonId(5)));

        assert_eq!(marriage.spouses().count(), 1);
        assert!(marriage.involves(PersonId(5)));
        assert_eq!(marriage.partner_of(PersonId(5)), None);
        assert_eq!(marriage.port_of(PersonId(5)), Some(Port::Wife));
    }

    #[test]
    fn test_partner_of() {
        let marriage = Marriage::couple(3, PersonId(1), PersonId(2));

        assert_eq!(marriage.partner_of(PersonId(1)), Some(PersonId(2)));
        assert_eq!(marriage.partner_of(PersonId(2)), Some(PersonId(1)));
        assert_eq!(marriage.partner_of(PersonId(9)), None);
    }
}
