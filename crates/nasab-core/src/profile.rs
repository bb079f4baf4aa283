//! Immediate family of one person

use crate::error::{Error, Result};
use crate::family::FamilySnapshot;
use crate::gender::Gender;
use crate::person::PersonId;
use serde::{Deserialize, Serialize};

/// A person reference with the display name resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relative {
    pub id: PersonId,
    pub name: String,
    pub gender: Gender,
}

/// Parents, siblings, spouses and children of a person
///
/// Lists keep discovery order (marriages and child links in id order) and
/// hold each person once. Ids that do not resolve to a recorded person are
/// left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativesProfile {
    pub person: Relative,
    pub parents: Vec<Relative>,
    pub siblings: Vec<Relative>,
    pub spouses: Vec<Relative>,
    pub children: Vec<Relative>,
}

impl RelativesProfile {
    pub fn for_person(snapshot: &FamilySnapshot, id: PersonId) -> Result<Self> {
        let person = snapshot.person(id).ok_or(Error::PersonNotFound(id))?;

        let ordered = snapshot.in_id_order();

        let mut parents = Collector::new(snapshot, Some(id));
        let mut siblings = Collector::new(snapshot, Some(id));
        let mut spouses = Collector::new(snapshot, Some(id));
        let mut children = Collector::new(snapshot, Some(id));

        for marriage in ordered.parent_marriages(id) {
            for parent in marriage.spouses() {
                parents.push(parent);
            }
            for link in ordered.children_of(marriage.id) {
                siblings.push(link.child_id);
            }
        }

        for marriage in ordered.marriages_of(id) {
            if let Some(partner) = marriage.partner_of(id) {
                spouses.push(partner);
            }
            for link in ordered.children_of(marriage.id) {
                children.push(link.child_id);
            }
        }

        Ok(Self {
            person: Relative {
                id,
                name: person.name.clone(),
                gender: person.gender,
            },
            parents: parents.finish(),
            siblings: siblings.finish(),
            spouses: spouses.finish(),
            children: children.finish(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
            && self.siblings.is_empty()
            && self.spouses.is_empty()
            && self.children.is_empty()
    }
}

/// Deduplicating, order-preserving list of resolved relatives
struct Collector<'a> {
    snapshot: &'a FamilySnapshot,
    exclude: Option<PersonId>,
    items: Vec<Relative>,
}

impl<'a> Collector<'a> {
    fn new(snapshot: &'a FamilySnapshot, exclude: Option<PersonId>) -> Self {
        Self {
            snapshot,
            exclude,
            items: Vec::new(),
        }
    }

    fn push(&mut self, id: PersonId) {
        if self.exclude == Some(id) || self.items.iter().any(|r| r.id == id) {
            return;
        }
        if let Some(person) = self.snapshot.person(id) {
            self.items.push(Relative {
                id,
                name: person.name.clone(),
                gender: person.gender,
            });
        }
    }

    fn finish(self) -> Vec<Relative> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildLink;
    use crate::marriage::Marriage;
    use crate::person::Person;

    fn ids(relatives: &[Relative]) -> Vec<u64> {
        relatives.iter().map(|r| r.id.get()).collect()
    }

    fn family() -> FamilySnapshot {
        FamilySnapshot::new()
            .with_people(vec![
                Person::new(1, "Abdullah", Gender::Male),
                Person::new(2, "Aminah", Gender::Female),
                Person::new(3, "Hamzah", Gender::Male),
                Person::new(4, "Safiyyah", Gender::Female),
                Person::new(5, "Khadijah", Gender::Female),
                Person::new(6, "Saudah", Gender::Female),
                Person::new(7, "Qasim", Gender::Male),
                Person::new(8, "Fatimah", Gender::Female),
            ])
            .with_marriages(vec![
                Marriage::couple(1, PersonId(1), PersonId(2)),
                Marriage::couple(2, PersonId(3), PersonId(5)),
                Marriage::couple(3, PersonId(3), PersonId(6)),
            ])
            .with_children(vec![
                ChildLink::new(1, 1, 3),
                ChildLink::new(2, 1, 4),
                ChildLink::new(3, 2, 7),
                ChildLink::new(4, 2, 8),
                ChildLink::new(5, 3, 8),
            ])
    }

    #[test]
    fn test_full_profile() {
        let profile = RelativesProfile::for_person(&family(), PersonId(3)).unwrap();

        assert_eq!(profile.person.name, "Hamzah");
        assert_eq!(ids(&profile.parents), vec![1, 2]);
        assert_eq!(ids(&profile.siblings), vec![4]);
        assert_eq!(ids(&profile.spouses), vec![5, 6]);
        // Fatimah is listed under both marriages but appears once
        assert_eq!(ids(&profile.children), vec![7, 8]);
    }

    #[test]
    fn test_profile_of_leaf() {
        let profile = RelativesProfile::for_person(&family(), PersonId(7)).unwrap();

        assert_eq!(ids(&profile.parents), vec![3, 5]);
        assert_eq!(ids(&profile.siblings), vec![8]);
        assert!(profile.spouses.is_empty());
        assert!(profile.children.is_empty());
    }

    #[test]
    fn test_isolated_person() {
        let snapshot = FamilySnapshot::new().with_people(vec![Person::new(1, "Solo", Gender::Male)]);
        let profile = RelativesProfile::for_person(&snapshot, PersonId(1)).unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_unknown_person() {
        let err = RelativesProfile::for_person(&family(), PersonId(99)).unwrap_err();
        assert!(matches!(err, Error::PersonNotFound(PersonId(99))));
    }
}
