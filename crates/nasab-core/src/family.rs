//! Immutable snapshot of the three record collections

use crate::child::ChildLink;
use crate::marriage::{Marriage, MarriageId};
use crate::person::{Person, PersonId};
use serde::{Deserialize, Serialize};

/// People, marriages and child links captured together
///
/// Every core operation takes a snapshot by reference. The caller is
/// responsible for capturing the three collections consistently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySnapshot {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub marriages: Vec<Marriage>,
    #[serde(default)]
    pub children: Vec<ChildLink>,
}

impl FamilySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_people(mut self, people: Vec<Person>) -> Self {
        self.people = people;
        self
    }

    pub fn with_marriages(mut self, marriages: Vec<Marriage>) -> Self {
        self.marriages = marriages;
        self
    }

    pub fn with_children(mut self, children: Vec<ChildLink>) -> Self {
        self.children = children;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.marriages.is_empty() && self.children.is_empty()
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    pub fn marriage(&self, id: MarriageId) -> Option<&Marriage> {
        self.marriages.iter().find(|m| m.id == id)
    }

    /// Copy with every record list sorted by id
    ///
    /// The lookup helpers below iterate in list order, so walking an ordered
    /// copy gives results that do not depend on how the snapshot was loaded.
    pub fn in_id_order(&self) -> FamilySnapshot {
        let mut ordered = self.clone();
        ordered.people.sort_by_key(|p| p.id);
        ordered.marriages.sort_by_key(|m| m.id);
        ordered.children.sort_by_key(|l| l.id);
        ordered
    }

    /// Child links owned by a marriage
    pub fn children_of(&self, marriage: MarriageId) -> impl Iterator<Item = &ChildLink> + '_ {
        self.children
            .iter()
            .filter(move |link| link.marriage_id == marriage)
    }

    /// Marriages that list `child` as one of their children
    pub fn parent_marriages(&self, child: PersonId) -> impl Iterator<Item = &Marriage> + '_ {
        self.children
            .iter()
            .filter(move |link| link.child_id == child)
            .filter_map(move |link| self.marriage(link.marriage_id))
    }

    /// Marriages in which `person` is a spouse
    pub fn marriages_of(&self, person: PersonId) -> impl Iterator<Item = &Marriage> + '_ {
        self.marriages.iter().filter(move |m| m.involves(person))
    }

    /// Display name for a person id, `#<id>` if the person is not recorded
    pub fn name_of(&self, id: PersonId) -> String {
        self.person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gender::Gender;

    fn sample() -> FamilySnapshot {
        FamilySnapshot::new()
            .with_people(vec![
                Person::new(1, "Ahmad", Gender::Male),
                Person::new(2, "Fatimah", Gender::Female),
                Person::new(3, "Hasan", Gender::Male),
            ])
            .with_marriages(vec![Marriage::couple(1, PersonId(1), PersonId(2))])
            .with_children(vec![ChildLink::new(1, 1, 3)])
    }

    #[test]
    fn test_snapshot_builder() {
        let snapshot = FamilySnapshot::new().with_people(vec![]).with_marriages(vec![]);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_lookups() {
        let snapshot = sample();

        assert_eq!(snapshot.children_of(MarriageId(1)).count(), 1);
        assert_eq!(snapshot.parent_marriages(PersonId(3)).count(), 1);
        assert_eq!(snapshot.marriages_of(PersonId(2)).count(), 1);
        assert_eq!(snapshot.marriages_of(PersonId(3)).count(), 0);
    }

    #[test]
    fn test_in_id_order() {
        let mut shuffled = sample();
        shuffled.people.reverse();
        shuffled
            .children
            .push(ChildLink::new(0, 1, 2));
        shuffled.children.reverse();

        let ordered = shuffled.in_id_order();
        let people: Vec<u64> = ordered.people.iter().map(|p| p.id.0).collect();
        assert_eq!(people, vec![1, 2, 3]);
        let links: Vec<u64> = ordered.children_of(MarriageId(1)).map(|l| l.id.0).collect();
        assert_eq!(links, vec![0, 1]);
    }

    #[test]
    fn test_name_of_unknown() {
        let snapshot = sample();
        assert_eq!(snapshot.name_of(PersonId(1)), "Ahmad");
        assert_eq!(snapshot.name_of(PersonId(99)), "#99");
    }
}
