//! Parent-child links

use crate::marriage::MarriageId;
use crate::person::PersonId;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a child link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChildLinkId(pub u64);

impl From<u64> for ChildLinkId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ChildLinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attaches a child to the marriage that produced them
///
/// `(marriage_id, child_id)` is unique; the owning store rejects duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub id: ChildLinkId,
    pub marriage_id: MarriageId,
    pub child_id: PersonId,
}

impl ChildLink {
    pub fn new(
        id: impl Into<ChildLinkId>,
        marriage_id: impl Into<MarriageId>,
        child_id: impl Into<PersonId>,
    ) -> Self {
        Self {
            id: id.into(),
            marriage_id: marriage_id.into(),
            child_id: child_id.into(),
        }
    }
}
