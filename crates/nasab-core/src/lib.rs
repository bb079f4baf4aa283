//! Nasab Core - Kinship graph engine
//!
//! This crate provides the genealogical record types, the relationship graph
//! built from them, shortest-path kinship resolution and the family-tree
//! layout model consumed by renderers.

pub mod child;
pub mod error;
pub mod family;
pub mod gender;
pub mod kinship;
pub mod layout;
pub mod limits;
pub mod marriage;
pub mod person;
pub mod profile;
pub mod query;
pub mod style;

pub use child::{ChildLink, ChildLinkId};
pub use error::{Error, Result};
pub use family::FamilySnapshot;
pub use gender::{Gender, GenderAliases};
pub use kinship::{
    build_graph, find_relationship, mahram_relatives, KinshipPath, RelationshipGraph,
    MAHRAM_MAX_DISTANCE,
};
pub use layout::{
    build_layout, LayoutEdge, LayoutNode, LayoutNodeId, NodeCell, NodeKind, Port, RankGroup,
    TreeLayout, TreeLayoutBuilder,
};
pub use marriage::{Marriage, MarriageId, NewMarriage};
pub use person::{NewPerson, Person, PersonId};
pub use profile::{Relative, RelativesProfile};
pub use query::{PaginatedResults, Pagination, PaginationInfo, PersonQuery, SearchMode};
pub use style::LayoutStyle;
