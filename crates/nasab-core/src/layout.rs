//! Family-tree diagram model
//!
//! A couple is drawn as one marriage node with a husband row and a wife row.
//! Edges run from a marriage node to each child: to the child's own marriage
//! node (on the husband or wife port) when the child is married, otherwise to
//! a standalone person node. Children of one marriage are grouped so a
//! renderer can keep them on the same rank.
//!
//! The builder only produces the abstract model. Turning it into markup or
//! pixels is the renderer's job.

use crate::family::FamilySnapshot;
use crate::gender::Gender;
use crate::marriage::{Marriage, MarriageId};
use crate::person::{Person, PersonId};
use crate::style::LayoutStyle;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Identifier of a node in the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum LayoutNodeId {
    Person(PersonId),
    Marriage(MarriageId),
}

impl std::fmt::Display for LayoutNodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person(id) => write!(f, "person_{}", id),
            Self::Marriage(id) => write!(f, "marriage_{}", id),
        }
    }
}

/// Row of a marriage node an edge attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    Husband,
    Wife,
}

impl Port {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Husband => "husband",
            Self::Wife => "wife",
        }
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute bag for one rendered person
///
/// `lineage` is set whenever the person is recorded as someone's child.
/// Renderers typically only mark it inside marriage rows, where it tells
/// blood relatives apart from married-in spouses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCell {
    /// `None` for an absent or unrecorded spouse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
    pub text: String,
    pub gender: Gender,
    pub symbol: String,
    pub color: String,
    pub lineage: bool,
}

impl NodeCell {
    fn for_person(person: &Person, lineage: bool, style: &LayoutStyle) -> Self {
        Self {
            person_id: Some(person.id),
            text: person.name.clone(),
            gender: person.gender,
            symbol: person.gender.symbol().to_string(),
            color: style.color_for(person.gender).to_string(),
            lineage,
        }
    }

    fn unknown(style: &LayoutStyle) -> Self {
        Self {
            person_id: None,
            text: "Unknown".to_string(),
            gender: Gender::Unknown,
            symbol: Gender::Unknown.symbol().to_string(),
            color: style.color_for(Gender::Unknown).to_string(),
            lineage: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Person { cell: NodeCell },
    Marriage { husband: NodeCell, wife: NodeCell },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: LayoutNodeId,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl LayoutNode {
    /// Cells of this node, husband row first for marriages
    pub fn cells(&self) -> Vec<&NodeCell> {
        match &self.kind {
            NodeKind::Person { cell } => vec![cell],
            NodeKind::Marriage { husband, wife } => vec![husband, wife],
        }
    }
}

/// Directed edge from a marriage to one of its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: MarriageId,
    pub to: LayoutNodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
}

impl LayoutEdge {
    pub fn source(&self) -> LayoutNodeId {
        LayoutNodeId::Marriage(self.from)
    }
}

/// Nodes that must render on the same rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankGroup {
    pub members: Vec<LayoutNodeId>,
}

/// Renderer-agnostic diagram model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub rank_groups: Vec<RankGroup>,
}

impl TreeLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: LayoutNodeId) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: LayoutNodeId) -> bool {
        self.node(id).is_some()
    }

    /// How many cells across all nodes render `person`
    pub fn person_appearances(&self, person: PersonId) -> usize {
        self.nodes
            .iter()
            .flat_map(LayoutNode::cells)
            .filter(|cell| cell.person_id == Some(person))
            .count()
    }
}

/// Which marriages and people a layout covers
enum Scope {
    All,
    Subset {
        marriages: BTreeSet<MarriageId>,
        people: BTreeSet<PersonId>,
    },
}

impl Scope {
    fn has_marriage(&self, id: MarriageId) -> bool {
        match self {
            Self::All => true,
            Self::Subset { marriages, .. } => marriages.contains(&id),
        }
    }

    fn has_person(&self, id: PersonId) -> bool {
        match self {
            Self::All => true,
            Self::Subset { people, .. } => people.contains(&id),
        }
    }
}

/// Builds a [`TreeLayout`] from a snapshot
///
/// Without a root the whole snapshot is laid out. With a root the layout
/// covers that marriage and all of its descendants (including the partners
/// they married), plus the spouses' direct ancestry when
/// [`Self::with_ancestors`] is set. An unknown root yields an empty layout.
pub struct TreeLayoutBuilder<'a> {
    snapshot: &'a FamilySnapshot,
    style: LayoutStyle,
    root: Option<MarriageId>,
    include_ancestors: bool,
}

impl<'a> TreeLayoutBuilder<'a> {
    pub fn new(snapshot: &'a FamilySnapshot) -> Self {
        Self {
            snapshot,
            style: LayoutStyle::default(),
            root: None,
            include_ancestors: false,
        }
    }

    pub fn with_style(mut self, style: LayoutStyle) -> Self {
        self.style = style;
        self
    }

    pub fn rooted_at(mut self, root: MarriageId) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_root(mut self, root: Option<MarriageId>) -> Self {
        self.root = root;
        self
    }

    pub fn with_ancestors(mut self, include: bool) -> Self {
        self.include_ancestors = include;
        self
    }

    pub fn build(&self) -> TreeLayout {
        let ordered = self.snapshot.in_id_order();
        let people: BTreeMap<PersonId, &Person> =
            ordered.people.iter().map(|p| (p.id, p)).collect();
        let marriage_map: BTreeMap<MarriageId, &Marriage> =
            ordered.marriages.iter().map(|m| (m.id, m)).collect();

        let scope = match self.root {
            None => Scope::All,
            Some(root) => match self.scope_from(root, &ordered, &marriage_map) {
                Some(scope) => scope,
                None => {
                    tracing::warn!("Layout root marriage {} not found, layout is empty", root);
                    return TreeLayout::default();
                }
            },
        };

        let lineage: BTreeSet<PersonId> = ordered
            .children
            .iter()
            .filter(|l| marriage_map.contains_key(&l.marriage_id))
            .map(|l| l.child_id)
            .collect();

        let in_scope: Vec<&Marriage> = ordered
            .marriages
            .iter()
            .filter(|m| scope.has_marriage(m.id))
            .collect();

        // Where each spouse is drawn; a person listed here gets no standalone node
        let mut positions: BTreeMap<PersonId, Vec<(MarriageId, Port)>> = BTreeMap::new();
        for marriage in &in_scope {
            if let Some(husband) = marriage.husband_id {
                positions
                    .entry(husband)
                    .or_default()
                    .push((marriage.id, Port::Husband));
            }
            if let Some(wife) = marriage.wife_id {
                positions
                    .entry(wife)
                    .or_default()
                    .push((marriage.id, Port::Wife));
            }
        }

        let mut layout = TreeLayout::default();

        for marriage in &in_scope {
            layout.nodes.push(LayoutNode {
                id: LayoutNodeId::Marriage(marriage.id),
                kind: NodeKind::Marriage {
                    husband: self.spouse_cell(marriage.husband_id, &people, &lineage),
                    wife: self.spouse_cell(marriage.wife_id, &people, &lineage),
                },
            });
        }

        for person in people.values() {
            if scope.has_person(person.id) && !positions.contains_key(&person.id) {
                layout.nodes.push(LayoutNode {
                    id: LayoutNodeId::Person(person.id),
                    kind: NodeKind::Person {
                        cell: NodeCell::for_person(
                            person,
                            lineage.contains(&person.id),
                            &self.style,
                        ),
                    },
                });
            }
        }

        for marriage in &in_scope {
            let mut targets: Vec<LayoutNodeId> = Vec::new();

            for link in ordered.children_of(marriage.id) {
                if let Some(spots) = positions.get(&link.child_id) {
                    for &(child_marriage, port) in spots {
                        let to = LayoutNodeId::Marriage(child_marriage);
                        layout.edges.push(LayoutEdge {
                            from: marriage.id,
                            to,
                            port: Some(port),
                        });
                        targets.push(to);
                    }
                } else if people.contains_key(&link.child_id) && scope.has_person(link.child_id) {
                    let to = LayoutNodeId::Person(link.child_id);
                    layout.edges.push(LayoutEdge {
                        from: marriage.id,
                        to,
                        port: None,
                    });
                    targets.push(to);
                } else {
                    tracing::debug!(
                        "Child {} of marriage {} is not drawable, skipping edge",
                        link.child_id,
                        marriage.id
                    );
                }
            }

            let mut seen = BTreeSet::new();
            targets.retain(|t| seen.insert(*t));
            if targets.len() > 1 {
                layout.rank_groups.push(RankGroup { members: targets });
            }
        }

        tracing::debug!(
            "Built tree layout: {} nodes, {} edges, {} rank groups",
            layout.nodes.len(),
            layout.edges.len(),
            layout.rank_groups.len()
        );

        layout
    }

    fn spouse_cell(
        &self,
        spouse: Option<PersonId>,
        people: &BTreeMap<PersonId, &Person>,
        lineage: &BTreeSet<PersonId>,
    ) -> NodeCell {
        match spouse.and_then(|id| people.get(&id)) {
            Some(person) => NodeCell::for_person(person, lineage.contains(&person.id), &self.style),
            None => NodeCell::unknown(&self.style),
        }
    }

    /// Marriages and people reachable downward from `root` (and upward if requested)
    fn scope_from(
        &self,
        root: MarriageId,
        ordered: &FamilySnapshot,
        marriage_map: &BTreeMap<MarriageId, &Marriage>,
    ) -> Option<Scope> {
        let root_marriage = marriage_map.get(&root)?;
        let mut scope_marriages = BTreeSet::new();
        let mut scope_people = BTreeSet::new();
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            if !scope_marriages.insert(current) {
                continue;
            }
            let Some(marriage) = marriage_map.get(&current) else {
                continue;
            };
            scope_people.extend(marriage.spouses());

            for link in ordered.children_of(current) {
                scope_people.insert(link.child_id);
                for child_marriage in ordered.marriages_of(link.child_id) {
                    if !scope_marriages.contains(&child_marriage.id) {
                        queue.push_back(child_marriage.id);
                    }
                }
            }
        }

        if self.include_ancestors {
            let mut stack: Vec<PersonId> = root_marriage.spouses().collect();
            let mut climbed = BTreeSet::new();

            while let Some(person) = stack.pop() {
                if !climbed.insert(person) {
                    continue;
                }
                for parents in ordered.parent_marriages(person) {
                    scope_marriages.insert(parents.id);
                    for parent in parents.spouses() {
                        scope_people.insert(parent);
                        stack.push(parent);
                    }
                }
            }
        }

        Some(Scope::Subset {
            marriages: scope_marriages,
            people: scope_people,
        })
    }
}

/// Lay out the whole snapshot, or the subtree under `root_marriage`, with the default style
pub fn build_layout(snapshot: &FamilySnapshot, root_marriage: Option<MarriageId>) -> TreeLayout {
    TreeLayoutBuilder::new(snapshot)
        .with_root(root_marriage)
        .build()
}
