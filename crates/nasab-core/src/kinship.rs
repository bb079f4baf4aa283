//! Relationship graph construction and kinship resolution
//!
//! The relationship graph is undirected. Spouses are adjacent, and each
//! present spouse of a marriage is adjacent to every child of that marriage.
//! Kinship distance is the number of edges on a shortest path, so parents,
//! children and spouses are at distance 1, grandparents and siblings at 2.

use crate::child::ChildLink;
use crate::error::{Error, Result};
use crate::family::FamilySnapshot;
use crate::marriage::Marriage;
use crate::person::{Person, PersonId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

/// Paths of at most this many edges are classified as mahram
pub const MAHRAM_MAX_DISTANCE: usize = 3;

/// Undirected adjacency over person ids
///
/// Neighbor sets are ordered by id, so every traversal over the same records
/// visits people in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipGraph {
    adjacency: BTreeMap<PersonId, BTreeSet<PersonId>>,
    labels: BTreeMap<PersonId, String>,
}

/// Shortest kinship path between two people
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinshipPath {
    /// Person ids from source to target inclusive
    pub path: Vec<PersonId>,

    /// Display names aligned with `path`
    pub names: Vec<String>,

    /// Number of edges on the path
    pub distance: usize,

    /// Whether the distance falls within [`MAHRAM_MAX_DISTANCE`]
    pub is_mahram: bool,
}

impl KinshipPath {
    fn new(path: Vec<PersonId>, graph: &RelationshipGraph) -> Self {
        let names = path.iter().map(|id| graph.display_name(*id)).collect();
        let distance = path.len().saturating_sub(1);
        Self {
            path,
            names,
            distance,
            is_mahram: distance <= MAHRAM_MAX_DISTANCE,
        }
    }

    pub fn source(&self) -> Option<PersonId> {
        self.path.first().copied()
    }

    pub fn target(&self) -> Option<PersonId> {
        self.path.last().copied()
    }
}

/// Build the relationship graph from the three record collections
///
/// Never fails. Marriages missing a spouse contribute no spouse edge, and
/// child links whose marriage is unknown contribute no parent edge.
pub fn build_graph(
    people: &[Person],
    marriages: &[Marriage],
    children: &[ChildLink],
) -> RelationshipGraph {
    let mut graph = RelationshipGraph::default();

    for person in people {
        graph.adjacency.entry(person.id).or_default();
        graph.labels.insert(person.id, person.name.clone());
    }

    let marriage_map: HashMap<_, _> = marriages.iter().map(|m| (m.id, m)).collect();

    for marriage in marriages {
        if let (Some(husband), Some(wife)) = (marriage.husband_id, marriage.wife_id) {
            graph.add_edge(husband, wife);
        }
    }

    let mut dangling = 0usize;
    for link in children {
        graph.adjacency.entry(link.child_id).or_default();
        match marriage_map.get(&link.marriage_id) {
            Some(marriage) => {
                for parent in marriage.spouses() {
                    graph.add_edge(parent, link.child_id);
                }
            }
            None => dangling += 1,
        }
    }

    if dangling > 0 {
        tracing::debug!("Skipped {} child links with unknown marriages", dangling);
    }
    tracing::debug!(
        "Built relationship graph: {} people, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    graph
}

impl RelationshipGraph {
    pub fn from_snapshot(snapshot: &FamilySnapshot) -> Self {
        build_graph(&snapshot.people, &snapshot.marriages, &snapshot.children)
    }

    fn add_edge(&mut self, a: PersonId, b: PersonId) {
        self.adjacency.entry(a).or_default();
        self.adjacency.entry(b).or_default();
        if a == b {
            return;
        }
        if let Some(set) = self.adjacency.get_mut(&a) {
            set.insert(b);
        }
        if let Some(set) = self.adjacency.get_mut(&b) {
            set.insert(a);
        }
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Neighbors of `id` in ascending id order
    pub fn neighbors(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn nodes(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn label(&self, id: PersonId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    fn display_name(&self, id: PersonId) -> String {
        self.label(id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("#{}", id))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Breadth-first shortest path from `source` to `target`
    ///
    /// Returns `None` if either id is not in the graph or no path exists.
    pub fn shortest_path(&self, source: PersonId, target: PersonId) -> Option<Vec<PersonId>> {
        self.bfs_path(source, target, None).unwrap_or(None)
    }

    /// Same as [`Self::shortest_path`], checking `cancel` once per dequeue
    pub fn shortest_path_cancellable(
        &self,
        source: PersonId,
        target: PersonId,
        cancel: &AtomicBool,
    ) -> Result<Option<Vec<PersonId>>> {
        self.bfs_path(source, target, Some(cancel))
    }

    fn bfs_path(
        &self,
        source: PersonId,
        target: PersonId,
        cancel: Option<&AtomicBool>,
    ) -> Result<Option<Vec<PersonId>>> {
        if !self.contains(source) || !self.contains(target) {
            return Ok(None);
        }

        let mut visited: BTreeSet<PersonId> = BTreeSet::from([source]);
        let mut parent: HashMap<PersonId, PersonId> = HashMap::new();
        let mut queue: VecDeque<PersonId> = VecDeque::from([source]);
        let mut nodes_visited = 0usize;

        while let Some(current) = queue.pop_front() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(Error::Cancelled);
            }
            nodes_visited += 1;

            if current == target {
                let path = reconstruct_path(source, target, &parent);
                tracing::debug!(
                    "BFS found path of {} edges after visiting {} people",
                    path.len() - 1,
                    nodes_visited
                );
                return Ok(Some(path));
            }

            for next in self.neighbors(current) {
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        tracing::debug!(
            "BFS found no path from {} to {} ({} people visited)",
            source,
            target,
            nodes_visited
        );
        Ok(None)
    }

    /// Everyone reachable from `source` within `max_distance` edges
    ///
    /// The source itself is excluded. Results are ordered by distance, then id.
    pub fn within(&self, source: PersonId, max_distance: usize) -> Vec<(PersonId, usize)> {
        let (_, mut reached) = self.explore(source, max_distance);
        reached.sort_by_key(|&(id, distance)| (distance, id));
        reached
    }

    /// Depth-bounded BFS returning the parent map and reached nodes
    fn explore(
        &self,
        source: PersonId,
        max_distance: usize,
    ) -> (HashMap<PersonId, PersonId>, Vec<(PersonId, usize)>) {
        let mut parent = HashMap::new();
        let mut reached = Vec::new();
        if !self.contains(source) {
            return (parent, reached);
        }

        let mut visited: BTreeSet<PersonId> = BTreeSet::from([source]);
        let mut queue: VecDeque<(PersonId, usize)> = VecDeque::from([(source, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_distance {
                continue;
            }
            for next in self.neighbors(current) {
                if visited.insert(next) {
                    parent.insert(next, current);
                    reached.push((next, depth + 1));
                    queue.push_back((next, depth + 1));
                }
            }
        }

        (parent, reached)
    }
}

/// Walk the parent map back from `end` to `start`
fn reconstruct_path(
    start: PersonId,
    end: PersonId,
    parent: &HashMap<PersonId, PersonId>,
) -> Vec<PersonId> {
    let mut nodes = vec![end];
    let mut current = end;

    while current != start {
        match parent.get(&current) {
            Some(prev) => {
                nodes.push(*prev);
                current = *prev;
            }
            None => break,
        }
    }

    nodes.reverse();
    nodes
}

/// Resolve the shortest kinship path between two people
///
/// Rebuilds the relationship graph from `snapshot` on every call. Unknown ids
/// and disconnected people both yield `None`.
pub fn find_relationship(
    snapshot: &FamilySnapshot,
    source: PersonId,
    target: PersonId,
) -> Option<KinshipPath> {
    let graph = RelationshipGraph::from_snapshot(snapshot);
    graph
        .shortest_path(source, target)
        .map(|path| KinshipPath::new(path, &graph))
}

/// Every relative of `person` within [`MAHRAM_MAX_DISTANCE`], with the path to each
pub fn mahram_relatives(snapshot: &FamilySnapshot, person: PersonId) -> Vec<KinshipPath> {
    let graph = RelationshipGraph::from_snapshot(snapshot);
    let (parent, mut reached) = graph.explore(person, MAHRAM_MAX_DISTANCE);
    reached.sort_by_key(|&(id, distance)| (distance, id));

    reached
        .into_iter()
        .map(|(id, _)| KinshipPath::new(reconstruct_path(person, id, &parent), &graph))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gender::Gender;
    use proptest::prelude::*;

    fn person(id: u64, name: &str) -> Person {
        Person::new(id, name, Gender::Unknown)
    }

    fn p(id: u64) -> PersonId {
        PersonId(id)
    }

    /// A(1) + B(2) married in M1, C(3) their child
    fn nuclear_family() -> FamilySnapshot {
        FamilySnapshot::new()
            .with_people(vec![person(1, "A"), person(2, "B"), person(3, "C")])
            .with_marriages(vec![Marriage::couple(1, p(1), p(2))])
            .with_children(vec![ChildLink::new(1, 1, 3)])
    }

    /// Chain of single-parent generations: 1 -> 2 -> 3 -> 4 -> 5
    fn lineage_chain() -> FamilySnapshot {
        let people = (1..=5).map(|i| person(i, &format!("G{}", i))).collect();
        let marriages = (1..=4).map(|i| Marriage::new(i, Some(p(i)), None)).collect();
        let children = (1..=4).map(|i| ChildLink::new(i, i, i + 1)).collect();
        FamilySnapshot::new()
            .with_people(people)
            .with_marriages(marriages)
            .with_children(children)
    }

    #[test]
    fn test_build_graph_edges() {
        let snapshot = nuclear_family();
        let graph = RelationshipGraph::from_snapshot(&snapshot);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.neighbors(p(3)).collect::<Vec<_>>(), vec![p(1), p(2)]);
        assert_eq!(graph.label(p(1)), Some("A"));
    }

    #[test]
    fn test_isolated_person_is_member() {
        let snapshot = FamilySnapshot::new().with_people(vec![person(9, "Alone")]);
        let graph = RelationshipGraph::from_snapshot(&snapshot);

        assert!(graph.contains(p(9)));
        assert_eq!(graph.neighbors(p(9)).count(), 0);
    }

    #[test]
    fn test_single_spouse_marriage_edges() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "Mother"), person(2, "Child")])
            .with_marriages(vec![Marriage::new(1, None, Some(p(1)))])
            .with_children(vec![ChildLink::new(1, 1, 2)]);
        let graph = RelationshipGraph::from_snapshot(&snapshot);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(p(2)).collect::<Vec<_>>(), vec![p(1)]);
    }

    #[test]
    fn test_degenerate_marriage_contributes_nothing() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "Child")])
            .with_marriages(vec![Marriage::new(1, None, None)])
            .with_children(vec![ChildLink::new(1, 1, 1)]);
        let graph = RelationshipGraph::from_snapshot(&snapshot);

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(find_relationship(&snapshot, p(1), p(1)).map(|k| k.distance), Some(0));
    }

    #[test]
    fn test_dangling_child_link() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "A"), person(2, "B")])
            .with_children(vec![ChildLink::new(1, 99, 2)]);
        let graph = RelationshipGraph::from_snapshot(&snapshot);

        assert_eq!(graph.edge_count(), 0);
        assert!(find_relationship(&snapshot, p(1), p(2)).is_none());
    }

    #[test]
    fn test_spouse_missing_from_people_table() {
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "A")])
            .with_marriages(vec![Marriage::couple(1, p(1), p(50))]);

        let path = find_relationship(&snapshot, p(1), p(50)).unwrap();
        assert_eq!(path.names, vec!["A".to_string(), "#50".to_string()]);
    }

    #[test]
    fn test_self_relationship() {
        let snapshot = nuclear_family();
        let path = find_relationship(&snapshot, p(2), p(2)).unwrap();

        assert_eq!(path.path, vec![p(2)]);
        assert_eq!(path.distance, 0);
        assert!(path.is_mahram);
    }

    #[test]
    fn test_parent_child_and_spouse() {
        let snapshot = nuclear_family();

        let parent_child = find_relationship(&snapshot, p(1), p(3)).unwrap();
        assert_eq!(parent_child.path, vec![p(1), p(3)]);
        assert_eq!(parent_child.names, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(parent_child.distance, 1);
        assert!(parent_child.is_mahram);

        let spouses = find_relationship(&snapshot, p(1), p(2)).unwrap();
        assert_eq!(spouses.path, vec![p(1), p(2)]);
        assert_eq!(spouses.distance, 1);
        assert!(spouses.is_mahram);
    }

    #[test]
    fn test_grandparent() {
        // G(1) in M1 has child P(2); P in M2 has child X(3)
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "G"), person(2, "P"), person(3, "X")])
            .with_marriages(vec![
                Marriage::new(1, Some(p(1)), None),
                Marriage::new(2, Some(p(2)), None),
            ])
            .with_children(vec![ChildLink::new(1, 1, 2), ChildLink::new(2, 2, 3)]);

        let path = find_relationship(&snapshot, p(1), p(3)).unwrap();
        assert_eq!(path.distance, 2);
        assert!(path.is_mahram);
    }

    #[test]
    fn test_mahram_boundary() {
        let snapshot = lineage_chain();

        let three = find_relationship(&snapshot, p(1), p(4)).unwrap();
        assert_eq!(three.distance, 3);
        assert!(three.is_mahram);

        let four = find_relationship(&snapshot, p(1), p(5)).unwrap();
        assert_eq!(four.distance, 4);
        assert!(!four.is_mahram);
    }

    #[test]
    fn test_unrelated_people() {
        let snapshot = FamilySnapshot::new().with_people(vec![person(1, "A"), person(2, "B")]);
        assert!(find_relationship(&snapshot, p(1), p(2)).is_none());
    }

    #[test]
    fn test_unknown_ids() {
        let snapshot = nuclear_family();
        assert!(find_relationship(&snapshot, p(1), p(404)).is_none());
        assert!(find_relationship(&snapshot, p(404), p(1)).is_none());
        assert!(find_relationship(&FamilySnapshot::new(), p(1), p(1)).is_none());
    }

    #[test]
    fn test_tie_break_prefers_lower_id() {
        // Two parents of the child; the path from one sibling to another can go
        // through either parent. The lower id parent is discovered first.
        let snapshot = FamilySnapshot::new()
            .with_people(vec![person(1, "F"), person(2, "M"), person(3, "S1"), person(4, "S2")])
            .with_marriages(vec![Marriage::couple(1, p(2), p(1))])
            .with_children(vec![ChildLink::new(1, 1, 3), ChildLink::new(2, 1, 4)]);

        let path = find_relationship(&snapshot, p(3), p(4)).unwrap();
        assert_eq!(path.path, vec![p(3), p(1), p(4)]);
    }

    #[test]
    fn test_cancellation() {
        let graph = RelationshipGraph::from_snapshot(&lineage_chain());
        let cancel = AtomicBool::new(true);

        let result = graph.shortest_path_cancellable(p(1), p(5), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));

        cancel.store(false, Ordering::Relaxed);
        let result = graph.shortest_path_cancellable(p(1), p(5), &cancel).unwrap();
        assert_eq!(result.map(|path| path.len()), Some(5));
    }

    #[test]
    fn test_within_distance() {
        let graph = RelationshipGraph::from_snapshot(&lineage_chain());
        let reached = graph.within(p(2), 2);

        assert_eq!(reached, vec![(p(1), 1), (p(3), 1), (p(4), 2)]);
        assert!(graph.within(p(99), 3).is_empty());
    }

    #[test]
    fn test_mahram_relatives() {
        let relatives = mahram_relatives(&lineage_chain(), p(1));
        let targets: Vec<_> = relatives.iter().filter_map(KinshipPath::target).collect();

        assert_eq!(targets, vec![p(2), p(3), p(4)]);
        assert!(relatives.iter().all(|r| r.is_mahram));
        assert_eq!(relatives[2].path, vec![p(1), p(2), p(3), p(4)]);
    }

    #[test]
    fn test_marriage_cycle_terminates() {
        // Spouse-spouse-shared child forms a triangle
        let snapshot = nuclear_family();
        let graph = RelationshipGraph::from_snapshot(&snapshot);
        assert_eq!(graph.within(p(1), 10).len(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Exhaustive checks on small random families
    // ─────────────────────────────────────────────────────────────────────────

    /// Shortest simple path length by enumerating every simple path
    fn brute_force_distance(graph: &RelationshipGraph, from: PersonId, to: PersonId) -> Option<usize> {
        fn dfs(
            graph: &RelationshipGraph,
            current: PersonId,
            to: PersonId,
            seen: &mut BTreeSet<PersonId>,
            depth: usize,
            best: &mut Option<usize>,
        ) {
            if current == to {
                *best = Some(best.map_or(depth, |b| b.min(depth)));
                return;
            }
            for next in graph.neighbors(current) {
                if seen.insert(next) {
                    dfs(graph, next, to, seen, depth + 1, best);
                    seen.remove(&next);
                }
            }
        }

        if !graph.contains(from) || !graph.contains(to) {
            return None;
        }
        let mut best = None;
        let mut seen = BTreeSet::from([from]);
        dfs(graph, from, to, &mut seen, 0, &mut best);
        best
    }

    fn family_strategy() -> impl Strategy<Value = FamilySnapshot> {
        let people = 2u64..8;
        people.prop_flat_map(|n| {
            let marriages = proptest::collection::vec(
                (proptest::option::of(1..=n), proptest::option::of(1..=n)),
                0..5,
            );
            let links = proptest::collection::vec((1u64..6, 1..=n), 0..8);
            (Just(n), marriages, links).prop_map(|(n, marriages, links)| {
                FamilySnapshot::new()
                    .with_people((1..=n).map(|i| person(i, &format!("P{}", i))).collect())
                    .with_marriages(
                        marriages
                            .into_iter()
                            .enumerate()
                            .map(|(i, (h, w))| Marriage::new(i as u64 + 1, h.map(PersonId), w.map(PersonId)))
                            .collect(),
                    )
                    .with_children(
                        links
                            .into_iter()
                            .enumerate()
                            .map(|(i, (m, c))| ChildLink::new(i as u64 + 1, m, c))
                            .collect(),
                    )
            })
        })
    }

    proptest! {
        #[test]
        fn prop_bfs_distance_is_minimal(snapshot in family_strategy()) {
            let graph = RelationshipGraph::from_snapshot(&snapshot);
            let ids: Vec<_> = graph.nodes().collect();
            for &a in &ids {
                for &b in &ids {
                    let found = find_relationship(&snapshot, a, b).map(|k| k.distance);
                    prop_assert_eq!(found, brute_force_distance(&graph, a, b));
                }
            }
        }

        #[test]
        fn prop_distance_is_symmetric(snapshot in family_strategy()) {
            let graph = RelationshipGraph::from_snapshot(&snapshot);
            let ids: Vec<_> = graph.nodes().collect();
            for &a in &ids {
                for &b in &ids {
                    let forward = find_relationship(&snapshot, a, b);
                    let backward = find_relationship(&snapshot, b, a);
                    prop_assert_eq!(
                        forward.as_ref().map(|k| k.distance),
                        backward.as_ref().map(|k| k.distance)
                    );
                    if let Some(path) = forward {
                        prop_assert_eq!(path.is_mahram, path.distance <= MAHRAM_MAX_DISTANCE);
                        prop_assert_eq!(path.source(), Some(a));
                        prop_assert_eq!(path.target(), Some(b));
                    }
                }
            }
        }
    }
}
