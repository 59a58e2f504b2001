//! Graph algorithms over the graph store's own adjacency sets.

use std::collections::{BTreeSet, VecDeque};

use super::{GraphAlgorithms, bfs_distances, canonical_path};
use crate::graph::GraphState;
use crate::node::NodeId;

/// [`GraphAlgorithms`] implemented directly on a borrowed [`GraphState`].
#[derive(Debug, Clone, Copy)]
pub struct NativeAlgorithms<'g> {
    graph: &'g GraphState,
}

impl<'g> NativeAlgorithms<'g> {
    /// Wrap a graph.
    pub fn new(graph: &'g GraphState) -> Self {
        Self { graph }
    }

    fn sorted_neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .neighbors(node)
            .map(|adj| adj.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl GraphAlgorithms for NativeAlgorithms<'_> {
    fn name(&self) -> &'static str {
        "native"
    }

    fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.graph.neighbors(node).cloned().unwrap_or_default()
    }

    fn odd_neighborhood(&self, nodes: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        let mut odd = BTreeSet::new();
        for &node in nodes {
            let Ok(adj) = self.graph.neighbors(node) else {
                continue;
            };
            for &neighbor in adj {
                if !odd.remove(&neighbor) {
                    odd.insert(neighbor);
                }
            }
        }
        odd
    }

    fn is_connected(&self, nodes: &BTreeSet<NodeId>) -> bool {
        if nodes.iter().any(|&n| !self.graph.contains(n)) {
            return false;
        }
        let Some(&start) = nodes.first() else {
            return true;
        };

        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.sorted_neighbors(current) {
                if nodes.contains(&neighbor) && seen.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        seen.len() == nodes.len()
    }

    fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        if !self.graph.contains(from) || !self.graph.contains(to) {
            return None;
        }
        let dist = bfs_distances(to, |n| self.sorted_neighbors(n));
        canonical_path(
            from,
            to,
            |n| dist.get(&n).copied(),
            |n| self.sorted_neighbors(n),
        )
    }

    fn connected_components(&self) -> Vec<BTreeSet<NodeId>> {
        let mut assigned = BTreeSet::new();
        let mut components = Vec::new();
        // nodes() is ascending, so components come out ordered by smallest member
        for start in self.graph.nodes() {
            if assigned.contains(&start) {
                continue;
            }
            let component: BTreeSet<NodeId> = bfs_distances(start, |n| self.sorted_neighbors(n))
                .into_keys()
                .collect();
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }
}
