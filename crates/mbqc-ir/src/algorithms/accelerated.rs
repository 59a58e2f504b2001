//! Graph algorithms delegated to petgraph.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{Bfs, NodeFiltered};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, BTreeSet};

use super::{GraphAlgorithms, canonical_path};
use crate::graph::GraphState;
use crate::node::NodeId;

/// [`GraphAlgorithms`] backed by a petgraph snapshot of a [`GraphState`].
///
/// The snapshot is taken at construction; later mutations of the graph store
/// are not seen. The borrow checker already prevents mutating a graph while
/// an analysis holds it.
#[derive(Debug, Clone)]
pub struct AcceleratedAlgorithms {
    /// Undirected snapshot; node weights are the original ids.
    graph: UnGraph<NodeId, (), u32>,
    /// Map from node id to petgraph index.
    index: FxHashMap<NodeId, NodeIndex<u32>>,
}

impl AcceleratedAlgorithms {
    /// Snapshot a graph into petgraph.
    pub fn new(source: &GraphState) -> Self {
        let mut graph = UnGraph::with_capacity(source.num_nodes(), source.num_edges());
        let mut index = FxHashMap::default();
        for node in source.nodes() {
            index.insert(node, graph.add_node(node));
        }
        for (a, b) in source.edges() {
            graph.add_edge(index[&a], index[&b], ());
        }
        Self { graph, index }
    }

    fn sorted_neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node).into_iter().collect()
    }
}

impl GraphAlgorithms for AcceleratedAlgorithms {
    fn name(&self) -> &'static str {
        "petgraph"
    }

    fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.index
            .get(&node)
            .map(|&idx| self.graph.neighbors(idx).map(|n| self.graph[n]).collect())
            .unwrap_or_default()
    }

    fn odd_neighborhood(&self, nodes: &BTreeSet<NodeId>) -> BTreeSet<NodeId> {
        let mut parity: FxHashMap<NodeIndex<u32>, bool> = FxHashMap::default();
        for idx in nodes.iter().filter_map(|n| self.index.get(n)) {
            for neighbor in self.graph.neighbors(*idx) {
                *parity.entry(neighbor).or_insert(false) ^= true;
            }
        }
        parity
            .into_iter()
            .filter(|&(_, odd)| odd)
            .map(|(idx, _)| self.graph[idx])
            .collect()
    }

    fn is_connected(&self, nodes: &BTreeSet<NodeId>) -> bool {
        let mut members = FxHashSet::default();
        for node in nodes {
            match self.index.get(node) {
                Some(&idx) => {
                    members.insert(idx);
                }
                None => return false,
            }
        }
        let Some(&start) = nodes.first().and_then(|n| self.index.get(n)) else {
            return true;
        };

        let filtered = NodeFiltered::from_fn(&self.graph, |idx: NodeIndex<u32>| {
            members.contains(&idx)
        });
        let mut bfs = Bfs::new(&filtered, start);
        let mut reached = 0usize;
        while bfs.next(&filtered).is_some() {
            reached += 1;
        }
        reached == members.len()
    }

    fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let &target = self.index.get(&to)?;
        if !self.index.contains_key(&from) {
            return None;
        }
        let dist = petgraph::algo::dijkstra(&self.graph, target, None, |_| 1u32);
        canonical_path(
            from,
            to,
            |n| self.index.get(&n).and_then(|idx| dist.get(idx)).copied(),
            |n| self.sorted_neighbors(n),
        )
    }

    fn connected_components(&self) -> Vec<BTreeSet<NodeId>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.raw_edges() {
            sets.union(edge.source().index(), edge.target().index());
        }
        let mut by_root: BTreeMap<usize, BTreeSet<NodeId>> = BTreeMap::new();
        for idx in self.graph.node_indices() {
            by_root
                .entry(sets.find(idx.index()))
                .or_default()
                .insert(self.graph[idx]);
        }
        let mut components: Vec<_> = by_root.into_values().collect();
        components.sort_by_key(|c| c.first().copied());
        components
    }
}
