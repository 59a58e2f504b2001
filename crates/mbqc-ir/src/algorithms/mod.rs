//! Graph algorithms used by flow finding, behind a capability interface.
//!
//! Flow finding only needs a handful of graph queries. They are expressed by
//! the [`GraphAlgorithms`] trait, which has two implementations:
//!
//! - [`NativeAlgorithms`]: works directly on the adjacency sets of a
//!   [`GraphState`]. Always available.
//! - [`AcceleratedAlgorithms`]: builds a `petgraph` snapshot of the graph and
//!   answers queries with petgraph primitives. Requires the `accelerated`
//!   feature (enabled by default).
//!
//! Both implementations return identical results for every query. Flow
//! correctness depends on exact odd-neighborhood computation, so this is a
//! correctness contract, not a performance detail:
//!
//! - sets are returned as ordered [`BTreeSet`]s
//! - [`shortest_path`](GraphAlgorithms::shortest_path) returns the
//!   lexicographically smallest among all shortest paths
//! - [`is_connected`](GraphAlgorithms::is_connected) is `true` for an empty or
//!   single-node set and `false` if the set names an unknown node
//! - [`connected_components`](GraphAlgorithms::connected_components) are sorted
//!   by their smallest member
//!
//! The implementation is picked once with [`select`]; callers only see the
//! trait object.
//!
//! ```rust
//! use mbqc_ir::algorithms::{AlgorithmBackend, select};
//! use mbqc_ir::{GraphState, NodeId};
//!
//! let graph = GraphState::from_edges(
//!     [NodeId(0), NodeId(1), NodeId(2)],
//!     [(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
//! )
//! .unwrap();
//!
//! let algos = select(AlgorithmBackend::Native, &graph);
//! let odd = algos.odd_neighborhood(&[NodeId(0), NodeId(2)].into());
//! assert!(odd.is_empty()); // node 1 is adjacent to both
//! ```

mod native;

#[cfg(feature = "accelerated")]
mod accelerated;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::graph::GraphState;
use crate::node::NodeId;

#[cfg(feature = "accelerated")]
pub use accelerated::AcceleratedAlgorithms;
pub use native::NativeAlgorithms;

/// Graph queries needed by the flow finder and extractor.
pub trait GraphAlgorithms {
    /// Short name of the implementation, for logging.
    fn name(&self) -> &'static str;

    /// Neighbors of a node. Empty for unknown nodes.
    fn neighbors(&self, node: NodeId) -> BTreeSet<NodeId>;

    /// Nodes adjacent to an odd number of members of `nodes`.
    ///
    /// Unknown members contribute nothing.
    fn odd_neighborhood(&self, nodes: &BTreeSet<NodeId>) -> BTreeSet<NodeId>;

    /// Whether the subgraph induced by `nodes` is connected.
    fn is_connected(&self, nodes: &BTreeSet<NodeId>) -> bool;

    /// Lexicographically smallest shortest path from `from` to `to`,
    /// both endpoints included. `None` if unreachable or unknown.
    fn shortest_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>>;

    /// Connected components of the whole graph, sorted by smallest member.
    fn connected_components(&self) -> Vec<BTreeSet<NodeId>>;
}

/// Which [`GraphAlgorithms`] implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmBackend {
    /// Work directly on the graph store's adjacency sets.
    #[default]
    Native,
    /// Delegate to petgraph (falls back to native without the `accelerated` feature).
    Accelerated,
}

impl AlgorithmBackend {
    /// Whether the accelerated implementation was compiled in.
    pub const fn accelerator_available() -> bool {
        cfg!(feature = "accelerated")
    }
}

impl fmt::Display for AlgorithmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmBackend::Native => f.write_str("native"),
            AlgorithmBackend::Accelerated => f.write_str("accelerated"),
        }
    }
}

impl FromStr for AlgorithmBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(AlgorithmBackend::Native),
            "accelerated" | "petgraph" => Ok(AlgorithmBackend::Accelerated),
            other => Err(format!(
                "unknown algorithm backend '{other}' (expected 'native' or 'accelerated')"
            )),
        }
    }
}

/// Build the graph algorithms implementation for `backend`.
pub fn select<'g>(backend: AlgorithmBackend, graph: &'g GraphState) -> Box<dyn GraphAlgorithms + 'g> {
    match backend {
        AlgorithmBackend::Native => Box::new(NativeAlgorithms::new(graph)),
        #[cfg(feature = "accelerated")]
        AlgorithmBackend::Accelerated => Box::new(AcceleratedAlgorithms::new(graph)),
        #[cfg(not(feature = "accelerated"))]
        AlgorithmBackend::Accelerated => {
            tracing::warn!("accelerated graph backend not compiled in, using native algorithms");
            Box::new(NativeAlgorithms::new(graph))
        }
    }
}

/// Walk from `from` to `to` along the smallest-id neighbor that is one step
/// closer to `to`.
///
/// `distance_to_target` gives the hop distance of a node to `to` (`None` if
/// unreachable); `sorted_neighbors` lists neighbors in ascending order. Both
/// implementations share this walk so their tie-breaking is identical.
pub(crate) fn canonical_path(
    from: NodeId,
    to: NodeId,
    distance_to_target: impl Fn(NodeId) -> Option<u32>,
    sorted_neighbors: impl Fn(NodeId) -> Vec<NodeId>,
) -> Option<Vec<NodeId>> {
    let mut remaining = distance_to_target(from)?;
    let mut path = vec![from];
    let mut current = from;
    while current != to {
        let next = sorted_neighbors(current)
            .into_iter()
            .find(|&n| distance_to_target(n) == Some(remaining - 1))?;
        path.push(next);
        current = next;
        remaining -= 1;
    }
    Some(path)
}

/// Breadth-first hop distances from `start` using `sorted_neighbors`.
pub(crate) fn bfs_distances(
    start: NodeId,
    sorted_neighbors: impl Fn(NodeId) -> Vec<NodeId>,
) -> rustc_hash::FxHashMap<NodeId, u32> {
    let mut dist = rustc_hash::FxHashMap::default();
    let mut queue = VecDeque::new();
    dist.insert(start, 0u32);
    queue.push_back(start);
    while let Some(current) = queue.pop_front() {
        let d = dist[&current];
        for neighbor in sorted_neighbors(current) {
            if !dist.contains_key(&neighbor) {
                dist.insert(neighbor, d + 1);
                queue.push_back(neighbor);
            }
        }
    }
    dist
}
