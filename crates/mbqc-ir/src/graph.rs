//! The graph store: nodes, entanglement edges, boundaries and measurements.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{GraphResult, StructuralError};
use crate::measurement::Measurement;
use crate::node::{NodeId, NodeRole};

/// Per-node data held by the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeInfo {
    /// Boundary role of the node.
    pub role: NodeRole,
    /// Measurement, if assigned. Always `None` for output nodes.
    pub measurement: Option<Measurement>,
}

/// An open graph state: the entanglement graph plus its input/output
/// boundary and the measurement of every non-output node.
///
/// The store validates every mutation and rejects the call with a
/// [`StructuralError`] instead of entering an inconsistent state:
/// - edges are undirected, never self-loops, never duplicated
/// - every edge endpoint is a node of the graph
/// - output nodes never carry a measurement
/// - a node is on both boundaries only when marked pass-through
///
/// All storage is ordered by [`NodeId`], so every query iterates in
/// ascending id order and algorithms built on top are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphRecord", into = "GraphRecord")]
pub struct GraphState {
    /// Node data keyed by id.
    nodes: BTreeMap<NodeId, NodeInfo>,
    /// Adjacency sets; every node has an entry.
    adjacency: BTreeMap<NodeId, BTreeSet<NodeId>>,
    /// Number of undirected edges.
    num_edges: usize,
}

impl GraphState {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph from node and edge lists.
    ///
    /// All nodes start internal and unmeasured.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> GraphResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for (a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Add an internal, unmeasured node.
    pub fn add_node(&mut self, node: NodeId) -> GraphResult<&mut Self> {
        if self.nodes.contains_key(&node) {
            return Err(StructuralError::DuplicateNode { node });
        }
        self.nodes.insert(node, NodeInfo::default());
        self.adjacency.insert(node, BTreeSet::new());
        Ok(self)
    }

    /// Add an undirected edge between two existing nodes.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<&mut Self> {
        if a == b {
            return Err(StructuralError::SelfLoop { node: a });
        }
        self.require(a, "add_edge")?;
        self.require(b, "add_edge")?;
        if self.has_edge(a, b) {
            return Err(StructuralError::DuplicateEdge {
                a: a.min(b),
                b: a.max(b),
            });
        }
        self.insert_edge_unchecked(a, b);
        Ok(self)
    }

    /// Remove an existing edge.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<&mut Self> {
        self.require(a, "remove_edge")?;
        self.require(b, "remove_edge")?;
        if !self.has_edge(a, b) {
            return Err(StructuralError::EdgeNotFound {
                a: a.min(b),
                b: a.max(b),
            });
        }
        self.remove_edge_unchecked(a, b);
        Ok(self)
    }

    /// Remove a node together with all of its edges.
    ///
    /// Returns the data the node carried.
    pub fn remove_node(&mut self, node: NodeId) -> GraphResult<NodeInfo> {
        let info = self.info(node, "remove_node")?;
        let neighbors = self.adjacency.remove(&node).unwrap_or_default();
        for neighbor in &neighbors {
            if let Some(adj) = self.adjacency.get_mut(neighbor) {
                adj.remove(&node);
            }
        }
        self.num_edges -= neighbors.len();
        self.nodes.remove(&node);
        Ok(info)
    }

    /// Assign the measurement of a non-output node, replacing any previous one.
    pub fn set_measurement(
        &mut self,
        node: NodeId,
        measurement: Measurement,
    ) -> GraphResult<&mut Self> {
        let info = self.info_mut(node, "set_measurement")?;
        if info.role.is_output() {
            return Err(StructuralError::MeasurementOnOutput { node });
        }
        if !measurement.angle.is_finite() {
            return Err(StructuralError::NonFiniteAngle { node });
        }
        info.measurement = Some(measurement);
        Ok(self)
    }

    /// Add a node to the input set.
    ///
    /// Fails if the node is already an output; use
    /// [`mark_pass_through`](Self::mark_pass_through) for nodes on both sides.
    pub fn mark_input(&mut self, node: NodeId) -> GraphResult<&mut Self> {
        let info = self.info_mut(node, "mark_input")?;
        match info.role {
            NodeRole::Internal | NodeRole::Input => info.role = NodeRole::Input,
            current => {
                return Err(StructuralError::BoundaryConflict {
                    node,
                    current: current.describe(),
                    requested: NodeRole::Input.describe(),
                });
            }
        }
        Ok(self)
    }

    /// Add a node to the output set.
    ///
    /// Fails if the node is already an input or carries a measurement.
    pub fn mark_output(&mut self, node: NodeId) -> GraphResult<&mut Self> {
        let info = self.info_mut(node, "mark_output")?;
        match info.role {
            NodeRole::Internal | NodeRole::Output => {}
            current => {
                return Err(StructuralError::BoundaryConflict {
                    node,
                    current: current.describe(),
                    requested: NodeRole::Output.describe(),
                });
            }
        }
        if info.measurement.is_some() {
            return Err(StructuralError::MeasurementOnOutput { node });
        }
        info.role = NodeRole::Output;
        Ok(self)
    }

    /// Mark a node as both input and output.
    ///
    /// Pass-through nodes are neither prepared nor measured by a pattern.
    pub fn mark_pass_through(&mut self, node: NodeId) -> GraphResult<&mut Self> {
        let info = self.info_mut(node, "mark_pass_through")?;
        if info.measurement.is_some() {
            return Err(StructuralError::MeasurementOnOutput { node });
        }
        info.role = NodeRole::PassThrough;
        Ok(self)
    }

    /// Toggle an edge without validation. Both nodes must exist and differ.
    pub(crate) fn toggle_edge_unchecked(&mut self, a: NodeId, b: NodeId) {
        if self.has_edge(a, b) {
            self.remove_edge_unchecked(a, b);
        } else {
            self.insert_edge_unchecked(a, b);
        }
    }

    fn insert_edge_unchecked(&mut self, a: NodeId, b: NodeId) {
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
        self.num_edges += 1;
    }

    fn remove_edge_unchecked(&mut self, a: NodeId, b: NodeId) {
        if let Some(adj) = self.adjacency.get_mut(&a) {
            adj.remove(&b);
        }
        if let Some(adj) = self.adjacency.get_mut(&b) {
            adj.remove(&a);
        }
        self.num_edges -= 1;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Check if a node exists.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Check if an edge exists (in either orientation).
    #[inline]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(&a).is_some_and(|adj| adj.contains(&b))
    }

    /// Neighbors of a node, in ascending order.
    pub fn neighbors(&self, node: NodeId) -> GraphResult<&BTreeSet<NodeId>> {
        self.adjacency
            .get(&node)
            .ok_or(StructuralError::NodeNotFound {
                node,
                context: Some("neighbors"),
            })
    }

    /// Number of neighbors of a node (0 for unknown nodes).
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(&node).map_or(0, BTreeSet::len)
    }

    /// Role of a node.
    pub fn role(&self, node: NodeId) -> GraphResult<NodeRole> {
        Ok(self.info(node, "role")?.role)
    }

    /// Check if a node is in the input set (false for unknown nodes).
    pub fn is_input(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|info| info.role.is_input())
    }

    /// Check if a node is in the output set (false for unknown nodes).
    pub fn is_output(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|info| info.role.is_output())
    }

    /// Measurement of a node, if assigned.
    pub fn measurement(&self, node: NodeId) -> Option<Measurement> {
        self.nodes.get(&node).and_then(|info| info.measurement)
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// All nodes with their data, in ascending order.
    pub fn node_infos(&self) -> impl Iterator<Item = (NodeId, &NodeInfo)> + '_ {
        self.nodes.iter().map(|(&id, info)| (id, info))
    }

    /// Input nodes in ascending order.
    pub fn inputs(&self) -> BTreeSet<NodeId> {
        self.node_infos()
            .filter(|(_, info)| info.role.is_input())
            .map(|(id, _)| id)
            .collect()
    }

    /// Output nodes in ascending order.
    pub fn outputs(&self) -> BTreeSet<NodeId> {
        self.node_infos()
            .filter(|(_, info)| info.role.is_output())
            .map(|(id, _)| id)
            .collect()
    }

    /// Non-output nodes, in ascending order.
    pub fn measured_nodes(&self) -> BTreeSet<NodeId> {
        self.node_infos()
            .filter(|(_, info)| info.role.is_measured())
            .map(|(id, _)| id)
            .collect()
    }

    /// All edges as `(a, b)` with `a < b`, in lexicographic order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.adjacency.iter().flat_map(|(&a, adj)| {
            adj.range((std::ops::Bound::Excluded(a), std::ops::Bound::Unbounded))
                .map(move |&b| (a, b))
        })
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Check if the graph has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Verify that every non-output node has a measurement.
    ///
    /// Reports the smallest offending node.
    pub fn check_measurements(&self) -> GraphResult<()> {
        for (node, info) in self.node_infos() {
            if info.role.is_measured() && info.measurement.is_none() {
                return Err(StructuralError::MissingMeasurement { node });
            }
        }
        Ok(())
    }

    fn require(&self, node: NodeId, context: &'static str) -> GraphResult<()> {
        if self.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(StructuralError::NodeNotFound {
                node,
                context: Some(context),
            })
        }
    }

    fn info(&self, node: NodeId, context: &'static str) -> GraphResult<NodeInfo> {
        self.nodes
            .get(&node)
            .copied()
            .ok_or(StructuralError::NodeNotFound {
                node,
                context: Some(context),
            })
    }

    fn info_mut(&mut self, node: NodeId, context: &'static str) -> GraphResult<&mut NodeInfo> {
        self.nodes
            .get_mut(&node)
            .ok_or(StructuralError::NodeNotFound {
                node,
                context: Some(context),
            })
    }
}

/// Flat persisted form of a [`GraphState`].
///
/// Loading a record replays it through the validating mutation API, so a
/// hand-edited file cannot produce an inconsistent graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Nodes in ascending order.
    pub nodes: Vec<NodeRecord>,
    /// Edges as `(a, b)` with `a < b`.
    pub edges: Vec<(NodeId, NodeId)>,
}

/// A single node of a [`GraphRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id.
    pub id: NodeId,
    /// Boundary role.
    #[serde(default)]
    pub role: NodeRole,
    /// Measurement, absent for outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement: Option<Measurement>,
}

impl From<GraphState> for GraphRecord {
    fn from(graph: GraphState) -> Self {
        let edges = graph.edges().collect();
        let nodes = graph
            .nodes
            .into_iter()
            .map(|(id, info)| NodeRecord {
                id,
                role: info.role,
                measurement: info.measurement,
            })
            .collect();
        Self { nodes, edges }
    }
}

impl TryFrom<GraphRecord> for GraphState {
    type Error = StructuralError;

    fn try_from(record: GraphRecord) -> Result<Self, Self::Error> {
        let mut graph = GraphState::new();
        for node in &record.nodes {
            graph.add_node(node.id)?;
            match node.role {
                NodeRole::Internal => {}
                NodeRole::Input => {
                    graph.mark_input(node.id)?;
                }
                NodeRole::Output => {
                    graph.mark_output(node.id)?;
                }
                NodeRole::PassThrough => {
                    graph.mark_pass_through(node.id)?;
                }
            }
            if let Some(measurement) = node.measurement {
                graph.set_measurement(node.id, measurement)?;
            }
        }
        for &(a, b) in &record.edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }
}
