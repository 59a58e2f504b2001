//! Graph-state rewrites and a decorated graph-state simulator.
//!
//! [`local_complement`] and [`measure_pauli`] rewrite the entanglement graph
//! only; the local Cliffords a Pauli measurement leaves on the neighbors are
//! dropped, so the result equals the measured state up to those Cliffords.
//!
//! [`GraphSim`] tracks them. Every node carries a [`Decoration`] standing for
//! `H^hollow S^loop Z^sign`, and single-qubit Clifford gates, the two
//! equivalence rules and Pauli measurements keep the decorated state equal to
//! the physical one up to a global phase (Elliott, Eastin and Caves 2010).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::error::{GraphResult, StructuralError};
use crate::graph::GraphState;
use crate::measurement::Pauli;
use crate::node::NodeId;

/// Record of a Pauli-measurement rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauliRewrite {
    /// The measured node, removed from the graph.
    pub removed: NodeId,
    /// Measurement axis.
    pub axis: Pauli,
    /// Neighbor used as pivot for X measurements.
    pub pivot: Option<NodeId>,
}

/// Toggle every edge between two neighbors of `node`.
pub fn local_complement(graph: &mut GraphState, node: NodeId) -> GraphResult<()> {
    let neighbors: Vec<NodeId> = graph.neighbors(node)?.iter().copied().collect();
    for (i, &a) in neighbors.iter().enumerate() {
        for &b in &neighbors[i + 1..] {
            graph.toggle_edge_unchecked(a, b);
        }
    }
    Ok(())
}

/// Measure `node` in a Pauli basis and remove it from the graph state.
///
/// - Z: the node is deleted.
/// - Y: local complementation on the node, then deletion.
/// - X: with `b` the smallest neighbor, complement `b`, complement the node,
///   delete it, complement `b` again. An isolated node is simply deleted.
///
/// The resulting graph is correct up to local Cliffords on the former
/// neighbors; use [`GraphSim::measure`] to keep track of them.
///
/// Output nodes cannot be measured.
pub fn measure_pauli(graph: &mut GraphState, node: NodeId, axis: Pauli) -> GraphResult<PauliRewrite> {
    if graph.is_output(node) {
        return Err(StructuralError::MeasurementOnOutput { node });
    }
    let neighbors: BTreeSet<NodeId> = graph.neighbors(node)?.clone();

    let pivot = match axis {
        Pauli::Z => None,
        Pauli::Y => {
            local_complement(graph, node)?;
            None
        }
        Pauli::X => neighbors.first().copied(),
    };

    match (axis, pivot) {
        (Pauli::X, Some(b)) => {
            local_complement(graph, b)?;
            local_complement(graph, node)?;
            graph.remove_node(node)?;
            local_complement(graph, b)?;
        }
        _ => {
            graph.remove_node(node)?;
        }
    }

    debug!(node = node.0, ?axis, ?pivot, edges = graph.num_edges(), "pauli measurement rewrite");
    Ok(PauliRewrite {
        removed: node,
        axis,
        pivot,
    })
}

/// Local Clifford carried by a node of a [`GraphSim`].
///
/// The node's qubit is `H^hollow S^loop Z^sign` applied to the plain graph
/// state, `Z` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Decoration {
    /// Hadamard.
    pub hollow: bool,
    /// Phase gate `S`.
    pub looped: bool,
    /// Pauli `Z`.
    pub sign: bool,
}

impl Decoration {
    /// Append an `S` below the Hadamard; `S^2 = Z`.
    fn advance(&mut self) {
        if self.looped {
            self.looped = false;
            self.sign = !self.sign;
        } else {
            self.looped = true;
        }
    }
}

/// A graph state whose nodes carry local Clifford decorations.
///
/// Node ids and edges live in an ordinary [`GraphState`]; boundaries and
/// measurements of that store are not used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSim {
    graph: GraphState,
    decorations: BTreeMap<NodeId, Decoration>,
}

impl GraphSim {
    /// Create an empty simulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an undecorated graph state from node and edge lists.
    pub fn from_edges(
        nodes: impl IntoIterator<Item = NodeId>,
        edges: impl IntoIterator<Item = (NodeId, NodeId)>,
    ) -> GraphResult<Self> {
        let mut sim = Self::new();
        for node in nodes {
            sim.add_node(node)?;
        }
        for (a, b) in edges {
            sim.add_edge(a, b)?;
        }
        Ok(sim)
    }

    /// Undecorated graph state over the nodes and edges of `graph`.
    pub fn from_graph(graph: &GraphState) -> GraphResult<Self> {
        Self::from_edges(graph.nodes(), graph.edges())
    }

    /// Add an undecorated node.
    pub fn add_node(&mut self, node: NodeId) -> GraphResult<&mut Self> {
        self.graph.add_node(node)?;
        self.decorations.insert(node, Decoration::default());
        Ok(self)
    }

    /// Add an edge (a `CZ` between two undecorated qubits).
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<&mut Self> {
        self.graph.add_edge(a, b)?;
        Ok(self)
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    /// Number of live nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Decoration of a node.
    pub fn decoration(&self, node: NodeId) -> GraphResult<Decoration> {
        self.decorations
            .get(&node)
            .copied()
            .ok_or(StructuralError::NodeNotFound {
                node,
                context: Some("decoration"),
            })
    }

    /// Replace the decoration of a node.
    pub fn set_decoration(&mut self, node: NodeId, decoration: Decoration) -> GraphResult<&mut Self> {
        *self.decoration_mut(node)? = decoration;
        Ok(self)
    }

    // =========================================================================
    // Local Clifford gates
    // =========================================================================

    /// Apply a Hadamard to `node`.
    pub fn h(&mut self, node: NodeId) -> GraphResult<()> {
        let decoration = self.decoration_mut(node)?;
        decoration.hollow = !decoration.hollow;
        Ok(())
    }

    /// Apply the phase gate `S` to `node`.
    ///
    /// On a hollow node the gate is absorbed by a local complementation.
    pub fn s(&mut self, node: NodeId) -> GraphResult<()> {
        let before = self.decoration(node)?;
        if !before.hollow {
            self.decoration_mut(node)?.advance();
            return Ok(());
        }

        let neighbors = self.local_complement(node)?;
        self.advance_all(&neighbors);
        if before.looped {
            let decoration = self.decoration_mut(node)?;
            decoration.hollow = false;
            decoration.looped = false;
            if !before.sign {
                self.flip_signs(&neighbors);
            }
        } else if before.sign {
            self.flip_signs(&neighbors);
        }
        Ok(())
    }

    /// Apply a Pauli `Z` to `node`.
    pub fn z(&mut self, node: NodeId) -> GraphResult<()> {
        let decoration = self.decoration(node)?;
        if decoration.hollow {
            // H X = Z H: the X reaches the graph state and becomes Z on the neighbors
            let neighbors = self.neighbor_list(node)?;
            self.flip_signs(&neighbors);
            if decoration.looped {
                self.flip_sign(node);
            }
        } else {
            self.flip_sign(node);
        }
        Ok(())
    }

    /// Local complementation of the graph only, leaving decorations alone.
    ///
    /// Returns the neighborhood of `node`, which the rewrite keeps.
    pub fn local_complement(&mut self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        local_complement(&mut self.graph, node)?;
        self.neighbor_list(node)
    }

    // =========================================================================
    // Equivalence rules
    // =========================================================================

    /// Rule E1: rewrite the neighborhood of a looped node.
    ///
    /// The node keeps its loop and toggles its fill; the represented state
    /// does not change.
    pub fn equivalent_graph_e1(&mut self, node: NodeId) -> GraphResult<()> {
        if !self.decoration(node)?.looped {
            return Err(StructuralError::MissingLoop { node });
        }
        let neighbors = self.local_complement(node)?;
        self.advance_all(&neighbors);
        let decoration = self.decoration_mut(node)?;
        decoration.hollow = !decoration.hollow;
        decoration.sign = !decoration.sign;
        if decoration.sign {
            self.flip_signs(&neighbors);
        }
        Ok(())
    }

    /// Rule E2: pivot on the edge `a - b` of two loopless nodes.
    ///
    /// Both endpoints toggle their fill; the represented state does not
    /// change.
    pub fn equivalent_graph_e2(&mut self, a: NodeId, b: NodeId) -> GraphResult<()> {
        let (deco_a, deco_b) = (self.decoration(a)?, self.decoration(b)?);
        if !self.graph.has_edge(a, b) {
            return Err(StructuralError::EdgeNotFound {
                a: a.min(b),
                b: a.max(b),
            });
        }
        for (node, decoration) in [(a, deco_a), (b, deco_b)] {
            if decoration.looped {
                return Err(StructuralError::UnexpectedLoop { node });
            }
        }

        let common: Vec<NodeId> = self
            .graph
            .neighbors(a)?
            .intersection(self.graph.neighbors(b)?)
            .copied()
            .collect();
        local_complement(&mut self.graph, a)?;
        local_complement(&mut self.graph, b)?;
        local_complement(&mut self.graph, a)?;

        self.h(a)?;
        self.h(b)?;
        self.flip_signs(&common);
        for (node, decoration) in [(a, deco_a), (b, deco_b)] {
            if decoration.sign {
                self.flip_sign(node);
                let neighbors = self.neighbor_list(node)?;
                self.flip_signs(&neighbors);
            }
        }
        Ok(())
    }

    /// Make `node` solid (not hollow) using E1 and E2.
    ///
    /// Returns `false` when the node is hollow, loopless and isolated: it
    /// is then a Z eigenstate and cannot be filled.
    pub fn equivalent_fill_node(&mut self, node: NodeId) -> GraphResult<bool> {
        let decoration = self.decoration(node)?;
        if !decoration.hollow {
            return Ok(true);
        }
        if decoration.looped {
            self.equivalent_graph_e1(node)?;
            return Ok(true);
        }

        let neighbors = self.neighbor_list(node)?;
        let Some(&first) = neighbors.first() else {
            return Ok(false);
        };
        let loopless = neighbors
            .iter()
            .copied()
            .find(|b| self.decorations.get(b).is_some_and(|d| !d.looped));
        match loopless {
            Some(b) => self.equivalent_graph_e2(node, b)?,
            None => {
                // E1 on a neighbor advances the node, giving it a loop
                self.equivalent_graph_e1(first)?;
                self.equivalent_graph_e1(node)?;
            }
        }
        Ok(true)
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Measure `node` along `axis` and remove it.
    ///
    /// `outcome` selects the post-measurement branch (`true` for eigenvalue
    /// -1). When the outcome is deterministic the requested one is ignored.
    /// Returns the outcome that was applied.
    pub fn measure(&mut self, node: NodeId, axis: Pauli, outcome: bool) -> GraphResult<bool> {
        match axis {
            Pauli::X => self.measure_x(node, outcome),
            Pauli::Y => self.measure_y(node, outcome),
            Pauli::Z => self.measure_z(node, outcome),
        }
    }

    /// Measure `node` in the X basis: a Hadamard, then a Z measurement.
    pub fn measure_x(&mut self, node: NodeId, outcome: bool) -> GraphResult<bool> {
        self.h(node)?;
        self.measure_z(node, outcome)
    }

    /// Measure `node` in the Y basis: `S^dagger` and a Hadamard, then a Z
    /// measurement.
    pub fn measure_y(&mut self, node: NodeId, outcome: bool) -> GraphResult<bool> {
        self.s(node)?;
        self.z(node)?;
        self.h(node)?;
        self.measure_z(node, outcome)
    }

    /// Measure `node` in the Z basis.
    pub fn measure_z(&mut self, node: NodeId, outcome: bool) -> GraphResult<bool> {
        let applied = if self.equivalent_fill_node(node)? {
            if outcome {
                let neighbors = self.neighbor_list(node)?;
                self.flip_signs(&neighbors);
            }
            outcome
        } else {
            self.decoration(node)?.sign
        };
        self.graph.remove_node(node)?;
        self.decorations.remove(&node);
        debug!(node = node.0, outcome = applied, nodes = self.num_nodes(), "z measurement");
        Ok(applied)
    }

    fn decoration_mut(&mut self, node: NodeId) -> GraphResult<&mut Decoration> {
        self.decorations
            .get_mut(&node)
            .ok_or(StructuralError::NodeNotFound {
                node,
                context: Some("decoration"),
            })
    }

    fn neighbor_list(&self, node: NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(self.graph.neighbors(node)?.iter().copied().collect())
    }

    fn flip_sign(&mut self, node: NodeId) {
        if let Some(decoration) = self.decorations.get_mut(&node) {
            decoration.sign = !decoration.sign;
        }
    }

    fn flip_signs(&mut self, nodes: &[NodeId]) {
        for &node in nodes {
            self.flip_sign(node);
        }
    }

    fn advance_all(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            if let Some(decoration) = self.decorations.get_mut(node) {
                decoration.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: u32, edges: &[(u32, u32)]) -> GraphState {
        GraphState::from_edges(
            (0..n).map(NodeId),
            edges.iter().map(|&(a, b)| (NodeId(a), NodeId(b))),
        )
        .unwrap()
    }

    fn edge_list(graph: &GraphState) -> Vec<(u32, u32)> {
        graph.edges().map(|(a, b)| (a.0, b.0)).collect()
    }

    #[test]
    fn test_local_complement_cycle() {
        let mut g = graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
        local_complement(&mut g, NodeId(1)).unwrap();
        let expected = graph(6, &[(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 0)]);
        assert_eq!(g, expected);
    }

    #[test]
    fn test_local_complement_is_involution() {
        let original = graph(5, &[(0, 1), (0, 2), (0, 3), (2, 3), (3, 4)]);
        let mut g = original.clone();
        local_complement(&mut g, NodeId(0)).unwrap();
        assert_ne!(g, original);
        local_complement(&mut g, NodeId(0)).unwrap();
        assert_eq!(g, original);
    }

    #[test]
    fn test_z_measurement_deletes_node() {
        let mut g = graph(3, &[(0, 1), (1, 2)]);
        let rewrite = measure_pauli(&mut g, NodeId(1), Pauli::Z).unwrap();
        assert_eq!(rewrite.pivot, None);
        assert_eq!(g.num_nodes(), 2);
        assert_eq!(g.num_edges(), 0);
    }

    #[test]
    fn test_y_measurement_connects_neighbors() {
        let mut g = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        measure_pauli(&mut g, NodeId(0), Pauli::Y).unwrap();
        assert_eq!(edge_list(&g), vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_x_measurement_on_path_fuses_neighbors() {
        // X on the middle of a 3-chain leaves the ends joined up to local Cliffords
        let mut g = graph(3, &[(0, 1), (1, 2)]);
        let rewrite = measure_pauli(&mut g, NodeId(1), Pauli::X).unwrap();
        assert_eq!(rewrite.pivot, Some(NodeId(0)));
        // LC(0): no change (deg 1); LC(1): adds (0,2); remove 1; LC(0): no change
        assert_eq!(edge_list(&g), vec![(0, 2)]);
    }

    #[test]
    fn test_x_measurement_isolated_node() {
        let mut g = graph(2, &[]);
        let rewrite = measure_pauli(&mut g, NodeId(0), Pauli::X).unwrap();
        assert_eq!(rewrite.pivot, None);
        assert_eq!(g.num_nodes(), 1);
    }

    fn sim(n: u32, edges: &[(u32, u32)]) -> GraphSim {
        GraphSim::from_edges(
            (0..n).map(NodeId),
            edges.iter().map(|&(a, b)| (NodeId(a), NodeId(b))),
        )
        .unwrap()
    }

    fn deco(hollow: bool, looped: bool, sign: bool) -> Decoration {
        Decoration {
            hollow,
            looped,
            sign,
        }
    }

    #[test]
    fn test_gates_on_solid_nodes() {
        let mut s = sim(2, &[(0, 1)]);
        s.h(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(true, false, false));
        s.h(NodeId(0)).unwrap();

        // S S = Z
        s.s(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(false, true, false));
        s.s(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(false, false, true));
        s.z(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), Decoration::default());
        assert_eq!(s.decoration(NodeId(1)).unwrap(), Decoration::default());
    }

    #[test]
    fn test_z_on_hollow_node_flips_neighbors() {
        let mut s = sim(3, &[(0, 1), (0, 2)]);
        s.set_decoration(NodeId(0), deco(true, false, false)).unwrap();
        s.z(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(true, false, false));
        assert!(s.decoration(NodeId(1)).unwrap().sign);
        assert!(s.decoration(NodeId(2)).unwrap().sign);
    }

    #[test]
    fn test_s_on_hollow_node_complements() {
        let mut s = sim(3, &[(0, 1), (0, 2)]);
        s.set_decoration(NodeId(0), deco(true, false, false)).unwrap();
        s.s(NodeId(0)).unwrap();
        assert!(s.graph().has_edge(NodeId(1), NodeId(2)));
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(true, false, false));
        assert_eq!(s.decoration(NodeId(1)).unwrap(), deco(false, true, false));
        assert_eq!(s.decoration(NodeId(2)).unwrap(), deco(false, true, false));
    }

    #[test]
    fn test_e1_requires_loop() {
        let mut s = sim(2, &[(0, 1)]);
        assert_eq!(
            s.equivalent_graph_e1(NodeId(0)),
            Err(StructuralError::MissingLoop { node: NodeId(0) })
        );

        s.set_decoration(NodeId(0), deco(false, true, false)).unwrap();
        s.equivalent_graph_e1(NodeId(0)).unwrap();
        assert_eq!(s.decoration(NodeId(0)).unwrap(), deco(true, true, true));
        assert_eq!(s.decoration(NodeId(1)).unwrap(), deco(false, true, true));
    }

    #[test]
    fn test_e2_preconditions() {
        let mut s = sim(3, &[(0, 1)]);
        assert_eq!(
            s.equivalent_graph_e2(NodeId(2), NodeId(0)),
            Err(StructuralError::EdgeNotFound {
                a: NodeId(0),
                b: NodeId(2)
            })
        );
        s.set_decoration(NodeId(1), deco(false, true, false)).unwrap();
        assert_eq!(
            s.equivalent_graph_e2(NodeId(0), NodeId(1)),
            Err(StructuralError::UnexpectedLoop { node: NodeId(1) })
        );
    }

    #[test]
    fn test_e2_swaps_neighborhoods() {
        // 2 - 0 - 1 - 3
        let mut s = sim(4, &[(0, 1), (0, 2), (1, 3)]);
        s.equivalent_graph_e2(NodeId(0), NodeId(1)).unwrap();
        let edges: Vec<(u32, u32)> = s.graph().edges().map(|(a, b)| (a.0, b.0)).collect();
        assert_eq!(edges, vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
        assert!(s.decoration(NodeId(0)).unwrap().hollow);
        assert!(s.decoration(NodeId(1)).unwrap().hollow);
    }

    #[test]
    fn test_fill_isolated_hollow_node() {
        let mut s = sim(1, &[]);
        s.set_decoration(NodeId(0), deco(true, false, true)).unwrap();
        assert!(!s.equivalent_fill_node(NodeId(0)).unwrap());
        // H Z |+> = |1>: the Z outcome is fixed whatever is requested
        assert!(s.measure_z(NodeId(0), false).unwrap());
        assert_eq!(s.num_nodes(), 0);
    }

    #[test]
    fn test_fill_through_looped_neighbors() {
        let mut s = sim(2, &[(0, 1)]);
        s.set_decoration(NodeId(0), deco(true, false, false)).unwrap();
        s.set_decoration(NodeId(1), deco(false, true, false)).unwrap();
        assert!(s.equivalent_fill_node(NodeId(0)).unwrap());
        assert!(!s.decoration(NodeId(0)).unwrap().hollow);
    }

    #[test]
    fn test_x_measurement_of_plus_state_is_deterministic() {
        let mut s = sim(1, &[]);
        assert!(!s.measure_x(NodeId(0), true).unwrap());
    }

    #[test]
    fn test_z_outcome_flips_neighbors() {
        let mut s = sim(3, &[(0, 1), (1, 2)]);
        assert!(s.measure(NodeId(1), Pauli::Z, true).unwrap());
        assert_eq!(s.graph().num_edges(), 0);
        assert!(s.decoration(NodeId(0)).unwrap().sign);
        assert!(s.decoration(NodeId(2)).unwrap().sign);
        assert!(matches!(
            s.decoration(NodeId(1)),
            Err(StructuralError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_measuring_output_rejected() {
        let mut g = graph(2, &[(0, 1)]);
        g.mark_output(NodeId(1)).unwrap();
        assert!(matches!(
            measure_pauli(&mut g, NodeId(1), Pauli::Z),
            Err(StructuralError::MeasurementOnOutput { .. })
        ));
    }
}
