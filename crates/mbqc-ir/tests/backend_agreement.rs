//! Property-based tests that both graph algorithm backends agree.
//!
//! Flow finding relies on exact answers, so every query must return the
//! same value on the native and the petgraph implementation.
#![cfg(feature = "accelerated")]

use std::collections::BTreeSet;

use mbqc_ir::{AcceleratedAlgorithms, GraphAlgorithms, GraphState, NativeAlgorithms, NodeId};
use proptest::prelude::*;

/// Generate a random simple graph with 1-10 nodes.
fn arb_graph() -> impl Strategy<Value = GraphState> {
    (1_u32..=10).prop_flat_map(|num_nodes| {
        let num_pairs = (num_nodes * (num_nodes - 1) / 2) as usize;
        prop::collection::vec(prop::bool::weighted(0.3), num_pairs).prop_map(move |bits| {
            let pairs = (0..num_nodes).flat_map(|a| (a + 1..num_nodes).map(move |b| (a, b)));
            let edges = pairs
                .zip(bits)
                .filter(|(_, bit)| *bit)
                .map(|((a, b), _)| (NodeId(a), NodeId(b)));
            GraphState::from_edges((0..num_nodes).map(NodeId), edges).unwrap()
        })
    })
}

/// A random graph together with a subset of node ids (some may be unknown).
fn arb_graph_and_subset() -> impl Strategy<Value = (GraphState, BTreeSet<NodeId>)> {
    arb_graph().prop_flat_map(|graph| {
        let bound = graph.num_nodes() as u32 + 2;
        (
            Just(graph),
            prop::collection::btree_set((0..bound).prop_map(NodeId), 0..6),
        )
    })
}

proptest! {
    /// Odd neighborhoods and neighbors agree for arbitrary subsets.
    #[test]
    fn test_odd_neighborhood_agrees((graph, subset) in arb_graph_and_subset()) {
        let native = NativeAlgorithms::new(&graph);
        let accelerated = AcceleratedAlgorithms::new(&graph);

        prop_assert_eq!(native.odd_neighborhood(&subset), accelerated.odd_neighborhood(&subset));
        for &node in &subset {
            prop_assert_eq!(native.neighbors(node), accelerated.neighbors(node));
        }
    }

    /// Connectivity of induced subgraphs agrees.
    #[test]
    fn test_is_connected_agrees((graph, subset) in arb_graph_and_subset()) {
        let native = NativeAlgorithms::new(&graph);
        let accelerated = AcceleratedAlgorithms::new(&graph);

        prop_assert_eq!(native.is_connected(&subset), accelerated.is_connected(&subset));
    }

    /// Shortest paths agree, including the tie-break between equal lengths.
    #[test]
    fn test_shortest_path_agrees(graph in arb_graph(), from in 0_u32..12, to in 0_u32..12) {
        let native = NativeAlgorithms::new(&graph);
        let accelerated = AcceleratedAlgorithms::new(&graph);

        let path = native.shortest_path(NodeId(from), NodeId(to));
        prop_assert_eq!(&path, &accelerated.shortest_path(NodeId(from), NodeId(to)));
        if let Some(path) = path {
            prop_assert_eq!(path.first().copied(), Some(NodeId(from)));
            prop_assert_eq!(path.last().copied(), Some(NodeId(to)));
            for pair in path.windows(2) {
                prop_assert!(graph.has_edge(pair[0], pair[1]));
            }
        }
    }

    /// Connected components agree and partition the nodes.
    #[test]
    fn test_components_agree(graph in arb_graph()) {
        let native = NativeAlgorithms::new(&graph);
        let accelerated = AcceleratedAlgorithms::new(&graph);

        let components = native.connected_components();
        prop_assert_eq!(&components, &accelerated.connected_components());

        let total: usize = components.iter().map(BTreeSet::len).sum();
        prop_assert_eq!(total, graph.num_nodes());
        for component in &components {
            prop_assert!(native.is_connected(component));
        }
    }
}
