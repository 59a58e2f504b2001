//! Causal flow search.
//!
//! Layered search from the outputs backwards. A corrector is a node that
//! already has its level and can still be the partner of one measured node.
//! In every round each corrector whose unprocessed neighborhood is a single
//! node claims that node. The search finds a causal flow whenever one exists
//! and the flow it returns has minimal depth.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use mbqc_ir::{GraphAlgorithms, GraphState, NodeId, Plane};

use crate::error::{FlowError, FlowResult};
use crate::flow::{Flow, FlowKind};

/// Check if causal flow search applies: every measured node is in XY.
pub fn applicable(graph: &GraphState) -> bool {
    graph
        .measured_nodes()
        .into_iter()
        .all(|n| graph.measurement(n).is_some_and(|m| m.plane == Plane::XY))
}

/// Find a causal flow.
///
/// Correctors are visited in ascending id order and the first one to claim
/// a node wins, so among competing partners the smallest id is chosen.
/// `max_layers` bounds the number of rounds; hitting it yields an
/// inconclusive [`FlowError::NoDeterministicFlow`].
pub fn find_causal_flow(
    graph: &GraphState,
    algos: &dyn GraphAlgorithms,
    max_layers: Option<usize>,
) -> FlowResult<Flow> {
    let measured = graph.measured_nodes();
    let mut levels: BTreeMap<NodeId, usize> = graph.outputs().into_iter().map(|n| (n, 0)).collect();
    let mut corrections: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();

    if !applicable(graph) {
        debug!("causal flow not applicable: graph has measurements outside the XY plane");
        return Err(no_flow(&measured, &corrections, true));
    }

    let mut correctors: BTreeSet<NodeId> = graph.outputs().difference(&graph.inputs()).copied().collect();
    let mut round = 1;

    while corrections.len() < measured.len() {
        if max_layers.is_some_and(|max| round > max) {
            debug!(round, "causal flow search hit the layer bound");
            return Err(no_flow(&measured, &corrections, false));
        }

        let mut claimed: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut retired = BTreeSet::new();
        for &c in &correctors {
            let mut open = algos
                .neighbors(c)
                .into_iter()
                .filter(|n| !levels.contains_key(n));
            let (Some(v), None) = (open.next(), open.next()) else {
                continue;
            };
            if claimed.contains_key(&v) {
                continue;
            }
            claimed.insert(v, c);
            retired.insert(c);
        }

        if claimed.is_empty() {
            break;
        }
        debug!(round, nodes = claimed.len(), "causal flow layer");

        for (&v, &c) in &claimed {
            levels.insert(v, round);
            corrections.insert(v, BTreeSet::from([c]));
        }
        correctors.retain(|c| !retired.contains(c));
        correctors.extend(claimed.keys().copied().filter(|v| !graph.is_input(*v)));
        round += 1;
    }

    if corrections.len() < measured.len() {
        return Err(no_flow(&measured, &corrections, true));
    }
    Ok(Flow::from_parts(FlowKind::Causal, corrections, levels))
}

fn no_flow(
    measured: &BTreeSet<NodeId>,
    corrections: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    exhaustive: bool,
) -> FlowError {
    FlowError::NoDeterministicFlow {
        strategy: FlowKind::Causal,
        unassigned: measured
            .iter()
            .copied()
            .filter(|n| !corrections.contains_key(n))
            .collect(),
        assigned: corrections.len(),
        exhaustive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_ir::{Measurement, NativeAlgorithms};

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    fn open_graph(
        num_nodes: u32,
        edges: &[(u32, u32)],
        inputs: &[u32],
        outputs: &[u32],
    ) -> GraphState {
        let mut g = GraphState::from_edges(
            (0..num_nodes).map(NodeId),
            edges.iter().map(|&(a, b)| (n(a), n(b))),
        )
        .unwrap();
        for &i in inputs {
            g.mark_input(n(i)).unwrap();
        }
        for &o in outputs {
            g.mark_output(n(o)).unwrap();
        }
        for node in g.measured_nodes() {
            g.set_measurement(node, Measurement::xy(0.0)).unwrap();
        }
        g
    }

    fn find(graph: &GraphState) -> FlowResult<Flow> {
        find_causal_flow(graph, &NativeAlgorithms::new(graph), None)
    }

    #[test]
    fn test_path() {
        let graph = open_graph(4, &[(0, 1), (1, 2), (2, 3)], &[0], &[3]);
        let flow = find(&graph).unwrap();
        assert_eq!(flow.kind(), FlowKind::Causal);
        assert_eq!(flow.causal_partner(n(0)), Some(n(1)));
        assert_eq!(flow.causal_partner(n(1)), Some(n(2)));
        assert_eq!(flow.causal_partner(n(2)), Some(n(3)));
        assert_eq!(flow.level(n(0)), Some(3));
        assert_eq!(flow.level(n(3)), Some(0));
    }

    #[test]
    fn test_two_wires_share_layers() {
        // 0-1-2 and 3-4-5, inputs {0, 3}, outputs {2, 5}
        let graph = open_graph(6, &[(0, 1), (1, 2), (3, 4), (4, 5)], &[0, 3], &[2, 5]);
        let flow = find(&graph).unwrap();
        assert_eq!(flow.depth(), 2);
        assert_eq!(flow.level(n(1)), Some(1));
        assert_eq!(flow.level(n(4)), Some(1));
    }

    #[test]
    fn test_smallest_corrector_wins() {
        // 0 is measured, both outputs 1 and 2 see only 0
        let graph = open_graph(3, &[(0, 1), (0, 2)], &[], &[1, 2]);
        let flow = find(&graph).unwrap();
        assert_eq!(flow.causal_partner(n(0)), Some(n(1)));
    }

    #[test]
    fn test_triangle_has_no_causal_flow() {
        let graph = open_graph(3, &[(0, 1), (1, 2), (0, 2)], &[0], &[2]);
        match find(&graph) {
            Err(FlowError::NoDeterministicFlow {
                strategy,
                unassigned,
                assigned,
                exhaustive,
            }) => {
                assert_eq!(strategy, FlowKind::Causal);
                assert_eq!(unassigned, vec![n(0), n(1)]);
                assert_eq!(assigned, 0);
                assert!(exhaustive);
            }
            other => panic!("expected NoDeterministicFlow, got {other:?}"),
        }
    }

    #[test]
    fn test_layer_bound_is_inconclusive() {
        let graph = open_graph(4, &[(0, 1), (1, 2), (2, 3)], &[0], &[3]);
        let algos = NativeAlgorithms::new(&graph);
        match find_causal_flow(&graph, &algos, Some(2)) {
            Err(FlowError::NoDeterministicFlow {
                assigned,
                exhaustive,
                ..
            }) => {
                assert_eq!(assigned, 2);
                assert!(!exhaustive);
            }
            other => panic!("expected inconclusive search, got {other:?}"),
        }
        assert!(find_causal_flow(&graph, &algos, Some(3)).is_ok());
    }

    #[test]
    fn test_not_applicable_outside_xy() {
        let mut graph = open_graph(2, &[(0, 1)], &[], &[1]);
        graph.set_measurement(n(0), Measurement::yz(0.0)).unwrap();
        assert!(!applicable(&graph));
        assert!(find(&graph).is_err());
    }

    #[test]
    fn test_only_outputs() {
        let graph = open_graph(2, &[(0, 1)], &[], &[0, 1]);
        let flow = find(&graph).unwrap();
        assert_eq!(flow.num_measured(), 0);
        assert_eq!(flow.depth(), 0);
    }
}
