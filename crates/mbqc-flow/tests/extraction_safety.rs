//! Integration tests for the runtime safety of extracted patterns.
//!
//! These tests replay extracted patterns and check that every correction
//! is exactly the byproduct its flow predicts, that no node is touched after
//! it is measured, and that signals are only consumed once available.

use std::collections::BTreeSet;

use mbqc_flow::{
    CorrectionMode, Extractor, Flow, FlowError, FlowKind, PreparationStrategy, extract_pattern,
    find_flow,
};
use mbqc_ir::{
    Command, CommandKind, GraphAlgorithms, GraphState, Measurement, NativeAlgorithms, NodeId,
    Pattern, Pauli,
};

fn n(id: u32) -> NodeId {
    NodeId(id)
}

/// Helper: build an open graph with every measured node in XY at angle 0.
fn open_graph(num_nodes: u32, edges: &[(u32, u32)], inputs: &[u32], outputs: &[u32]) -> GraphState {
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

/// Helper: 2 x `cols` ladder with inputs on the left and outputs on the right.
fn ladder(cols: u32) -> GraphState {
    let mut edges = Vec::new();
    for c in 0..cols {
        edges.push((c, cols + c));
        if c + 1 < cols {
            edges.push((c, c + 1));
            edges.push((cols + c, cols + c + 1));
        }
    }
    open_graph(2 * cols, &edges, &[0, cols], &[cols - 1, 2 * cols - 1])
}

/// Helper: three inputs and three outputs with a gflow but no causal flow.
fn gflow_only() -> GraphState {
    open_graph(
        6,
        &[(0, 3), (1, 3), (1, 4), (2, 4), (0, 5), (1, 5), (2, 5)],
        &[0, 1, 2],
        &[3, 4, 5],
    )
}

/// Helper: a path with measurements in all three planes.
fn mixed_planes() -> GraphState {
    // 0 - 1 - 2, output 2, no inputs
    let mut g = open_graph(3, &[(0, 1), (1, 2)], &[], &[2]);
    g.set_measurement(n(0), Measurement::yz(0.25)).unwrap();
    g.set_measurement(n(1), Measurement::xy(0.5)).unwrap();
    g
}

/// Helper: position of the measurement of `node`, if any.
fn measure_position(pattern: &Pattern, node: NodeId) -> Option<usize> {
    pattern
        .iter()
        .position(|c| matches!(c, Command::Measure { node: m, .. } if *m == node))
}

/// Helper: check every correction against the flow it was extracted from.
fn assert_corrections_match_flow(graph: &GraphState, flow: &Flow, pattern: &Pattern) {
    let algos = NativeAlgorithms::new(graph);
    for command in pattern.iter() {
        let Command::Correct {
            node,
            pauli,
            trigger,
        } = command
        else {
            continue;
        };
        let set = flow.correction_set(*trigger).expect("trigger has no correction set");
        let odd = algos.odd_neighborhood(set);
        let expected = Pauli::from_components(set.contains(node), odd.contains(node));
        assert_eq!(
            Some(*pauli),
            expected,
            "correction {command} does not match the flow of node {trigger}"
        );
    }
}

/// Helper: every target of every command is alive when the command runs.
fn assert_nothing_after_measurement(pattern: &Pattern) {
    let mut measured = BTreeSet::new();
    for command in pattern.iter() {
        for target in command.targets() {
            assert!(
                !measured.contains(&target),
                "{command} touches node {target} after its measurement"
            );
        }
        if let Command::Measure { node, .. } = command {
            measured.insert(*node);
        }
    }
}

// ============================================================================
// Test 1: Corrections are exactly the flow byproducts
// ============================================================================

#[test]
fn test_corrections_match_causal_flow() {
    let graph = ladder(4);
    let flow = find_flow(&graph).unwrap();
    assert_eq!(flow.kind(), FlowKind::Causal);
    let pattern = extract_pattern(&graph, &flow).unwrap();
    assert_corrections_match_flow(&graph, &flow, &pattern);
}

#[test]
fn test_corrections_match_gflow() {
    let graph = gflow_only();
    let flow = find_flow(&graph).unwrap();
    assert_eq!(flow.kind(), FlowKind::Generalized);
    let pattern = extract_pattern(&graph, &flow).unwrap();
    assert_corrections_match_flow(&graph, &flow, &pattern);

    // C(1) = {3, 4, 5} and Odd(C(1)) = {1}: only X corrections from node 1
    let from_one: Vec<String> = pattern
        .iter()
        .filter(|c| matches!(c, Command::Correct { trigger, .. } if *trigger == n(1)))
        .map(ToString::to_string)
        .collect();
    assert_eq!(from_one, vec!["X(3;1)", "X(4;1)", "X(5;1)"]);
}

#[test]
fn test_corrections_match_mixed_planes() {
    let graph = mixed_planes();
    let flow = find_flow(&graph).unwrap();
    assert_eq!(flow.kind(), FlowKind::Generalized);
    let pattern = extract_pattern(&graph, &flow).unwrap();
    assert_corrections_match_flow(&graph, &flow, &pattern);
}

// ============================================================================
// Test 2: No node is touched after its measurement
// ============================================================================

#[test]
fn test_no_command_after_measurement() {
    for graph in [ladder(2), ladder(5), gflow_only(), mixed_planes()] {
        let flow = find_flow(&graph).unwrap();
        for preparation in [PreparationStrategy::Lazy, PreparationStrategy::Upfront] {
            let pattern = Extractor::new()
                .with_preparation(preparation)
                .extract(&graph, &flow)
                .unwrap();
            assert_nothing_after_measurement(&pattern);
        }
    }
}

#[test]
fn test_corrections_follow_their_trigger() {
    let graph = ladder(4);
    let flow = find_flow(&graph).unwrap();
    let pattern = extract_pattern(&graph, &flow).unwrap();
    for (i, command) in pattern.iter().enumerate() {
        if let Command::Correct { trigger, .. } = command {
            let at = measure_position(&pattern, *trigger).unwrap();
            assert!(at < i, "{command} runs before its trigger is measured");
        }
    }
}

// ============================================================================
// Test 3: Measurement order respects the flow
// ============================================================================

#[test]
fn test_measurement_order_respects_flow() {
    for graph in [ladder(5), gflow_only(), mixed_planes()] {
        let flow = find_flow(&graph).unwrap();
        let pattern = extract_pattern(&graph, &flow).unwrap();
        let order = pattern.measurement_order();
        assert_eq!(order, flow.linearize());
        for (i, &earlier) in order.iter().enumerate() {
            for &later in &order[i + 1..] {
                assert!(
                    !flow.precedes(later, earlier),
                    "{later} must be measured before {earlier}"
                );
            }
        }
    }
}

// ============================================================================
// Test 4: Folded signals are available when consumed
// ============================================================================

#[test]
fn test_folded_domains_are_measured_first() {
    for graph in [ladder(4), gflow_only()] {
        let flow = find_flow(&graph).unwrap();
        let pattern = Extractor::new()
            .with_corrections(CorrectionMode::Folded)
            .extract(&graph, &flow)
            .unwrap();
        assert!(pattern.check_runnable().is_ok());

        for (i, command) in pattern.iter().enumerate() {
            if let Command::Measure {
                s_domain, t_domain, ..
            } = command
            {
                for signal in s_domain.iter().chain(t_domain) {
                    let at = measure_position(&pattern, *signal).unwrap();
                    assert!(at < i, "{command} consumes signal {signal} too early");
                }
            }
        }
    }
}

#[test]
fn test_folding_preserves_measurements() {
    let graph = ladder(4);
    let flow = find_flow(&graph).unwrap();
    let explicit = extract_pattern(&graph, &flow).unwrap();
    let folded = explicit.fold_corrections();
    assert_eq!(explicit.measurement_order(), folded.measurement_order());
    assert_eq!(
        explicit.count(CommandKind::Entangle),
        folded.count(CommandKind::Entangle)
    );
    assert!(folded.num_corrections() <= explicit.num_corrections());
}

// ============================================================================
// Test 5: Invalid flows are never extracted
// ============================================================================

#[test]
fn test_flow_from_other_graph_rejected() {
    let flow = find_flow(&ladder(3)).unwrap();
    let err = extract_pattern(&ladder(4), &flow).unwrap_err();
    assert!(matches!(err, FlowError::InvalidFlow { .. }));
}

#[test]
fn test_flow_for_changed_measurement_rejected() {
    let graph = mixed_planes();
    let flow = find_flow(&graph).unwrap();

    // the correction set of node 0 only fits the YZ plane
    let mut changed = graph.clone();
    changed.set_measurement(n(0), Measurement::xy(0.25)).unwrap();
    let err = extract_pattern(&changed, &flow).unwrap_err();
    assert!(matches!(err, FlowError::InvalidFlow { node: Some(node), .. } if node == n(0)));
}
