//! Integration tests for the demo suite.
//!
//! These tests run every fixture through the full compiler and check the
//! results the demos print.

use std::collections::BTreeSet;

use mbqc_demos::format_layers;
use mbqc_demos::graphs::{Fixture, gflow_only, ladder, linear_cluster, mixed_planes, triangle};
use mbqc_flow::{
    CorrectionMode, FlowError, FlowKind, FlowSearch, PatternCompiler, PatternCompilerBuilder,
    PreparationStrategy,
};
use mbqc_ir::{AlgorithmBackend, CommandKind, GraphRecord, GraphState, NodeId, Pattern};

fn ids(raw: &[u32]) -> BTreeSet<NodeId> {
    raw.iter().copied().map(NodeId).collect()
}

/// Test that every fixture compiles exactly when it is expected to.
#[test]
fn test_all_fixtures() {
    let compiler = PatternCompiler::new();
    for fixture in Fixture::ALL {
        let graph = fixture.build(4).unwrap();
        let result = compiler.compile(&graph);
        assert_eq!(
            result.is_ok(),
            fixture.has_flow(),
            "unexpected result for {fixture}: {result:?}"
        );
    }
}

/// Test the pinned pattern of a four-node linear cluster.
#[test]
fn test_linear_cluster_pattern() {
    let mut graph = linear_cluster(4).unwrap();
    for i in 0..3 {
        graph
            .set_measurement(NodeId(i), mbqc_ir::Measurement::xy(0.0))
            .unwrap();
    }
    let compiled = PatternCompiler::new().compile(&graph).unwrap();
    assert_eq!(compiled.flow.kind(), FlowKind::Causal);
    assert_eq!(
        compiled.pattern.to_string(),
        "N(1) E(0,1) N(2) E(1,2) N(3) E(2,3) \
         M(0,XY,0) X(1;0) Z(2;0) \
         M(1,XY,0) X(2;1) Z(3;1) \
         M(2,XY,0) X(3;2)"
    );
}

/// Test that the gflow fixture needs gflow and gets the known correction sets.
#[test]
fn test_gflow_fixture() {
    let graph = gflow_only().unwrap();

    let causal = PatternCompilerBuilder::new()
        .with_search(FlowSearch::CausalOnly)
        .build()
        .compile(&graph);
    assert!(matches!(causal, Err(FlowError::NoDeterministicFlow { .. })));

    let compiled = PatternCompiler::new().compile(&graph).unwrap();
    let flow = &compiled.flow;
    assert_eq!(flow.kind(), FlowKind::Generalized);
    assert_eq!(flow.correction_set(NodeId(0)), Some(&ids(&[4, 5])));
    assert_eq!(flow.correction_set(NodeId(1)), Some(&ids(&[3, 4, 5])));
    assert_eq!(flow.correction_set(NodeId(2)), Some(&ids(&[3, 5])));
}

/// Test the triangle fixture under every search strategy.
#[test]
fn test_triangle_has_no_flow() {
    for search in [
        FlowSearch::CausalThenGflow,
        FlowSearch::CausalOnly,
        FlowSearch::GflowOnly,
    ] {
        let result = PatternCompilerBuilder::new()
            .with_search(search)
            .build()
            .compile(&triangle().unwrap());
        match result {
            Err(FlowError::NoDeterministicFlow { exhaustive, .. }) => assert!(exhaustive),
            other => panic!("expected no flow for {search}, got {other:?}"),
        }
    }
}

/// Test the mixed-plane fixture layers and measurement order.
#[test]
fn test_mixed_planes() {
    let compiled = PatternCompiler::new().compile(&mixed_planes().unwrap()).unwrap();
    assert_eq!(compiled.flow.kind(), FlowKind::Generalized);
    assert_eq!(compiled.flow.correction_set(NodeId(0)), Some(&ids(&[0, 2])));
    assert_eq!(compiled.flow.correction_set(NodeId(1)), Some(&ids(&[0, 1])));
    assert_eq!(compiled.flow.correction_set(NodeId(2)), Some(&ids(&[3])));
    assert_eq!(
        compiled.pattern.measurement_order(),
        vec![NodeId(1), NodeId(0), NodeId(2)]
    );
    assert_eq!(
        format_layers(&compiled),
        vec!["3: 1", "2: 0", "1: 2", "0: 3"]
    );
}

/// Test that every strategy combination yields a runnable pattern.
#[test]
fn test_strategy_matrix() {
    let graph = ladder(4).unwrap();
    for backend in [AlgorithmBackend::Native, AlgorithmBackend::Accelerated] {
        for preparation in [PreparationStrategy::Lazy, PreparationStrategy::Upfront] {
            for corrections in [CorrectionMode::Explicit, CorrectionMode::Folded] {
                let compiled = PatternCompilerBuilder::new()
                    .with_backend(backend)
                    .with_preparation(preparation)
                    .with_corrections(corrections)
                    .build()
                    .compile(&graph)
                    .unwrap();
                assert!(compiled.pattern.check_runnable().is_ok());
                assert_eq!(compiled.pattern.num_measurements(), 6);
                assert_eq!(compiled.pattern.count(CommandKind::Entangle), 10);
            }
        }
    }
}

/// Test that a graph record file round-trips into the same compiled pattern.
#[test]
fn test_graph_record_roundtrip() {
    let graph = ladder(3).unwrap();
    let json = serde_json::to_string(&GraphRecord::from(graph.clone())).unwrap();
    let record: GraphRecord = serde_json::from_str(&json).unwrap();
    let loaded = GraphState::try_from(record).unwrap();
    assert_eq!(loaded, graph);

    let compiler = PatternCompiler::new();
    let original = compiler.compile(&graph).unwrap();
    let reloaded = compiler.compile(&loaded).unwrap();
    assert_eq!(original.pattern, reloaded.pattern);

    let pattern_json = original.pattern.to_json().unwrap();
    assert_eq!(Pattern::from_json(&pattern_json).unwrap(), original.pattern);
}
