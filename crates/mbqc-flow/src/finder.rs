//! Flow finding entry point.

use tracing::{debug, error, info, instrument, warn};

use mbqc_ir::algorithms::select;
use mbqc_ir::{AlgorithmBackend, GraphAlgorithms, GraphState};

use crate::causal::{applicable, find_causal_flow};
use crate::config::{FlowConfig, FlowSearch};
use crate::error::{FlowError, FlowResult};
use crate::flow::Flow;
use crate::gflow::find_gflow;
use crate::verify::verify;

/// Finds a flow for a graph state.
///
/// The default search tries causal flow first and falls back to gflow.
/// Every flow returned has been verified against the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowFinder {
    search: FlowSearch,
    backend: AlgorithmBackend,
    max_layers: Option<usize>,
}

impl FlowFinder {
    /// Create a finder with the default search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finder from configuration.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            search: config.search,
            backend: config.backend,
            max_layers: config.max_layers,
        }
    }

    /// Set the search strategy.
    #[must_use]
    pub fn with_search(mut self, search: FlowSearch) -> Self {
        self.search = search;
        self
    }

    /// Set the graph algorithms backend.
    #[must_use]
    pub fn with_backend(mut self, backend: AlgorithmBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Bound the number of search rounds.
    #[must_use]
    pub fn with_max_layers(mut self, max_layers: Option<usize>) -> Self {
        self.max_layers = max_layers;
        self
    }

    /// Find and verify a flow.
    ///
    /// Fails with [`FlowError::Structural`] if a non-output node has no
    /// measurement and with [`FlowError::NoDeterministicFlow`] if the graph
    /// has no flow of the searched kinds.
    #[instrument(skip(self, graph), fields(nodes = graph.num_nodes(), edges = graph.num_edges()))]
    pub fn find(&self, graph: &GraphState) -> FlowResult<Flow> {
        let algos = select(self.backend, graph);
        self.find_with(graph, algos.as_ref())
    }

    /// Find and verify a flow using the given graph algorithms.
    pub fn find_with(&self, graph: &GraphState, algos: &dyn GraphAlgorithms) -> FlowResult<Flow> {
        graph.check_measurements()?;
        debug!(
            search = %self.search,
            backend = algos.name(),
            "searching for flow"
        );

        let flow = self.run_search(graph, algos).inspect_err(|err| {
            if let FlowError::NoDeterministicFlow {
                exhaustive: false, ..
            } = err
            {
                warn!("flow search stopped early: {err}");
            }
        })?;

        if let Err(err) = verify(graph, &flow, algos) {
            error!("flow search produced an invalid {}: {err}", flow.kind());
            return Err(err);
        }

        info!(
            "Found {} of depth {} for {} measured nodes",
            flow.kind(),
            flow.depth(),
            flow.num_measured()
        );
        Ok(flow)
    }

    fn run_search(&self, graph: &GraphState, algos: &dyn GraphAlgorithms) -> FlowResult<Flow> {
        match self.search {
            FlowSearch::CausalOnly => find_causal_flow(graph, algos, self.max_layers),
            FlowSearch::GflowOnly => find_gflow(graph, algos, self.max_layers),
            FlowSearch::CausalThenGflow if applicable(graph) => {
                match find_causal_flow(graph, algos, self.max_layers) {
                    Err(err @ FlowError::NoDeterministicFlow { .. }) => {
                        debug!("{err}; falling back to gflow");
                        find_gflow(graph, algos, self.max_layers)
                    }
                    result => result,
                }
            }
            FlowSearch::CausalThenGflow => find_gflow(graph, algos, self.max_layers),
        }
    }
}

/// Find a flow with the default search and native algorithms.
pub fn find_flow(graph: &GraphState) -> FlowResult<Flow> {
    FlowFinder::new().find(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowKind;
    use mbqc_ir::{Measurement, NodeId, StructuralError};

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

    #[test]
    fn test_prefers_causal_flow() {
        let graph = open_graph(3, &[(0, 1), (1, 2)], &[0], &[2]);
        let flow = FlowFinder::new().find(&graph).unwrap();
        assert_eq!(flow.kind(), FlowKind::Causal);
    }

    #[test]
    fn test_falls_back_to_gflow() {
        let graph = open_graph(
            6,
            &[(0, 3), (1, 3), (1, 4), (2, 4), (0, 5), (1, 5), (2, 5)],
            &[0, 1, 2],
            &[3, 4, 5],
        );
        let flow = FlowFinder::new().find(&graph).unwrap();
        assert_eq!(flow.kind(), FlowKind::Generalized);

        let err = FlowFinder::new()
            .with_search(FlowSearch::CausalOnly)
            .find(&graph)
            .unwrap_err();
        assert!(err.is_no_flow());
    }

    #[test]
    fn test_non_xy_goes_straight_to_gflow() {
        let mut graph = open_graph(2, &[(0, 1)], &[], &[1]);
        graph.set_measurement(n(0), Measurement::yz(0.5)).unwrap();
        let flow = find_flow(&graph).unwrap();
        assert_eq!(flow.kind(), FlowKind::Generalized);
    }

    #[test]
    fn test_triangle_reports_gflow_failure() {
        let graph = open_graph(3, &[(0, 1), (1, 2), (0, 2)], &[0], &[2]);
        match find_flow(&graph) {
            Err(FlowError::NoDeterministicFlow {
                strategy,
                exhaustive,
                ..
            }) => {
                assert_eq!(strategy, FlowKind::Generalized);
                assert!(exhaustive);
            }
            other => panic!("expected NoDeterministicFlow, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_measurement_is_structural() {
        let graph = GraphState::from_edges([n(0), n(1)], [(n(0), n(1))]).unwrap();
        assert_eq!(
            find_flow(&graph),
            Err(FlowError::Structural(StructuralError::MissingMeasurement {
                node: n(0)
            }))
        );
    }

    #[test]
    fn test_backends_agree() {
        let graph = open_graph(
            6,
            &[(0, 3), (1, 3), (1, 4), (2, 4), (0, 5), (1, 5), (2, 5)],
            &[0, 1, 2],
            &[3, 4, 5],
        );
        let native = FlowFinder::new()
            .with_backend(AlgorithmBackend::Native)
            .find(&graph);
        let accelerated = FlowFinder::new()
            .with_backend(AlgorithmBackend::Accelerated)
            .find(&graph);
        assert!(native.is_ok());
        assert_eq!(native, accelerated);
    }
}
