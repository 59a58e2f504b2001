//! Pattern extraction from a graph state and its flow.

use std::collections::BTreeSet;

use tracing::{debug, error};

use mbqc_ir::algorithms::select;
use mbqc_ir::{
    AlgorithmBackend, Command, GraphAlgorithms, GraphState, NodeId, Pattern, Pauli,
    StructuralError,
};

use crate::config::{CorrectionMode, FlowConfig, PreparationStrategy};
use crate::error::{FlowError, FlowResult};
use crate::flow::Flow;
use crate::verify::verify;

/// Turns a graph state and a flow into a runnable [`Pattern`].
///
/// The flow is re-validated first; a flow that does not fit the graph is
/// reported as [`FlowError::InvalidFlow`] and never repaired.
///
/// Measured nodes are linearized by descending level with ties broken by
/// ascending id. After measuring `v`, every `t ∈ (C(v) ∪ Odd(C(v))) \ {v}`
/// receives a correction triggered by `v`: X if `t` is only in `C(v)`, Z if
/// only in `Odd(C(v))`, Y if in both. Targets are emitted in ascending order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor {
    preparation: PreparationStrategy,
    corrections: CorrectionMode,
    backend: AlgorithmBackend,
}

impl Extractor {
    /// Create an extractor with lazy preparation and explicit corrections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            preparation: config.preparation,
            corrections: config.corrections,
            backend: config.backend,
        }
    }

    /// Set the preparation strategy.
    #[must_use]
    pub fn with_preparation(mut self, preparation: PreparationStrategy) -> Self {
        self.preparation = preparation;
        self
    }

    /// Set the correction mode.
    #[must_use]
    pub fn with_corrections(mut self, corrections: CorrectionMode) -> Self {
        self.corrections = corrections;
        self
    }

    /// Set the graph algorithms backend.
    #[must_use]
    pub fn with_backend(mut self, backend: AlgorithmBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Extract a pattern.
    pub fn extract(&self, graph: &GraphState, flow: &Flow) -> FlowResult<Pattern> {
        let algos = select(self.backend, graph);
        self.extract_with(graph, flow, algos.as_ref())
    }

    /// Extract a pattern using the given graph algorithms.
    pub fn extract_with(
        &self,
        graph: &GraphState,
        flow: &Flow,
        algos: &dyn GraphAlgorithms,
    ) -> FlowResult<Pattern> {
        graph.check_measurements()?;
        if let Err(err) = verify(graph, flow, algos) {
            error!("refusing to extract from an invalid flow: {err}");
            return Err(err);
        }

        let mut emitter = Emitter::new(graph);
        if self.preparation == PreparationStrategy::Upfront {
            emitter.introduce_all();
        }

        for v in flow.linearize() {
            let set = flow
                .correction_set(v)
                .ok_or_else(|| FlowError::invalid_at(v, "measured node has no correction set"))?;
            let odd = algos.odd_neighborhood(set);
            let targets: BTreeSet<NodeId> = set.union(&odd).copied().filter(|&t| t != v).collect();

            emitter.introduce_closed_neighborhood(v);
            for &t in &targets {
                emitter.introduce_closed_neighborhood(t);
            }

            let measurement = graph
                .measurement(v)
                .ok_or(StructuralError::MissingMeasurement { node: v })?;
            emitter.push(Command::measure(v, measurement));

            for &t in &targets {
                let pauli = Pauli::from_components(set.contains(&t), odd.contains(&t));
                if let Some(pauli) = pauli {
                    emitter.push(Command::correct(t, pauli, v));
                }
            }
        }

        for node in graph.nodes() {
            emitter.introduce(node);
        }

        let inputs: Vec<NodeId> = graph.inputs().into_iter().collect();
        let outputs: Vec<NodeId> = graph.outputs().into_iter().collect();
        let pattern = Pattern::new(inputs, outputs, emitter.commands)?;
        let pattern = match self.corrections {
            CorrectionMode::Explicit => pattern,
            CorrectionMode::Folded => pattern.fold_corrections(),
        };

        debug!(
            commands = pattern.len(),
            measurements = pattern.num_measurements(),
            corrections = pattern.num_corrections(),
            max_space = pattern.max_space(),
            "extracted pattern"
        );
        Ok(pattern)
    }
}

/// Extract a pattern with lazy preparation and explicit corrections.
pub fn extract_pattern(graph: &GraphState, flow: &Flow) -> FlowResult<Pattern> {
    Extractor::new().extract(graph, flow)
}

/// Tracks which nodes are already part of the pattern.
struct Emitter<'g> {
    graph: &'g GraphState,
    introduced: BTreeSet<NodeId>,
    commands: Vec<Command>,
}

impl<'g> Emitter<'g> {
    fn new(graph: &'g GraphState) -> Self {
        Self {
            graph,
            introduced: BTreeSet::new(),
            commands: Vec::new(),
        }
    }

    fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Prepare a node (unless it is an input) and entangle it with every
    /// neighbor already introduced.
    fn introduce(&mut self, node: NodeId) {
        if !self.introduced.insert(node) {
            return;
        }
        if !self.graph.is_input(node) {
            self.commands.push(Command::prepare(node));
        }
        let Ok(neighbors) = self.graph.neighbors(node) else {
            return;
        };
        for &neighbor in neighbors {
            if self.introduced.contains(&neighbor) {
                self.commands.push(Command::entangle(node, neighbor));
            }
        }
    }

    /// Prepare every non-input node, then apply every entangle.
    fn introduce_all(&mut self) {
        for node in self.graph.nodes() {
            if !self.graph.is_input(node) {
                self.commands.push(Command::prepare(node));
            }
        }
        for (a, b) in self.graph.edges() {
            self.commands.push(Command::entangle(a, b));
        }
        self.introduced.extend(self.graph.nodes());
    }

    /// Introduce `node` and all its neighbors, in ascending order.
    fn introduce_closed_neighborhood(&mut self, node: NodeId) {
        let mut closed: BTreeSet<NodeId> = self
            .graph
            .neighbors(node)
            .cloned()
            .unwrap_or_default();
        closed.insert(node);
        for n in closed {
            self.introduce(n);
        }
    }
}
