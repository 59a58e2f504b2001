//! Pattern compiler: flow finding followed by extraction.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use mbqc_ir::algorithms::select;
use mbqc_ir::{AlgorithmBackend, GraphState, Pattern};

use crate::config::{CorrectionMode, FlowConfig, FlowSearch, PreparationStrategy};
use crate::error::FlowResult;
use crate::extraction::Extractor;
use crate::finder::FlowFinder;
use crate::flow::Flow;

/// The result of compiling a graph state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledPattern {
    /// The verified flow the pattern was extracted from.
    pub flow: Flow,
    /// The runnable pattern.
    pub pattern: Pattern,
}

/// Runs flow finding and pattern extraction with one configuration.
#[derive(Debug, Clone, Default)]
pub struct PatternCompiler {
    config: FlowConfig,
}

impl PatternCompiler {
    /// Create a compiler with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compiler from configuration.
    pub fn with_config(config: FlowConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Compile a graph state into a pattern.
    ///
    /// The graph algorithms backend is selected once and shared by the flow
    /// finder and the extractor.
    #[instrument(skip(self, graph))]
    pub fn compile(&self, graph: &GraphState) -> FlowResult<CompiledPattern> {
        info!(
            "Compiling graph with {} nodes and {} edges ({} search, {} backend)",
            graph.num_nodes(),
            graph.num_edges(),
            self.config.search,
            self.config.backend
        );

        let algos = select(self.config.backend, graph);

        let flow = FlowFinder::from_config(&self.config).find_with(graph, algos.as_ref())?;
        debug!("Flow found: {}, depth {}", flow.kind(), flow.depth());

        let pattern =
            Extractor::from_config(&self.config).extract_with(graph, &flow, algos.as_ref())?;

        info!(
            "Compilation completed, commands: {}, measurements: {}, max space: {}",
            pattern.len(),
            pattern.num_measurements(),
            pattern.max_space()
        );

        Ok(CompiledPattern { flow, pattern })
    }
}

/// Builder for creating pattern compilers.
#[derive(Debug, Clone, Default)]
pub struct PatternCompilerBuilder {
    config: FlowConfig,
}

impl PatternCompilerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the graph algorithms backend.
    #[must_use]
    pub fn with_backend(mut self, backend: AlgorithmBackend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the flow search strategy.
    #[must_use]
    pub fn with_search(mut self, search: FlowSearch) -> Self {
        self.config.search = search;
        self
    }

    /// Bound the number of search rounds.
    ///
    /// A bound of zero is treated as one round.
    #[must_use]
    pub fn with_max_layers(mut self, max_layers: usize) -> Self {
        self.config.max_layers = Some(max_layers.max(1));
        self
    }

    /// Set the preparation strategy.
    #[must_use]
    pub fn with_preparation(mut self, preparation: PreparationStrategy) -> Self {
        self.config.preparation = preparation;
        self
    }

    /// Set the correction mode.
    #[must_use]
    pub fn with_corrections(mut self, corrections: CorrectionMode) -> Self {
        self.config.corrections = corrections;
        self
    }

    /// Build the compiler.
    pub fn build(self) -> PatternCompiler {
        PatternCompiler::with_config(self.config)
    }
}
