//! Error types for the flow crate.

use thiserror::Error;

use mbqc_ir::{NodeId, PatternError, StructuralError};

use crate::flow::FlowKind;

/// Errors that can occur while finding a flow or extracting a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FlowError {
    /// Error from the graph store.
    #[error("Graph error: {0}")]
    Structural(#[from] StructuralError),

    /// Error from pattern construction.
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// The graph admits no flow of the searched kind.
    ///
    /// When `exhaustive` is false the search was stopped by a layer bound
    /// and the result is inconclusive.
    #[error(
        "No deterministic flow ({strategy}): nodes {} left unassigned after assigning {assigned}{}",
        format_nodes(.unassigned),
        format_inconclusive(.exhaustive)
    )]
    NoDeterministicFlow {
        /// The last search that was attempted.
        strategy: FlowKind,
        /// Measured nodes left without a correction set.
        unassigned: Vec<NodeId>,
        /// Number of measured nodes that did get a correction set.
        assigned: usize,
        /// Whether the search space was fully covered.
        exhaustive: bool,
    },

    /// A flow failed re-validation against its graph.
    #[error("Invalid flow{}: {reason}", format_node(.node))]
    InvalidFlow {
        /// Offending node, if the failure is local to one node.
        node: Option<NodeId>,
        /// What is wrong.
        reason: String,
    },
}

impl FlowError {
    /// Create an invalid-flow error for a node.
    pub fn invalid_at(node: NodeId, reason: impl Into<String>) -> Self {
        FlowError::InvalidFlow {
            node: Some(node),
            reason: reason.into(),
        }
    }

    /// Check if this error says the graph has no flow.
    pub fn is_no_flow(&self) -> bool {
        matches!(self, FlowError::NoDeterministicFlow { .. })
    }
}

fn format_nodes(nodes: &[NodeId]) -> String {
    let items: Vec<String> = nodes.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_inconclusive(exhaustive: &bool) -> &'static str {
    if *exhaustive {
        ""
    } else {
        " (search stopped early, inconclusive)"
    }
}

#[allow(clippy::ref_option)]
fn format_node(node: &Option<NodeId>) -> String {
    match node {
        Some(n) => format!(" at node {n}"),
        None => String::new(),
    }
}

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;
