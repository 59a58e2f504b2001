//! Error types for the IR crate.

use thiserror::Error;

use crate::node::NodeId;

/// Errors raised while building or mutating a [`GraphState`](crate::GraphState).
///
/// Every variant is reported at the offending call and names the nodes
/// involved, so the caller can correct the construction without re-running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StructuralError {
    /// A node with this id already exists.
    #[error("Node {node} already exists in graph")]
    DuplicateNode {
        /// The duplicated node.
        node: NodeId,
    },

    /// The edge is already present (in either orientation).
    #[error("Edge ({a}, {b}) already exists in graph")]
    DuplicateEdge {
        /// First endpoint.
        a: NodeId,
        /// Second endpoint.
        b: NodeId,
    },

    /// An edge from a node to itself was requested.
    #[error("Self-loop on node {node} is not allowed")]
    SelfLoop {
        /// The node.
        node: NodeId,
    },

    /// The node is not part of the graph.
    #[error("Node {node} not found in graph{}", format_context(.context))]
    NodeNotFound {
        /// The missing node.
        node: NodeId,
        /// Optional operation name for context.
        context: Option<&'static str>,
    },

    /// The edge is not part of the graph.
    #[error("Edge ({a}, {b}) not found in graph")]
    EdgeNotFound {
        /// First endpoint.
        a: NodeId,
        /// Second endpoint.
        b: NodeId,
    },

    /// Output nodes are consumed externally and cannot be measured.
    #[error("Cannot assign a measurement to output node {node}")]
    MeasurementOnOutput {
        /// The output node.
        node: NodeId,
    },

    /// The node already sits on the opposite boundary.
    ///
    /// A node that is both input and output must be declared with
    /// [`GraphState::mark_pass_through`](crate::GraphState::mark_pass_through).
    #[error("Node {node} is already {current} and cannot also be {requested}")]
    BoundaryConflict {
        /// The node.
        node: NodeId,
        /// Role the node currently has.
        current: &'static str,
        /// Role that was requested.
        requested: &'static str,
    },

    /// A numeric id does not fit in a [`NodeId`].
    #[error("Node id {id} exceeds u32::MAX")]
    IdOverflow {
        /// The rejected id.
        id: usize,
    },

    /// Measurement angles must be finite numbers.
    #[error("Measurement angle of node {node} is not a finite number")]
    NonFiniteAngle {
        /// The node whose measurement was rejected.
        node: NodeId,
    },

    /// The node has no loop decoration, which the rewrite requires.
    #[error("Node {node} carries no loop decoration")]
    MissingLoop {
        /// The node.
        node: NodeId,
    },

    /// The node carries a loop decoration, which the rewrite forbids.
    #[error("Node {node} carries a loop decoration")]
    UnexpectedLoop {
        /// The node.
        node: NodeId,
    },

    /// A non-output node has no measurement assigned.
    #[error("Non-output node {node} has no measurement assigned")]
    MissingMeasurement {
        /// The unmeasured node.
        node: NodeId,
    },

    /// A persisted graph record could not be turned back into a graph.
    #[error("Invalid graph record: {0}")]
    InvalidRecord(String),
}

/// Errors found while replaying or decoding a [`Pattern`](crate::Pattern).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A command cannot run at its position in the sequence.
    #[error("Command #{position} ({command}) is invalid: {reason}")]
    InvalidCommand {
        /// Zero-based position in the command sequence.
        position: usize,
        /// Text form of the command.
        command: String,
        /// What went wrong.
        reason: String,
    },

    /// The qubits left alive after replay are not the declared outputs.
    #[error("Pattern leaves {live:?} alive but declares outputs {declared:?}")]
    OutputMismatch {
        /// Nodes still alive after the last command.
        live: Vec<NodeId>,
        /// Declared outputs.
        declared: Vec<NodeId>,
    },

    /// The serialized form could not be produced or parsed.
    #[error("Pattern serialization failed: {0}")]
    Serialization(String),
}

/// Helper function to format optional operation context.
#[allow(clippy::ref_option)]
fn format_context(context: &Option<&'static str>) -> String {
    match context {
        Some(op) => format!(" (in {op})"),
        None => String::new(),
    }
}

/// Result type for graph construction.
pub type GraphResult<T> = Result<T, StructuralError>;

/// Result type for pattern operations.
pub type PatternResult<T> = Result<T, PatternError>;
