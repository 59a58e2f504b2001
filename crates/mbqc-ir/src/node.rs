//! Node identifiers and boundary roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StructuralError;

/// Unique identifier for a node (qubit) of a graph state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

impl TryFrom<usize> for NodeId {
    type Error = StructuralError;

    fn try_from(id: usize) -> Result<Self, Self::Error> {
        u32::try_from(id)
            .map(NodeId)
            .map_err(|_| StructuralError::IdOverflow { id })
    }
}

/// Where a node sits relative to the boundary of the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Supplied externally; measured but never prepared.
    Input,
    /// Prepared and measured inside the pattern.
    #[default]
    Internal,
    /// Prepared inside the pattern and handed out unmeasured.
    Output,
    /// Both input and output: supplied externally and handed out untouched.
    PassThrough,
}

impl NodeRole {
    /// Check if the node belongs to the input set.
    #[inline]
    pub fn is_input(self) -> bool {
        matches!(self, NodeRole::Input | NodeRole::PassThrough)
    }

    /// Check if the node belongs to the output set.
    #[inline]
    pub fn is_output(self) -> bool {
        matches!(self, NodeRole::Output | NodeRole::PassThrough)
    }

    /// Check if the node must carry a measurement.
    #[inline]
    pub fn is_measured(self) -> bool {
        !self.is_output()
    }

    /// Human-readable description used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            NodeRole::Input => "an input",
            NodeRole::Internal => "internal",
            NodeRole::Output => "an output",
            NodeRole::PassThrough => "a pass-through",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeRole::Input => "input",
            NodeRole::Internal => "internal",
            NodeRole::Output => "output",
            NodeRole::PassThrough => "pass-through",
        };
        f.write_str(name)
    }
}
