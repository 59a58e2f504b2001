//! Pattern commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::measurement::{Measurement, Pauli, Plane};
use crate::node::NodeId;

/// The kind of a [`Command`], without operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Node preparation.
    Prepare,
    /// Entanglement of two nodes.
    Entangle,
    /// Destructive measurement.
    Measure,
    /// Pauli byproduct correction.
    Correct,
}

/// A single operation of a measurement pattern.
///
/// Commands reference nodes by id only; a pattern does not hold on to the
/// graph it was extracted from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Prepare a fresh node in the |+⟩ state.
    Prepare {
        /// Prepared node.
        node: NodeId,
    },
    /// Apply CZ between two live nodes. Stored with the smaller id first.
    Entangle {
        /// The two nodes, ordered.
        nodes: (NodeId, NodeId),
    },
    /// Measure a node in `plane` at `angle` (units of π).
    ///
    /// Before measuring, an X byproduct applies if the outcomes of
    /// `s_domain` have odd parity, and a Z byproduct if those of `t_domain`
    /// do.
    Measure {
        /// Measured node.
        node: NodeId,
        /// Measurement plane.
        plane: Plane,
        /// Measurement angle in units of π.
        angle: f64,
        /// Earlier outcomes that trigger an X byproduct.
        #[serde(default)]
        s_domain: BTreeSet<NodeId>,
        /// Earlier outcomes that trigger a Z byproduct.
        #[serde(default)]
        t_domain: BTreeSet<NodeId>,
    },
    /// Apply `pauli` to `node` if the outcome of `trigger` is 1.
    Correct {
        /// Corrected node.
        node: NodeId,
        /// Correction operator.
        pauli: Pauli,
        /// Node whose measurement outcome triggers the correction.
        trigger: NodeId,
    },
}

impl Command {
    /// Create a preparation command.
    pub fn prepare(node: NodeId) -> Self {
        Command::Prepare { node }
    }

    /// Create an entanglement command; the pair is stored ordered.
    pub fn entangle(a: NodeId, b: NodeId) -> Self {
        Command::Entangle {
            nodes: (a.min(b), a.max(b)),
        }
    }

    /// Create a measurement command with empty signal domains.
    pub fn measure(node: NodeId, measurement: Measurement) -> Self {
        Command::Measure {
            node,
            plane: measurement.plane,
            angle: measurement.angle,
            s_domain: BTreeSet::new(),
            t_domain: BTreeSet::new(),
        }
    }

    /// Create a correction command.
    pub fn correct(node: NodeId, pauli: Pauli, trigger: NodeId) -> Self {
        Command::Correct {
            node,
            pauli,
            trigger,
        }
    }

    /// Get the kind of this command.
    #[inline]
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Prepare { .. } => CommandKind::Prepare,
            Command::Entangle { .. } => CommandKind::Entangle,
            Command::Measure { .. } => CommandKind::Measure,
            Command::Correct { .. } => CommandKind::Correct,
        }
    }

    /// Nodes the command acts on (not including signal sources).
    pub fn targets(&self) -> Vec<NodeId> {
        match self {
            Command::Prepare { node }
            | Command::Measure { node, .. }
            | Command::Correct { node, .. } => vec![*node],
            Command::Entangle { nodes: (a, b) } => vec![*a, *b],
        }
    }

    /// Check if the command acts on `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        match self {
            Command::Prepare { node: n }
            | Command::Measure { node: n, .. }
            | Command::Correct { node: n, .. } => *n == node,
            Command::Entangle { nodes: (a, b) } => *a == node || *b == node,
        }
    }

    /// The measurement carried by a measure command.
    pub fn measurement(&self) -> Option<Measurement> {
        match self {
            Command::Measure { plane, angle, .. } => Some(Measurement::new(*plane, *angle)),
            _ => None,
        }
    }

    /// Check if this is a measure command.
    #[inline]
    pub fn is_measure(&self) -> bool {
        matches!(self, Command::Measure { .. })
    }

    /// Check if this is a correction command.
    #[inline]
    pub fn is_correct(&self) -> bool {
        matches!(self, Command::Correct { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Prepare { node } => write!(f, "N({node})"),
            Command::Entangle { nodes: (a, b) } => write!(f, "E({a},{b})"),
            Command::Measure {
                node,
                plane,
                angle,
                s_domain,
                t_domain,
            } => {
                write!(f, "M({node},{plane},{angle}")?;
                if !s_domain.is_empty() {
                    write!(f, ",s={}", format_domain(s_domain))?;
                }
                if !t_domain.is_empty() {
                    write!(f, ",t={}", format_domain(t_domain))?;
                }
                f.write_str(")")
            }
            Command::Correct {
                node,
                pauli,
                trigger,
            } => write!(f, "{pauli}({node};{trigger})"),
        }
    }
}

fn format_domain(domain: &BTreeSet<NodeId>) -> String {
    let items: Vec<String> = domain.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(","))
}
