//! Flow mappings: correction sets and the measurement partial order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mbqc_ir::NodeId;

/// The kind of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Causal flow: each correction set is a single neighbor.
    Causal,
    /// Generalized flow (gflow).
    Generalized,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Causal => f.write_str("causal flow"),
            FlowKind::Generalized => f.write_str("gflow"),
        }
    }
}

/// A flow on a graph state.
///
/// Every measured node has a correction set `C(v)`, every node has a level,
/// and outputs sit at level 0. The partial order is derived from the
/// levels: `v` is measured before `w` iff `level(v) > level(w)`. A `Flow`
/// on its own is not known to be valid; use
/// [`verify`](crate::verify::verify) against the graph it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    kind: FlowKind,
    corrections: BTreeMap<NodeId, BTreeSet<NodeId>>,
    levels: BTreeMap<NodeId, usize>,
}

impl Flow {
    /// Assemble a flow from its parts without checking it.
    pub fn from_parts(
        kind: FlowKind,
        corrections: BTreeMap<NodeId, BTreeSet<NodeId>>,
        levels: BTreeMap<NodeId, usize>,
    ) -> Self {
        Self {
            kind,
            corrections,
            levels,
        }
    }

    /// The kind of flow.
    #[inline]
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Correction set of a measured node.
    pub fn correction_set(&self, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.corrections.get(&node)
    }

    /// All correction sets, keyed by measured node.
    pub fn corrections(&self) -> &BTreeMap<NodeId, BTreeSet<NodeId>> {
        &self.corrections
    }

    /// Level of a node.
    pub fn level(&self, node: NodeId) -> Option<usize> {
        self.levels.get(&node).copied()
    }

    /// All levels, keyed by node.
    pub fn levels(&self) -> &BTreeMap<NodeId, usize> {
        &self.levels
    }

    /// Check if `a` must be measured strictly before `b`.
    pub fn precedes(&self, a: NodeId, b: NodeId) -> bool {
        match (self.level(a), self.level(b)) {
            (Some(la), Some(lb)) => la > lb,
            _ => false,
        }
    }

    /// Number of nodes with a correction set.
    pub fn num_measured(&self) -> usize {
        self.corrections.len()
    }

    /// Highest level; 0 for a flow without measured nodes.
    pub fn depth(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Nodes grouped by level, index 0 being the outputs.
    pub fn layers(&self) -> Vec<BTreeSet<NodeId>> {
        let mut layers = vec![BTreeSet::new(); self.depth() + 1];
        for (&node, &level) in &self.levels {
            layers[level].insert(node);
        }
        layers
    }

    /// Measurement order: measured nodes by descending level, ties by
    /// ascending id.
    pub fn linearize(&self) -> Vec<NodeId> {
        let mut order: Vec<NodeId> = self.corrections.keys().copied().collect();
        order.sort_by_key(|&n| (std::cmp::Reverse(self.level(n).unwrap_or(0)), n));
        order
    }

    /// The single corrector of a node in a causal flow.
    pub fn causal_partner(&self, node: NodeId) -> Option<NodeId> {
        if self.kind != FlowKind::Causal {
            return None;
        }
        let set = self.corrections.get(&node)?;
        if set.len() == 1 {
            set.first().copied()
        } else {
            None
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of depth {}", self.kind, self.depth())?;
        for (node, set) in &self.corrections {
            let items: Vec<String> = set.iter().map(ToString::to_string).collect();
            write!(
                f,
                "\n  {node} (level {}): {{{}}}",
                self.level(*node).unwrap_or(0),
                items.join(", ")
            )?;
        }
        Ok(())
    }
}
