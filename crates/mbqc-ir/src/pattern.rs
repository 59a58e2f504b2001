//! Measurement patterns: ordered command sequences over graph nodes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::command::{Command, CommandKind};
use crate::error::{GraphResult, PatternError, PatternResult};
use crate::graph::GraphState;
use crate::measurement::Measurement;
use crate::node::NodeId;

/// A runnable measurement pattern.
///
/// A pattern declares its input and output nodes and an ordered command
/// sequence. It can only be constructed through [`Pattern::new`] or
/// deserialization, both of which replay the sequence, so every `Pattern`
/// value is runnable:
/// - a node is prepared at most once and never after it was measured
/// - entangle, measure and correct only act on live, unmeasured nodes
/// - signal domains and correction triggers refer to earlier measurements
/// - exactly the declared outputs are left alive at the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatternRecord", into = "PatternRecord")]
pub struct Pattern {
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    commands: Vec<Command>,
}

impl Pattern {
    /// Create a pattern, checking that it is runnable.
    pub fn new(
        inputs: Vec<NodeId>,
        outputs: Vec<NodeId>,
        commands: Vec<Command>,
    ) -> PatternResult<Self> {
        let pattern = Self {
            inputs,
            outputs,
            commands,
        };
        pattern.check_runnable()?;
        Ok(pattern)
    }

    /// Input nodes, supplied externally.
    #[inline]
    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Output nodes, left alive after the last command.
    #[inline]
    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// The command sequence.
    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands.
    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the pattern has no commands.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterate over the commands.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Count commands of a given kind.
    pub fn count(&self, kind: CommandKind) -> usize {
        self.commands.iter().filter(|c| c.kind() == kind).count()
    }

    /// Number of measure commands.
    pub fn num_measurements(&self) -> usize {
        self.count(CommandKind::Measure)
    }

    /// Number of correct commands.
    pub fn num_corrections(&self) -> usize {
        self.count(CommandKind::Correct)
    }

    /// Nodes in the order they are measured.
    pub fn measurement_order(&self) -> Vec<NodeId> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Measure { node, .. } => Some(*node),
                _ => None,
            })
            .collect()
    }

    /// Largest number of simultaneously live qubits during execution.
    pub fn max_space(&self) -> usize {
        let mut live = self.inputs.len();
        let mut max = live;
        for command in &self.commands {
            match command {
                Command::Prepare { .. } => {
                    live += 1;
                    max = max.max(live);
                }
                Command::Measure { .. } => live = live.saturating_sub(1),
                _ => {}
            }
        }
        max
    }

    /// Replay the command sequence and verify it can run.
    ///
    /// Reports the first offending command.
    pub fn check_runnable(&self) -> PatternResult<()> {
        let mut live: BTreeSet<NodeId> = self.inputs.iter().copied().collect();
        let mut measured: BTreeSet<NodeId> = BTreeSet::new();
        let outputs: BTreeSet<NodeId> = self.outputs.iter().copied().collect();

        for (position, command) in self.commands.iter().enumerate() {
            let fail = |reason: String| PatternError::InvalidCommand {
                position,
                command: command.to_string(),
                reason,
            };
            match command {
                Command::Prepare { node } => {
                    if measured.contains(node) {
                        return Err(fail(format!("node {node} was already measured")));
                    }
                    if !live.insert(*node) {
                        return Err(fail(format!("node {node} is already alive")));
                    }
                }
                Command::Entangle { nodes: (a, b) } => {
                    if a == b {
                        return Err(fail(format!("cannot entangle node {a} with itself")));
                    }
                    for n in [a, b] {
                        if !live.contains(n) {
                            return Err(fail(format!("node {n} is not alive")));
                        }
                    }
                }
                Command::Measure {
                    node,
                    angle,
                    s_domain,
                    t_domain,
                    ..
                } => {
                    if outputs.contains(node) {
                        return Err(fail(format!("output node {node} cannot be measured")));
                    }
                    if !angle.is_finite() {
                        return Err(fail(format!("angle {angle} is not finite")));
                    }
                    if let Some(pending) = s_domain
                        .iter()
                        .chain(t_domain)
                        .find(|d| !measured.contains(*d))
                    {
                        return Err(fail(format!(
                            "signal from node {pending} is not measured yet"
                        )));
                    }
                    if !live.remove(node) {
                        return Err(fail(format!("node {node} is not alive")));
                    }
                    measured.insert(*node);
                }
                Command::Correct { node, trigger, .. } => {
                    if !live.contains(node) {
                        return Err(fail(format!("node {node} is not alive")));
                    }
                    if !measured.contains(trigger) {
                        return Err(fail(format!("trigger {trigger} is not measured yet")));
                    }
                }
            }
        }

        if live != outputs {
            return Err(PatternError::OutputMismatch {
                live: live.into_iter().collect(),
                declared: self.outputs.clone(),
            });
        }
        Ok(())
    }

    /// Fold byproduct corrections on measured nodes into measurement domains.
    ///
    /// A `Correct` on a node that is measured later becomes part of that
    /// measurement's signal domains: X into `s_domain`, Z into `t_domain`,
    /// Y into both. Domains combine by symmetric difference. A correction is
    /// only folded if no entangle on the corrected node sits between it and
    /// the measurement. Corrections on outputs remain as commands.
    pub fn fold_corrections(&self) -> Pattern {
        let mut commands = self.commands.clone();
        let measure_at: BTreeMap<NodeId, usize> = commands
            .iter()
            .enumerate()
            .filter_map(|(i, c)| match c {
                Command::Measure { node, .. } => Some((*node, i)),
                _ => None,
            })
            .collect();

        let mut folded = vec![false; commands.len()];
        for i in 0..commands.len() {
            let Command::Correct {
                node,
                pauli,
                trigger,
            } = commands[i]
            else {
                continue;
            };
            let Some(&j) = measure_at.get(&node) else {
                continue;
            };
            if j < i {
                continue;
            }
            let blocked = commands[i + 1..j]
                .iter()
                .any(|c| matches!(c, Command::Entangle { .. }) && c.touches(node));
            if blocked {
                continue;
            }
            if let Command::Measure {
                s_domain, t_domain, ..
            } = &mut commands[j]
            {
                if pauli.has_x() {
                    toggle(s_domain, trigger);
                }
                if pauli.has_z() {
                    toggle(t_domain, trigger);
                }
                folded[i] = true;
            }
        }

        let commands = commands
            .into_iter()
            .zip(folded)
            .filter_map(|(c, gone)| (!gone).then_some(c))
            .collect();
        Pattern {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            commands,
        }
    }

    /// Rebuild the graph state this pattern runs on.
    ///
    /// Nodes are the inputs plus every prepared node, edges are the
    /// entangle commands (a repeated pair cancels), and measurements come
    /// from the measure commands.
    pub fn extract_graph(&self) -> GraphResult<GraphState> {
        let mut graph = GraphState::new();
        for command in &self.commands {
            if let Command::Prepare { node } = command {
                graph.add_node(*node)?;
            }
        }
        for &node in &self.inputs {
            if !graph.contains(node) {
                graph.add_node(node)?;
            }
        }

        let mut edges: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        let mut measurements: BTreeMap<NodeId, Measurement> = BTreeMap::new();
        for command in &self.commands {
            match command {
                Command::Entangle { nodes } => toggle(&mut edges, *nodes),
                Command::Measure { node, .. } => {
                    if let Some(m) = command.measurement() {
                        measurements.insert(*node, m);
                    }
                }
                _ => {}
            }
        }
        for (a, b) in edges {
            graph.add_edge(a, b)?;
        }

        let outputs: BTreeSet<NodeId> = self.outputs.iter().copied().collect();
        for &node in &self.inputs {
            if outputs.contains(&node) {
                graph.mark_pass_through(node)?;
            } else {
                graph.mark_input(node)?;
            }
        }
        for &node in &self.outputs {
            if !graph.is_input(node) {
                graph.mark_output(node)?;
            }
        }
        for (node, measurement) in measurements {
            graph.set_measurement(node, measurement)?;
        }
        Ok(graph)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> PatternResult<String> {
        serde_json::to_string(self).map_err(|e| PatternError::Serialization(e.to_string()))
    }

    /// Serialize to indented JSON.
    pub fn to_json_pretty(&self) -> PatternResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PatternError::Serialization(e.to_string()))
    }

    /// Parse a pattern from JSON and check that it is runnable.
    pub fn from_json(json: &str) -> PatternResult<Self> {
        let record: PatternRecord =
            serde_json::from_str(json).map_err(|e| PatternError::Serialization(e.to_string()))?;
        Pattern::try_from(record)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{command}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, item: T) {
    if set.contains(&item) {
        set.remove(&item);
    } else {
        set.insert(item);
    }
}

/// Persisted form of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    /// Input nodes.
    pub inputs: Vec<NodeId>,
    /// Output nodes.
    pub outputs: Vec<NodeId>,
    /// Command sequence.
    pub commands: Vec<Command>,
}

impl From<Pattern> for PatternRecord {
    fn from(pattern: Pattern) -> Self {
        Self {
            inputs: pattern.inputs,
            outputs: pattern.outputs,
            commands: pattern.commands,
        }
    }
}

impl TryFrom<PatternRecord> for Pattern {
    type Error = PatternError;

    fn try_from(record: PatternRecord) -> Result<Self, Self::Error> {
        Pattern::new(record.inputs, record.outputs, record.commands)
    }
}
