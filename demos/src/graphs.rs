//! Fixture graph states for the demos.
//!
//! Every fixture is a complete open graph: boundary sets are marked and
//! every non-output node carries a measurement.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use mbqc_ir::{GraphRecord, GraphResult, GraphState, Measurement, NodeId};

/// Named fixture graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// Linear cluster: one logical wire.
    Linear,
    /// Two parallel wires coupled on every column.
    Ladder,
    /// `size x size` square lattice, inputs left and outputs right.
    Lattice,
    /// Three inputs and outputs with a gflow but no causal flow.
    GflowOnly,
    /// Measurements in all three planes.
    MixedPlanes,
    /// Triangle with no flow at all.
    Triangle,
}

impl Fixture {
    /// All fixtures, in display order.
    pub const ALL: [Fixture; 6] = [
        Fixture::Linear,
        Fixture::Ladder,
        Fixture::Lattice,
        Fixture::GflowOnly,
        Fixture::MixedPlanes,
        Fixture::Triangle,
    ];

    /// Build the fixture. `size` is ignored by fixed-size fixtures.
    pub fn build(self, size: u32) -> GraphResult<GraphState> {
        match self {
            Fixture::Linear => linear_cluster(size.max(2)),
            Fixture::Ladder => ladder(size.max(2)),
            Fixture::Lattice => lattice(size.max(2)),
            Fixture::GflowOnly => gflow_only(),
            Fixture::MixedPlanes => mixed_planes(),
            Fixture::Triangle => triangle(),
        }
    }

    /// Whether the fixture has a flow.
    pub fn has_flow(self) -> bool {
        self != Fixture::Triangle
    }

    /// Short description for demo output.
    pub fn description(self) -> &'static str {
        match self {
            Fixture::Linear => "linear cluster, single wire",
            Fixture::Ladder => "two coupled wires",
            Fixture::Lattice => "square lattice",
            Fixture::GflowOnly => "gflow without causal flow",
            Fixture::MixedPlanes => "XY, YZ and XZ measurements",
            Fixture::Triangle => "triangle, no flow",
        }
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fixture::Linear => "linear",
            Fixture::Ladder => "ladder",
            Fixture::Lattice => "lattice",
            Fixture::GflowOnly => "gflow-only",
            Fixture::MixedPlanes => "mixed-planes",
            Fixture::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

impl FromStr for Fixture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fixture::ALL
            .into_iter()
            .find(|fixture| fixture.to_string() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                let names: Vec<String> = Fixture::ALL.iter().map(ToString::to_string).collect();
                format!("unknown fixture '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Linear cluster `0 - 1 - ... - (len-1)`, input 0, output `len - 1`.
///
/// Angles cycle through multiples of π/4.
pub fn linear_cluster(len: u32) -> GraphResult<GraphState> {
    let mut graph = graph_from(len, (1..len).map(|i| (i - 1, i)))?;
    mark(&mut graph, &[0], &[len.saturating_sub(1)])?;
    for i in 0..len.saturating_sub(1) {
        set_xy(&mut graph, i, 0.25 * f64::from(i % 8))?;
    }
    Ok(graph)
}

/// Two wires of `cols` nodes, rungs on every column.
///
/// ```text
/// 0 --- 1 --- ... --- (cols-1)
/// |     |               |
/// c --- c+1 - ... --- (2cols-1)
/// ```
pub fn ladder(cols: u32) -> GraphResult<GraphState> {
    let mut edges = Vec::new();
    for c in 0..cols {
        edges.push((c, cols + c));
        if c + 1 < cols {
            edges.push((c, c + 1));
            edges.push((cols + c, cols + c + 1));
        }
    }
    let mut graph = graph_from(2 * cols, edges)?;
    let last = cols.saturating_sub(1);
    mark(&mut graph, &[0, cols], &[last, cols + last])?;
    for node in graph.measured_nodes() {
        set_xy(&mut graph, node.0, 0.0)?;
    }
    Ok(graph)
}

/// `side x side` lattice, row-major ids, left column inputs, right column outputs.
pub fn lattice(side: u32) -> GraphResult<GraphState> {
    let id = |r: u32, c: u32| r * side + c;
    let mut edges = Vec::new();
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                edges.push((id(r, c), id(r, c + 1)));
            }
            if r + 1 < side {
                edges.push((id(r, c), id(r + 1, c)));
            }
        }
    }
    let mut graph = graph_from(side * side, edges)?;
    let inputs: Vec<u32> = (0..side).map(|r| id(r, 0)).collect();
    let outputs: Vec<u32> = (0..side).map(|r| id(r, side - 1)).collect();
    mark(&mut graph, &inputs, &outputs)?;
    for node in graph.measured_nodes() {
        set_xy(&mut graph, node.0, 0.125 * f64::from(node.0 % 16))?;
    }
    Ok(graph)
}

/// Inputs {0, 1, 2}, outputs {3, 4, 5}; has a gflow but no causal flow.
pub fn gflow_only() -> GraphResult<GraphState> {
    let mut graph = graph_from(6, [(0, 3), (1, 3), (1, 4), (2, 4), (0, 5), (1, 5), (2, 5)])?;
    mark(&mut graph, &[0, 1, 2], &[3, 4, 5])?;
    for i in 0..3 {
        set_xy(&mut graph, i, 0.0)?;
    }
    Ok(graph)
}

/// `0 - 1 - 2 - 3` with node 0 in YZ, node 1 in XZ and node 2 in XY.
pub fn mixed_planes() -> GraphResult<GraphState> {
    let mut graph = graph_from(4, [(0, 1), (1, 2), (2, 3)])?;
    mark(&mut graph, &[], &[3])?;
    set(&mut graph, 0, Measurement::yz(0.25))?;
    set(&mut graph, 1, Measurement::xz(0.75))?;
    set(&mut graph, 2, Measurement::xy(0.5))?;
    Ok(graph)
}

/// Triangle with input 0 and output 2.
pub fn triangle() -> GraphResult<GraphState> {
    let mut graph = graph_from(3, [(0, 1), (1, 2), (0, 2)])?;
    mark(&mut graph, &[0], &[2])?;
    set_xy(&mut graph, 0, 0.0)?;
    set_xy(&mut graph, 1, 0.0)?;
    Ok(graph)
}

/// Load a graph state from a JSON [`GraphRecord`] file.
pub fn load_graph(path: &Path) -> Result<GraphState> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file: {}", path.display()))?;
    let record: GraphRecord = serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse graph file: {}", path.display()))?;
    GraphState::try_from(record)
        .with_context(|| format!("Invalid graph in {}", path.display()))
}

fn graph_from(
    num_nodes: u32,
    edges: impl IntoIterator<Item = (u32, u32)>,
) -> GraphResult<GraphState> {
    GraphState::from_edges(
        (0..num_nodes).map(NodeId),
        edges.into_iter().map(|(a, b)| (NodeId(a), NodeId(b))),
    )
}

fn mark(graph: &mut GraphState, inputs: &[u32], outputs: &[u32]) -> GraphResult<()> {
    for &i in inputs {
        graph.mark_input(NodeId(i))?;
    }
    for &o in outputs {
        graph.mark_output(NodeId(o))?;
    }
    Ok(())
}

fn set(graph: &mut GraphState, node: u32, measurement: Measurement) -> GraphResult<()> {
    graph.set_measurement(NodeId(node), measurement)?;
    Ok(())
}

fn set_xy(graph: &mut GraphState, node: u32, angle: f64) -> GraphResult<()> {
    set(graph, node, Measurement::xy(angle))
}
