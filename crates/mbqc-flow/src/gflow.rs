//! Generalized flow (gflow) search.
//!
//! Layered search from the outputs backwards, solving one GF(2) system per
//! round. With `P` the processed nodes (levels already assigned) and `U`
//! the rest, an unprocessed node `u` can be placed in the current round if
//! some `X ⊆ P \ I` satisfies `Odd(X) ∩ U = b(u)`, where the target `b(u)`
//! depends on the measurement plane of `u`:
//!
//! | Plane | `b(u)` | `C(u)` |
//! |-------|--------|--------|
//! | XY | `{u}` | `X` |
//! | XZ | `{u} ⊕ (N(u) ∩ U)` | `X ∪ {u}` |
//! | YZ | `N(u) ∩ U` | `X ∪ {u}` |
//!
//! The system matrix is the adjacency between `U` (rows) and `P \ I`
//! (columns) and is shared by every `u`, so one elimination per round
//! serves all right-hand sides. The search finds a gflow whenever one exists.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::debug;

use mbqc_ir::{GraphAlgorithms, GraphState, NodeId, Plane};

use crate::error::{FlowError, FlowResult};
use crate::flow::{Flow, FlowKind};
use crate::linalg::{MatGf2, solve_many};

/// Find a gflow.
///
/// Columns are ordered by ascending node id and free variables are set to
/// zero, which makes the returned correction sets deterministic.
/// `max_layers` bounds the number of rounds; hitting it yields an
/// inconclusive [`FlowError::NoDeterministicFlow`].
pub fn find_gflow(
    graph: &GraphState,
    algos: &dyn GraphAlgorithms,
    max_layers: Option<usize>,
) -> FlowResult<Flow> {
    let measured = graph.measured_nodes();
    let inputs = graph.inputs();
    let mut levels: BTreeMap<NodeId, usize> =
        graph.outputs().into_iter().map(|n| (n, 0)).collect();
    let mut corrections: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    let mut round = 1;

    while corrections.len() < measured.len() {
        if max_layers.is_some_and(|max| round > max) {
            debug!(round, "gflow search hit the layer bound");
            return Err(no_flow(&measured, &corrections, false));
        }

        let rows: Vec<NodeId> = measured
            .iter()
            .copied()
            .filter(|n| !levels.contains_key(n))
            .collect();
        let cols: Vec<NodeId> = levels
            .keys()
            .copied()
            .filter(|n| !inputs.contains(n))
            .collect();
        let solved = solve_round(graph, algos, &rows, &cols, &inputs)?;

        if solved.is_empty() {
            break;
        }
        debug!(
            round,
            nodes = solved.len(),
            remaining = rows.len() - solved.len(),
            "gflow layer"
        );

        for (node, set) in solved {
            levels.insert(node, round);
            corrections.insert(node, set);
        }
        round += 1;
    }

    if corrections.len() < measured.len() {
        return Err(no_flow(&measured, &corrections, true));
    }
    Ok(Flow::from_parts(FlowKind::Generalized, corrections, levels))
}

/// Solve one round, returning the correction set of every node that can be
/// placed in it.
fn solve_round(
    graph: &GraphState,
    algos: &dyn GraphAlgorithms,
    rows: &[NodeId],
    cols: &[NodeId],
    inputs: &BTreeSet<NodeId>,
) -> FlowResult<Vec<(NodeId, BTreeSet<NodeId>)>> {
    let row_index: FxHashMap<NodeId, usize> =
        rows.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut adjacency = MatGf2::zeros(rows.len(), cols.len());
    for (c, &col) in cols.iter().enumerate() {
        for neighbor in algos.neighbors(col) {
            if let Some(&r) = row_index.get(&neighbor) {
                adjacency.set(r, c, true);
            }
        }
    }

    // candidates whose plane allows a correction set at all
    let mut candidates: Vec<(NodeId, Plane)> = Vec::with_capacity(rows.len());
    for &u in rows {
        let Some(measurement) = graph.measurement(u) else {
            return Err(FlowError::Structural(
                mbqc_ir::StructuralError::MissingMeasurement { node: u },
            ));
        };
        if measurement.plane != Plane::XY && inputs.contains(&u) {
            continue;
        }
        candidates.push((u, measurement.plane));
    }

    let mut rhs = MatGf2::zeros(rows.len(), candidates.len());
    for (k, &(u, plane)) in candidates.iter().enumerate() {
        if matches!(plane, Plane::XY | Plane::XZ) {
            rhs.toggle(row_index[&u], k);
        }
        if matches!(plane, Plane::XZ | Plane::YZ) {
            for neighbor in algos.neighbors(u) {
                if let Some(&r) = row_index.get(&neighbor) {
                    rhs.toggle(r, k);
                }
            }
        }
    }

    let solutions = solve_many(&adjacency, &rhs);
    let mut solved = Vec::new();
    for ((u, plane), solution) in candidates.into_iter().zip(solutions) {
        let Some(x) = solution else {
            continue;
        };
        let mut set: BTreeSet<NodeId> = cols
            .iter()
            .zip(x)
            .filter_map(|(&col, bit)| bit.then_some(col))
            .collect();
        if plane != Plane::XY {
            set.insert(u);
        }
        solved.push((u, set));
    }
    Ok(solved)
}

fn no_flow(
    measured: &BTreeSet<NodeId>,
    corrections: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    exhaustive: bool,
) -> FlowError {
    FlowError::NoDeterministicFlow {
        strategy: FlowKind::Generalized,
        unassigned: measured
            .iter()
            .copied()
            .filter(|n| !corrections.contains_key(n))
            .collect(),
        assigned: corrections.len(),
        exhaustive,
    }
}
