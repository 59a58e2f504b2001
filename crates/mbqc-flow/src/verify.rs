//! Independent validation of a flow against its graph.

use std::collections::BTreeSet;

use mbqc_ir::{GraphAlgorithms, GraphState, NodeId, Plane};

use crate::error::{FlowError, FlowResult};
use crate::flow::{Flow, FlowKind};

/// Check that `flow` is a valid flow of its kind on `graph`.
///
/// Checked for every measured node `v` with correction set `C(v)`:
/// - `C(v)` contains only graph nodes and no inputs
/// - every `w` in `C(v)` or `Odd(C(v))` other than `v` is measured later
/// - the measurement plane condition on `v ∈ C(v)` and `v ∈ Odd(C(v))`
/// - for causal flows: `C(v)` is a single neighbor and `v` is measured in XY
///
/// Also checks that the flow covers exactly the measured nodes and levels
/// every node, with outputs on level 0. Reports the smallest offending node.
pub fn verify(graph: &GraphState, flow: &Flow, algos: &dyn GraphAlgorithms) -> FlowResult<()> {
    let measured = graph.measured_nodes();
    let corrected: BTreeSet<NodeId> = flow.corrections().keys().copied().collect();
    if let Some(&node) = measured.difference(&corrected).next() {
        return Err(FlowError::invalid_at(node, "measured node has no correction set"));
    }
    if let Some(&node) = corrected.difference(&measured).next() {
        return Err(FlowError::invalid_at(
            node,
            "correction set on a node that is not measured",
        ));
    }

    for node in graph.nodes() {
        match flow.level(node) {
            None => return Err(FlowError::invalid_at(node, "node has no level")),
            Some(0) if !graph.is_output(node) => {
                return Err(FlowError::invalid_at(node, "measured node on level 0"));
            }
            Some(level) if level > 0 && graph.is_output(node) => {
                return Err(FlowError::invalid_at(
                    node,
                    format!("output node on level {level}"),
                ));
            }
            _ => {}
        }
    }

    for (&v, set) in flow.corrections() {
        verify_node(graph, flow, algos, v, set)?;
    }
    Ok(())
}

fn verify_node(
    graph: &GraphState,
    flow: &Flow,
    algos: &dyn GraphAlgorithms,
    v: NodeId,
    set: &BTreeSet<NodeId>,
) -> FlowResult<()> {
    let Some(measurement) = graph.measurement(v) else {
        return Err(FlowError::invalid_at(v, "measured node has no measurement"));
    };

    if let Some(&w) = set.iter().find(|&&w| !graph.contains(w)) {
        return Err(FlowError::invalid_at(
            v,
            format!("correction set names unknown node {w}"),
        ));
    }
    if let Some(&w) = set.iter().find(|&&w| graph.is_input(w)) {
        return Err(FlowError::invalid_at(
            v,
            format!("correction set contains input {w}"),
        ));
    }

    let odd = algos.odd_neighborhood(set);
    for (w, origin) in set
        .iter()
        .map(|w| (*w, "correction set"))
        .chain(odd.iter().map(|w| (*w, "odd neighborhood")))
    {
        if w != v && !flow.precedes(v, w) {
            return Err(FlowError::invalid_at(
                v,
                format!("{origin} member {w} is not measured after it"),
            ));
        }
    }

    let in_set = set.contains(&v);
    let in_odd = odd.contains(&v);
    let plane_ok = match measurement.plane {
        Plane::XY => !in_set && in_odd,
        Plane::XZ => in_set && in_odd,
        Plane::YZ => in_set && !in_odd,
    };
    if !plane_ok {
        return Err(FlowError::invalid_at(
            v,
            format!(
                "{} plane condition violated (in correction set: {in_set}, in odd neighborhood: {in_odd})",
                measurement.plane
            ),
        ));
    }

    if flow.kind() == FlowKind::Causal {
        if measurement.plane != Plane::XY {
            return Err(FlowError::invalid_at(
                v,
                format!("causal flow requires XY measurements, found {}", measurement.plane),
            ));
        }
        match flow.causal_partner(v) {
            Some(partner) if algos.neighbors(v).contains(&partner) => {}
            Some(partner) => {
                return Err(FlowError::invalid_at(
                    v,
                    format!("causal partner {partner} is not a neighbor"),
                ));
            }
            None => {
                return Err(FlowError::invalid_at(
                    v,
                    format!("causal correction set has {} members", set.len()),
                ));
            }
        }
    }
    Ok(())
}
