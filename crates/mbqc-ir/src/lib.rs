//! MBQC Graph-State Intermediate Representation
//!
//! This crate provides the core data structures for measurement-based
//! quantum computation: open graph states, pattern commands, and runnable
//! measurement patterns. Flow finding and pattern extraction live in
//! `mbqc-flow` and build on the types defined here.
//!
//! # Overview
//!
//! An MBQC computation starts from a [`GraphState`]: nodes are qubits, edges
//! are CZ entanglements, some nodes form the input and output boundary, and
//! every non-output node carries a [`Measurement`] (plane and angle). The
//! graph store validates each mutation and reports a [`StructuralError`]
//! at the offending call.
//!
//! A [`Pattern`] is the executable form: an ordered sequence of
//! [`Command`]s (prepare, entangle, measure, correct). Every `Pattern`
//! value has been replayed and is known to be runnable.
//!
//! # Core Components
//!
//! - **Nodes**: [`NodeId`] and [`NodeRole`] for addressing qubits and their
//!   boundary role
//! - **Measurements**: [`Plane`], [`Measurement`] and [`Pauli`]
//! - **Graph store**: [`GraphState`] with its persisted [`GraphRecord`] form
//! - **Graph algorithms**: the [`GraphAlgorithms`] capability with a native
//!   and a petgraph-backed implementation
//! - **Graph rewrites**: [`graphsim`] local complementation, Pauli
//!   measurement rules and the decorated simulator [`GraphSim`]
//! - **Patterns**: [`Command`] and [`Pattern`]
//!
//! # Example: A Three-Node Cluster
//!
//! ```rust
//! use mbqc_ir::{GraphState, Measurement, NodeId};
//!
//! let mut graph = GraphState::from_edges(
//!     [NodeId(0), NodeId(1), NodeId(2)],
//!     [(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
//! )
//! .unwrap();
//!
//! graph.mark_input(NodeId(0)).unwrap();
//! graph.mark_output(NodeId(2)).unwrap();
//! graph.set_measurement(NodeId(0), Measurement::xy(0.25)).unwrap();
//! graph.set_measurement(NodeId(1), Measurement::xy(0.0)).unwrap();
//!
//! assert!(graph.check_measurements().is_ok());
//! assert_eq!(graph.num_edges(), 2);
//! ```
//!
//! # Example: A Runnable Pattern
//!
//! ```rust
//! use mbqc_ir::{Command, Measurement, NodeId, Pattern, Pauli};
//!
//! let pattern = Pattern::new(
//!     vec![NodeId(0)],
//!     vec![NodeId(1)],
//!     vec![
//!         Command::prepare(NodeId(1)),
//!         Command::entangle(NodeId(0), NodeId(1)),
//!         Command::measure(NodeId(0), Measurement::xy(0.25)),
//!         Command::correct(NodeId(1), Pauli::X, NodeId(0)),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(pattern.to_string(), "N(1) E(0,1) M(0,XY,0.25) X(1;0)");
//! ```
//!
//! # Measurement Planes
//!
//! | Plane | Axes | Pauli measurements |
//! |-------|------|--------------------|
//! | `XY` | X, Y | X at angle 0, Y at angle 0.5 |
//! | `YZ` | Y, Z | Z at angle 0.5 |
//! | `XZ` | X, Z | |
//!
//! Angles are expressed in units of π.

pub mod algorithms;
pub mod command;
pub mod error;
pub mod graph;
pub mod graphsim;
pub mod measurement;
pub mod node;
pub mod pattern;

pub use algorithms::{AlgorithmBackend, GraphAlgorithms, NativeAlgorithms};
#[cfg(feature = "accelerated")]
pub use algorithms::AcceleratedAlgorithms;
pub use command::{Command, CommandKind};
pub use error::{GraphResult, PatternError, PatternResult, StructuralError};
pub use graph::{GraphRecord, GraphState, NodeInfo, NodeRecord};
pub use graphsim::{Decoration, GraphSim, PauliRewrite};
pub use measurement::{Measurement, Pauli, Plane};
pub use node::{NodeId, NodeRole};
pub use pattern::{Pattern, PatternRecord};
