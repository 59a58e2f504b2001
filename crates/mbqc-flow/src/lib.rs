//! MBQC Flow Finding and Pattern Extraction
//!
//! This crate turns an open graph state into a runnable measurement pattern.
//! It finds a flow (a measurement order together with correction sets that
//! make the computation deterministic) and then emits the prepare, entangle,
//! measure and correct commands of the pattern.
//!
//! # Overview
//!
//! Compilation runs in two stages:
//! 1. **Flow finding**: causal flow is tried first; if it does not exist
//!    (or some measurement is outside the XY plane) gflow is searched
//! 2. **Extraction**: measured nodes are linearized by flow level and each
//!    measurement is followed by the corrections its flow demands
//!
//! Every flow is verified against the graph before it is returned or used,
//! and every pattern is replayed before it is handed out.
//!
//! # Architecture
//!
//! ```text
//! GraphState
//!       │
//!       ▼
//! ┌─────────────────┐
//! │ PatternCompiler │ ◄── FlowConfig (search, backend, preparation, corrections)
//! └─────────────────┘
//!       │
//!       ├── FlowFinder  ── causal flow / gflow ── verify
//!       └── Extractor   ── lazy / upfront preparation, explicit / folded corrections
//!       │
//!       ▼
//! CompiledPattern { flow, pattern }
//! ```
//!
//! # Example: Compiling a Linear Cluster
//!
//! ```rust
//! use mbqc_flow::{FlowKind, PatternCompiler};
//! use mbqc_ir::{GraphState, Measurement, NodeId};
//!
//! let mut graph = GraphState::from_edges(
//!     [NodeId(0), NodeId(1), NodeId(2)],
//!     [(NodeId(0), NodeId(1)), (NodeId(1), NodeId(2))],
//! )
//! .unwrap();
//! graph.mark_input(NodeId(0)).unwrap();
//! graph.mark_output(NodeId(2)).unwrap();
//! graph.set_measurement(NodeId(0), Measurement::xy(0.0)).unwrap();
//! graph.set_measurement(NodeId(1), Measurement::xy(0.0)).unwrap();
//!
//! let compiled = PatternCompiler::new().compile(&graph).unwrap();
//! assert_eq!(compiled.flow.kind(), FlowKind::Causal);
//! assert_eq!(
//!     compiled.pattern.to_string(),
//!     "N(1) E(0,1) N(2) E(1,2) M(0,XY,0) X(1;0) Z(2;0) M(1,XY,0) X(2;1)"
//! );
//! ```
//!
//! # Search Strategies
//!
//! | Strategy | Behavior |
//! |----------|----------|
//! | `causal_then_gflow` | Causal flow if applicable and found, else gflow (default) |
//! | `causal_only` | Causal flow only; fails for non-XY measurements |
//! | `gflow_only` | Gflow only |
//!
//! # Extraction Options
//!
//! - [`PreparationStrategy::Lazy`]: prepare and entangle a node only when a
//!   measurement or correction first needs it, keeping few qubits alive
//! - [`PreparationStrategy::Upfront`]: prepare every node, then apply every
//!   entangle, before the first measurement
//! - [`CorrectionMode::Folded`]: corrections on measured nodes are folded into
//!   the signal domains of later measurements

pub mod causal;
pub mod compiler;
pub mod config;
pub mod error;
pub mod extraction;
pub mod finder;
pub mod flow;
pub mod gflow;
pub mod linalg;
pub mod verify;

pub use compiler::{CompiledPattern, PatternCompiler, PatternCompilerBuilder};
pub use config::{ConfigError, CorrectionMode, FlowConfig, FlowSearch, PreparationStrategy};
pub use error::{FlowError, FlowResult};
pub use extraction::{Extractor, extract_pattern};
pub use finder::{FlowFinder, find_flow};
pub use flow::{Flow, FlowKind};
pub use verify::verify;
