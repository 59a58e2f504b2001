//! MBQC Demo Suite
//!
//! Demonstrations of flow finding and pattern extraction on fixture graph
//! states:
//!
//! - **Linear cluster**: one wire, causal flow, the textbook pattern
//! - **Ladder and lattice**: several wires with causal flow
//! - **Gflow-only**: a graph where causal flow fails and gflow succeeds
//! - **Mixed planes**: measurements outside the XY plane
//! - **Triangle**: a graph with no deterministic flow
//!
//! The binaries share the console helpers below and the logging setup in
//! [`init_logging`].

pub mod graphs;

use console::style;
use mbqc_flow::CompiledPattern;
use tracing_subscriber::EnvFilter;

/// Install the tracing subscriber.
///
/// Honors `RUST_LOG`; otherwise logs at `default_level`.
pub fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a failure message.
pub fn print_failure(message: &str) {
    println!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print the summary lines of a compiled pattern.
pub fn print_compiled(compiled: &CompiledPattern) {
    let flow = &compiled.flow;
    let pattern = &compiled.pattern;
    print_result("Flow", flow.kind());
    print_result("Flow depth", flow.depth());
    print_result("Commands", pattern.len());
    print_result("Measurements", pattern.num_measurements());
    print_result("Corrections", pattern.num_corrections());
    print_result("Max live qubits", pattern.max_space());
}

/// Render the flow layers as `level: nodes` lines, latest layer first.
pub fn format_layers(compiled: &CompiledPattern) -> Vec<String> {
    compiled
        .flow
        .layers()
        .iter()
        .enumerate()
        .rev()
        .map(|(level, nodes)| {
            let ids: Vec<String> = nodes.iter().map(ToString::to_string).collect();
            format!("{level}: {}", ids.join(" "))
        })
        .collect()
}
