//! Pattern Extraction Demo
//!
//! Builds a fixture graph (or loads one from JSON), finds its flow and
//! prints the extracted measurement pattern.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use mbqc_demos::graphs::{Fixture, load_graph};
use mbqc_demos::{
    format_layers, init_logging, print_compiled, print_failure, print_header, print_info,
    print_result, print_section, print_success,
};
use mbqc_flow::{
    CorrectionMode, FlowConfig, FlowSearch, PatternCompilerBuilder, PreparationStrategy,
};
use mbqc_ir::AlgorithmBackend;

/// Output format for the extracted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Compact command text
    Text,
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "demo-extract")]
#[command(about = "Find a flow and extract a measurement pattern")]
struct Args {
    /// Fixture graph (linear, ladder, lattice, gflow-only, mixed-planes, triangle)
    #[arg(short, long, default_value = "linear")]
    graph: Fixture,

    /// Size of the fixture (wire length or lattice side)
    #[arg(short = 'n', long, default_value = "5")]
    size: u32,

    /// Load the graph from a JSON graph record instead of a fixture
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "MBQC_CONFIG")]
    config: Option<PathBuf>,

    /// Flow search (causal_then_gflow, causal_only, gflow_only)
    #[arg(long)]
    search: Option<FlowSearch>,

    /// Graph algorithms backend (native, accelerated)
    #[arg(long)]
    backend: Option<AlgorithmBackend>,

    /// Preparation strategy (lazy, upfront)
    #[arg(long)]
    preparation: Option<PreparationStrategy>,

    /// Correction mode (explicit, folded)
    #[arg(long)]
    corrections: Option<CorrectionMode>,

    /// Upper bound on flow search rounds
    #[arg(long)]
    max_layers: Option<usize>,

    /// Pattern output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Write the pattern to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show the flow layers
    #[arg(long)]
    show_flow: bool,
}

impl Args {
    /// Configuration file and environment, overridden by command-line flags.
    fn config(&self) -> Result<FlowConfig> {
        let mut config =
            FlowConfig::load(self.config.as_deref()).context("Failed to load configuration")?;
        if let Some(search) = self.search {
            config.search = search;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(preparation) = self.preparation {
            config.preparation = preparation;
        }
        if let Some(corrections) = self.corrections {
            config.corrections = corrections;
        }
        if self.max_layers.is_some() {
            config.max_layers = self.max_layers;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging("warn");

    print_header("MBQC Pattern Extraction Demo");

    let (name, graph) = match &args.input {
        Some(path) => (path.display().to_string(), load_graph(path)?),
        None => (
            args.graph.to_string(),
            args.graph
                .build(args.size)
                .with_context(|| format!("Failed to build fixture {}", args.graph))?,
        ),
    };
    let config = args.config()?;

    print_section("Graph");
    print_result("Source", &name);
    print_result("Nodes", graph.num_nodes());
    print_result("Edges", graph.num_edges());
    print_result("Inputs", graph.inputs().len());
    print_result("Outputs", graph.outputs().len());

    print_section("Configuration");
    print_result("Search", config.search);
    print_result("Backend", config.backend);
    print_result("Preparation", config.preparation);
    print_result("Corrections", config.corrections);
    print_result(
        "Max layers",
        config
            .max_layers
            .map_or_else(|| "unbounded".to_string(), |n| n.to_string()),
    );

    info!("compiling {name}");
    let compiler = PatternCompilerBuilder::new().with_config(config).build();
    let compiled = match compiler.compile(&graph) {
        Ok(compiled) => compiled,
        Err(err) if err.is_no_flow() => {
            print_section("Result");
            print_failure(&err.to_string());
            print_info("The graph admits no deterministic measurement schedule.");
            return Ok(());
        }
        Err(err) => return Err(err).context("Compilation failed"),
    };

    print_section("Result");
    print_compiled(&compiled);

    if args.show_flow {
        print_section("Flow Layers");
        for line in format_layers(&compiled) {
            println!("  {line}");
        }
    }

    let rendered = match args.format {
        Format::Text => compiled.pattern.to_string(),
        Format::Json => compiled.pattern.to_json()?,
        Format::Pretty => compiled.pattern.to_json_pretty()?,
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write file: {}", path.display()))?;
            print_result("Output", path.display());
        }
        None => {
            print_section("Pattern");
            println!("{rendered}");
        }
    }

    println!();
    print_success("Extraction complete!");
    Ok(())
}
