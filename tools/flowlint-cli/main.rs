use clap::Parser;
use flowlint::prelude::*;
use flowlint::interchange::export_to_file;
use std::process;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_VALID: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INVALID: i32 = 2;

/// Validates, scores and repairs a generated workflow against a node type registry
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file (interchange or native format)
    workflow_path: String,
    /// Path to the node type registry JSON file
    registry_path: String,

    /// Optional engine configuration JSON file
    #[arg(short, long)]
    config: Option<String>,

    /// Report issues without repairing anything
    #[arg(long)]
    no_fix: bool,

    /// Write the effective graph to this file in interchange format
    #[arg(short, long)]
    export: Option<String>,

    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    process::exit(run(cli));
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info,flowlint=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> i32 {
    let start = Instant::now();

    let registry = NodeCatalog::from_file(&cli.registry_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load registry '{}': {}",
            cli.registry_path, e
        ))
    });
    let workflow = load_workflow_file(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load workflow '{}': {}",
            cli.workflow_path, e
        ))
    });
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load config '{}': {}", path, e))
        }),
        None => EngineConfig::default(),
    };

    let engine = Engine::builder(Arc::new(registry))
        .with_config(config)
        .auto_fix(!cli.no_fix)
        .build();
    let result = engine
        .check(&workflow)
        .unwrap_or_else(|e| exit_with_error(&format!("Workflow rejected: {}", e)));
    let elapsed = start.elapsed();

    if cli.json {
        let json = serde_json::to_string_pretty(&result)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize result: {}", e)));
        println!("{}", json);
    } else {
        print_summary(&workflow, &result);
        if !engine.config().auto_fix {
            println!("\nAuto-fix disabled; no repairs were attempted.");
        }
        println!("\nChecked in {:?}", elapsed);
    }

    if let Some(path) = &cli.export {
        export_to_file(result.effective_graph(&workflow), path)
            .unwrap_or_else(|e| exit_with_error(&format!("Export failed: {}", e)));
        if !cli.json {
            println!("Exported workflow to '{}'", path);
        }
    }

    if result.is_valid { EXIT_VALID } else { EXIT_INVALID }
}

fn print_summary(workflow: &Workflow, result: &ValidationResult) {
    println!(
        "Workflow '{}': {}",
        workflow.name,
        if result.is_valid { "VALID" } else { "INVALID" }
    );
    println!(
        "  Quality: {:.0}/100   Complexity: {:.1}/10",
        result.quality_score, result.complexity_score
    );

    if !result.applied_fixes.is_empty() {
        println!("\nApplied fixes ({}):", result.applied_fixes.len());
        for fix in &result.applied_fixes {
            println!("  - {}", fix.description);
        }
    }

    if result.issues.is_empty() {
        println!("\nNo issues found.");
        return;
    }
    println!("\nIssues ({}):", result.issues.len());
    for issue in &result.issues {
        println!("  {}", issue);
        if let Some(fix) = &issue.suggested_fix {
            println!("      hint: {}", fix);
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    process::exit(EXIT_FAILURE);
}
