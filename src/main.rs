use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use typecheck_overlay::config::OverlayConfig;
use typecheck_overlay::error::OverlayError;
use typecheck_overlay::executor::ActionQueue;
use typecheck_overlay::parse;
use typecheck_overlay::report::ArtifactNaming;
use typecheck_overlay::run::{LocalRunner, RunError};
use typecheck_overlay::traverse::{self, Plan};
use typecheck_overlay::visitor::TypecheckVisitor;

#[derive(Parser)]
#[command(name = "typecheck-overlay")]
#[command(about = "Run a type-checker over every eligible node of a build graph", long_about = None)]
#[command(version)]
struct Cli {
    /// Build graph JSON
    #[arg(long)]
    graph: PathBuf,

    /// Overlay config JSON
    #[arg(long)]
    config: PathBuf,

    /// Directory the tool runs in; relative paths resolve against it
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Root for report artifacts, relative to the workspace
    #[arg(short, long, default_value = "typecheck-out")]
    out: PathBuf,

    /// Force colored diagnostics in human reports
    #[arg(long)]
    color: bool,

    /// Print the planned actions as JSON instead of running them
    #[arg(long)]
    plan: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match execute(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn joined(errors: &[OverlayError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns whether the build should be considered successful.
fn execute(cli: Cli) -> Result<bool> {
    let config_json = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("Failed to read config {}", cli.config.display()))?;
    let graph_json = std::fs::read_to_string(&cli.graph)
        .with_context(|| format!("Failed to read graph {}", cli.graph.display()))?;

    let mut config = OverlayConfig::from_json(&config_json)?;
    if cli.color {
        config.options.color = true;
    }
    if !cli.plan {
        config.resolve_references(&cli.workspace)?;
    }

    let visitor = match TypecheckVisitor::new(config, ArtifactNaming::new(&cli.out)) {
        Ok(v) => v,
        Err(errors) => bail!("invalid config:\n{}", joined(&errors)),
    };
    let graph = match parse::parse_and_build(&graph_json) {
        Ok(g) => g,
        Err(errors) => bail!("invalid build graph:\n{}", joined(&errors)),
    };
    if graph.is_empty() {
        tracing::warn!(graph = %cli.graph.display(), "build graph has no nodes");
    }

    let mut queue = ActionQueue::new();
    let result = match traverse::traverse(&graph, &visitor, &mut queue) {
        Ok(r) => r,
        Err(errors) => bail!("cannot traverse build graph:\n{}", joined(&errors)),
    };
    for error in &result.errors {
        eprintln!("{error}");
    }

    if cli.plan {
        let plan = Plan::new(queue.into_actions(), &result);
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(result.is_success());
    }

    let summary = LocalRunner::new(&cli.workspace).run(queue.actions());
    for (label, error) in summary.failures() {
        match error {
            RunError::ToolFailed { output, .. } => eprintln!("{label}:\n{output}"),
            other => eprintln!("{label}: {other}"),
        }
    }
    for report in &result.reports {
        println!("{}: {}", report.label, report.human.stdout.display());
    }

    Ok(result.is_success() && summary.is_success())
}
