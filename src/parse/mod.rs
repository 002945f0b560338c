//! Parse phase: JSON → Rust types + graph construction.

pub mod graph;
pub mod types;

pub use graph::BuildGraph;
pub use types::*;

use crate::error::OverlayError;

/// Deserialize a build-graph JSON string into a `GraphSpec`.
pub fn parse(json: &str) -> Result<GraphSpec, Vec<OverlayError>> {
    serde_json::from_str::<GraphSpec>(json).map_err(|e| {
        vec![OverlayError::parse(
            "P001",
            format!("Failed to parse build graph JSON: {}", e),
        )]
    })
}

/// Parse JSON and build the graph in one step.
pub fn parse_and_build(json: &str) -> Result<BuildGraph, Vec<OverlayError>> {
    let spec = parse(json)?;
    BuildGraph::build(&spec)
}
