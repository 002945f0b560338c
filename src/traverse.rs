//! Dependency-ordered traversal that calls a visitor once per node.

use petgraph::algo::toposort;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::OverlayError;
use crate::executor::Executor;
use crate::parse::graph::BuildGraph;
use crate::report::Report;
use crate::visitor::{VisitOutcome, Visitor};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalResult {
    /// Reports in visit order.
    pub reports: Vec<Report>,
    /// Labels of nodes whose kind was not eligible.
    pub skipped: Vec<String>,
    /// Labels of eligible nodes that had nothing to check.
    pub no_op: Vec<String>,
    /// Per-node errors; a failing node never stops the traversal.
    pub errors: Vec<OverlayError>,
}

impl TraversalResult {
    pub fn report(&self, label: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.label == label)
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Serializable plan shared by the wasm and CLI planning surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub reports: Vec<Report>,
    pub skipped: Vec<String>,
    pub no_op: Vec<String>,
}

impl Plan {
    pub fn new(actions: Vec<Action>, result: &TraversalResult) -> Self {
        Plan {
            actions,
            reports: result.reports.clone(),
            skipped: result.skipped.clone(),
            no_op: result.no_op.clone(),
        }
    }
}

/// Returns node labels with dependencies before dependents.
pub fn dependency_order(graph: &BuildGraph) -> Result<Vec<String>, Vec<OverlayError>> {
    match toposort(&graph.graph, None) {
        Ok(indices) => Ok(indices
            .into_iter()
            .map(|idx| graph.graph[idx].label.clone())
            .collect()),
        Err(cycle) => {
            let label = graph.graph[cycle.node_id()].label.clone();
            Err(vec![OverlayError::graph(
                "G003",
                format!("Dependency cycle detected at node '{}'", label),
                Some(label),
            )])
        }
    }
}

/// Visit every node exactly once in dependency order.
pub fn traverse<V: Visitor + ?Sized>(
    graph: &BuildGraph,
    visitor: &V,
    executor: &mut dyn Executor,
) -> Result<TraversalResult, Vec<OverlayError>> {
    let order = dependency_order(graph)?;
    let mut result = TraversalResult::default();

    for label in order {
        let Some(node) = graph.node(&label) else {
            continue;
        };
        match visitor.visit(node, executor) {
            Ok(VisitOutcome::Skipped) => result.skipped.push(label),
            Ok(VisitOutcome::NoOp(report)) => {
                result.no_op.push(label);
                result.reports.push(report);
            }
            Ok(VisitOutcome::Checked(report)) => result.reports.push(report),
            Err(e) => {
                tracing::warn!(label = %label, error = %e, "visit failed");
                result.errors.push(e);
            }
        }
    }

    tracing::info!(
        nodes = graph.len(),
        reports = result.reports.len(),
        skipped = result.skipped.len(),
        errors = result.errors.len(),
        "traversal finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::types::{GraphSpec, Node};

    #[test]
    fn dependencies_come_first() {
        let graph = BuildGraph::build(&GraphSpec {
            nodes: vec![
                Node::new("//app:bin", "py_binary").with_deps(["//lib:core", "//lib:util"]),
                Node::new("//lib:util", "py_library").with_deps(["//lib:core"]),
                Node::new("//lib:core", "py_library"),
            ],
        })
        .unwrap();

        let order = dependency_order(&graph).unwrap();
        let pos = |l: &str| order.iter().position(|o| o == l).unwrap();
        assert!(pos("//lib:core") < pos("//lib:util"));
        assert!(pos("//lib:util") < pos("//app:bin"));
    }

    #[test]
    fn cycle_is_reported() {
        let graph = BuildGraph::build(&GraphSpec {
            nodes: vec![
                Node::new("//a:x", "py_library").with_deps(["//a:y"]),
                Node::new("//a:y", "py_library").with_deps(["//a:x"]),
            ],
        })
        .unwrap();

        let errors = dependency_order(&graph).unwrap_err();
        assert_eq!(errors[0].code, "G003");
    }
}
