//! petgraph-based dependency graph over build nodes.
//!
//! Edges point from a dependency to its dependent, so a topological order
//! visits dependencies first.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::types::{GraphSpec, Node};
use crate::error::OverlayError;

pub struct BuildGraph {
    pub graph: DiGraph<Node, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl BuildGraph {
    pub fn build(spec: &GraphSpec) -> Result<Self, Vec<OverlayError>> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut errors = Vec::new();

        for node in &spec.nodes {
            if node_indices.contains_key(&node.label) {
                errors.push(OverlayError::graph(
                    "G002",
                    format!("Duplicate node label '{}'", node.label),
                    Some(node.label.clone()),
                ));
                continue;
            }
            let idx = graph.add_node(node.clone());
            node_indices.insert(node.label.clone(), idx);
        }

        for node in &spec.nodes {
            let Some(&target) = node_indices.get(&node.label) else {
                continue;
            };
            for dep in &node.deps {
                match node_indices.get(dep) {
                    Some(&source) => {
                        graph.update_edge(source, target, ());
                    }
                    None => errors.push(OverlayError::graph(
                        "G001",
                        format!("Node '{}' depends on unknown node '{}'", node.label, dep),
                        Some(node.label.clone()),
                    )),
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BuildGraph {
            graph,
            node_indices,
        })
    }

    pub fn node(&self, label: &str) -> Option<&Node> {
        self.node_indices.get(label).map(|&idx| &self.graph[idx])
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
