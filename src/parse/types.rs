//! Rust types for the build-graph JSON handed over by the host.
//!
//! A node is one buildable unit: a library, a binary, a test. Only `label`
//! and `kind` are mandatory; everything rule-specific lands in `attrs`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// TOP-LEVEL GRAPH
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSpec {
    pub nodes: Vec<Node>,
}

// =============================================================================
// NODE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique label, e.g. `//pkg/util:lib`.
    pub label: String,
    /// Rule kind, e.g. `py_library`.
    pub kind: String,
    /// Declared source files, in declaration order.
    #[serde(default)]
    pub srcs: Vec<String>,
    /// Labels of the nodes this one depends on.
    #[serde(default)]
    pub deps: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(label: impl Into<String>, kind: impl Into<String>) -> Self {
        Node {
            label: label.into(),
            kind: kind.into(),
            srcs: Vec::new(),
            deps: Vec::new(),
            tags: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_srcs<I, S>(mut self, srcs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.srcs = srcs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deps = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
