//! Eligibility filters: which nodes get visited, which of their sources
//! get checked.

use std::collections::BTreeSet;

use crate::parse::types::Node;

/// Allow-set of node kinds, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFilter {
    kinds: BTreeSet<String>,
    skip_tags: BTreeSet<String>,
}

impl NodeFilter {
    pub fn new<K, T>(kinds: K, skip_tags: T) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        NodeFilter {
            kinds: kinds.into_iter().map(Into::into).collect(),
            skip_tags: skip_tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows_kind(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    /// True when the node's kind is allowed and it carries no opt-out tag.
    pub fn accepts(&self, node: &Node) -> bool {
        self.allows_kind(&node.kind) && !self.skip_tags.iter().any(|t| node.has_tag(t))
    }
}

/// Recognizes the checked language's source files by extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    extensions: Vec<String>,
}

impl SourceFilter {
    pub fn new<I>(extensions: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        SourceFilter {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_checkable(&self, src: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| src.len() > ext.len() && src.ends_with(ext.as_str()))
    }

    /// Ordered subset of `srcs` that qualifies for checking.
    pub fn select(&self, srcs: &[String]) -> Vec<String> {
        srcs.iter()
            .filter(|src| self.is_checkable(src))
            .cloned()
            .collect()
    }
}
