//! Unified overlay error type used across all phases.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Config,
    Parse,
    Graph,
    Submit,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Config => write!(f, "Config"),
            Phase::Parse => write!(f, "Parse"),
            Phase::Graph => write!(f, "Graph"),
            Phase::Submit => write!(f, "Submit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for OverlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for OverlayError {}

impl OverlayError {
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        OverlayError {
            code: code.into(),
            phase: Phase::Config,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        OverlayError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn graph(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        OverlayError {
            code: code.into(),
            phase: Phase::Graph,
            message: message.into(),
            node_id,
        }
    }

    pub fn submit(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        OverlayError {
            code: code.into(),
            phase: Phase::Submit,
            message: message.into(),
            node_id,
        }
    }
}
