#![allow(dead_code)]

use typecheck_overlay::action::{Action, CheckAction};
use typecheck_overlay::config::OverlayConfig;
use typecheck_overlay::executor::ActionQueue;
use typecheck_overlay::parse::types::Node;
use typecheck_overlay::report::ArtifactNaming;
use typecheck_overlay::visitor::{TypecheckVisitor, VisitOutcome, Visitor};

// =============================================================================
// Visitor builders
// =============================================================================

/// Config with `library`/`binary` as the allowed kinds.
pub fn scenario_config() -> OverlayConfig {
    OverlayConfig::new("mypy", "/ws/.mypy").with_kinds(["library", "binary"])
}

pub fn visitor(config: OverlayConfig) -> TypecheckVisitor {
    TypecheckVisitor::new(config, ArtifactNaming::new("out")).expect("valid config")
}

pub fn library(label: &str, srcs: &[&str]) -> Node {
    Node::new(label, "library").with_srcs(srcs.iter().copied())
}

// =============================================================================
// Visiting
// =============================================================================

/// Visit one node against a fresh queue.
pub fn visit(visitor: &TypecheckVisitor, node: &Node) -> (VisitOutcome, Vec<Action>) {
    let mut queue = ActionQueue::new();
    let outcome = visitor.visit(node, &mut queue).expect("visit should succeed");
    (outcome, queue.into_actions())
}

pub fn check_actions(actions: &[Action]) -> Vec<&CheckAction> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::Check(c) => Some(c),
            Action::Placeholder(_) => None,
        })
        .collect()
}

// =============================================================================
// Shell-backed tools (unix)
// =============================================================================

/// Config whose tool is `sh -c <script> checker`, so sources and the
/// `--config` flag land in `$1..$n` and the script decides the exit status.
pub fn shell_config(script: &str) -> OverlayConfig {
    let mut config = OverlayConfig::new("sh", "checker.ini").with_kinds(["library"]);
    let prefix = vec!["-c".to_string(), script.to_string(), "checker".to_string()];
    config.human.extra_options = prefix.clone();
    config.machine.extra_options = prefix;
    config
}
