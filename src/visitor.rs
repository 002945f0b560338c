//! Visitor orchestration: one traversal step per node.
//!
//! `TypecheckVisitor` gates a node on its kind, narrows its sources, and
//! either submits a placeholder action (no checkable sources) or the two
//! check actions, one per report profile.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::action::{Action, CheckRequest, ExecutionMode, build_check_action};
use crate::config::{ModeChoice, OverlayConfig, ReportProfile};
use crate::error::OverlayError;
use crate::executor::Executor;
use crate::parse::types::Node;
use crate::report::{ArtifactGroup, ArtifactNaming, Report};
use crate::select::{NodeFilter, SourceFilter};

/// Capability called once per node by a traversal engine.
pub trait Visitor {
    fn visit(&self, node: &Node, executor: &mut dyn Executor) -> Result<VisitOutcome, OverlayError>;
}

/// Terminal state of one visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VisitOutcome {
    /// Kind not eligible: nothing submitted, nothing returned.
    Skipped,
    /// Eligible but no checkable sources: empty artifacts only.
    NoOp(Report),
    /// Two check actions submitted.
    Checked(Report),
}

impl VisitOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            VisitOutcome::Skipped => None,
            VisitOutcome::NoOp(r) | VisitOutcome::Checked(r) => Some(r),
        }
    }

    pub fn into_report(self) -> Option<Report> {
        match self {
            VisitOutcome::Skipped => None,
            VisitOutcome::NoOp(r) | VisitOutcome::Checked(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypecheckVisitor {
    config: OverlayConfig,
    node_filter: NodeFilter,
    source_filter: SourceFilter,
    naming: ArtifactNaming,
}

impl TypecheckVisitor {
    /// Validate the configuration and build the visitor. Malformed
    /// configuration is fatal here, never at visit time.
    pub fn new(config: OverlayConfig, naming: ArtifactNaming) -> Result<Self, Vec<OverlayError>> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TypecheckVisitor {
            node_filter: NodeFilter::new(config.kinds.iter().cloned(), config.skip_tags.iter().cloned()),
            source_filter: SourceFilter::new(config.extensions.iter().cloned()),
            config,
            naming,
        })
    }

    fn check_action(
        &self,
        label: &str,
        group: &str,
        sources: &[String],
        profile: &ReportProfile,
        stdout: PathBuf,
        status: PathBuf,
    ) -> (Action, ArtifactGroup) {
        let mode = match profile.mode {
            ModeChoice::Capture => ExecutionMode::Capture { status },
            ModeChoice::FailFast => ExecutionMode::FailFast,
        };
        let options = profile.option_tokens(&self.config.options);

        let action = build_check_action(CheckRequest {
            tool: &self.config.tool,
            sources,
            config_file: &self.config.config_file,
            stdout,
            mode,
            options: &options,
            label: format!("Type-checking {label} ({group})"),
        });
        let artifacts = ArtifactGroup {
            stdout: action.stdout.clone(),
            status: action.mode.status_path().map(PathBuf::from),
        };

        (Action::Check(action), artifacts)
    }
}

impl Visitor for TypecheckVisitor {
    fn visit(&self, node: &Node, executor: &mut dyn Executor) -> Result<VisitOutcome, OverlayError> {
        if !self.node_filter.accepts(node) {
            tracing::debug!(label = %node.label, kind = %node.kind, "skipping ineligible node");
            return Ok(VisitOutcome::Skipped);
        }

        let paths = self.naming.allocate(&node.label);
        let sources = self.source_filter.select(&node.srcs);
        let with_node = |mut e: OverlayError| {
            e.node_id = Some(node.label.clone());
            e
        };

        if sources.is_empty() {
            tracing::debug!(label = %node.label, "no checkable sources, writing empty report");
            executor
                .submit(vec![Action::Placeholder(paths.placeholder(&node.label))])
                .map_err(with_node)?;
            return Ok(VisitOutcome::NoOp(paths.full_report(&node.label)));
        }

        let (human_action, human) = self.check_action(
            &node.label,
            "human",
            &sources,
            &self.config.human,
            paths.human_stdout,
            paths.human_status,
        );
        let (machine_action, machine) = self.check_action(
            &node.label,
            "machine",
            &sources,
            &self.config.machine,
            paths.machine_stdout,
            paths.machine_status,
        );

        executor
            .submit(vec![human_action, machine_action])
            .map_err(with_node)?;

        tracing::info!(label = %node.label, sources = sources.len(), "submitted type-check actions");
        Ok(VisitOutcome::Checked(Report {
            label: node.label.clone(),
            human,
            machine,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ActionQueue;

    fn visitor(config: OverlayConfig) -> TypecheckVisitor {
        TypecheckVisitor::new(config, ArtifactNaming::new("out")).unwrap()
    }

    #[test]
    fn ineligible_node_submits_nothing() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut queue = ActionQueue::new();
        let node = Node::new("//a:test", "py_test").with_srcs(["a_test.py"]);

        assert_eq!(v.visit(&node, &mut queue).unwrap(), VisitOutcome::Skipped);
        assert!(queue.is_empty());
    }

    #[test]
    fn empty_source_set_submits_one_placeholder() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut queue = ActionQueue::new();
        let node = Node::new("//a:data", "py_library").with_srcs(["data.json"]);

        let outcome = v.visit(&node, &mut queue).unwrap();
        let VisitOutcome::NoOp(report) = &outcome else {
            panic!("expected NoOp, got {:?}", outcome);
        };
        assert_eq!(report.files().len(), 4);
        assert_eq!(queue.len(), 1);
        assert!(!queue.actions()[0].is_tool_invocation());
        assert!(queue.actions()[0].inputs().is_empty());
    }

    #[test]
    fn checked_node_gets_capture_and_fail_fast_actions() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut queue = ActionQueue::new();
        let node = Node::new("//a:lib", "py_library").with_srcs(["a.py"]);

        let report = v.visit(&node, &mut queue).unwrap().into_report().unwrap();
        assert!(report.human.status.is_some());
        assert!(report.machine.status.is_none());

        let modes: Vec<bool> = queue
            .actions()
            .iter()
            .map(|a| match a {
                Action::Check(c) => c.mode.is_capture(),
                Action::Placeholder(_) => panic!("unexpected placeholder"),
            })
            .collect();
        assert_eq!(modes, vec![true, false]);
    }

    #[test]
    fn malformed_config_fails_construction() {
        let errors = TypecheckVisitor::new(OverlayConfig::new("", "mypy.ini"), ArtifactNaming::new("out"))
            .unwrap_err();
        assert_eq!(errors[0].code, "C001");
    }

    #[test]
    fn submission_conflict_is_attributed_to_node() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut queue = ActionQueue::new();
        let node = Node::new("//a:lib", "py_library").with_srcs(["a.py"]);

        v.visit(&node, &mut queue).unwrap();
        let err = v.visit(&node, &mut queue).unwrap_err();
        assert_eq!(err.code, "X001");
        assert_eq!(err.node_id.as_deref(), Some("//a:lib"));
    }

    #[test]
    fn rejected_check_pair_leaves_nothing_behind() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut queue = ActionQueue::new();
        let node = Node::new("//a:lib", "py_library").with_srcs(["a.py"]);
        let machine_stdout = ArtifactNaming::new("out").allocate("//a:lib").machine_stdout;
        queue
            .submit(vec![Action::Placeholder(crate::action::PlaceholderAction {
                outputs: vec![machine_stdout],
                label: "earlier".into(),
            })])
            .unwrap();

        let err = v.visit(&node, &mut queue).unwrap_err();
        assert_eq!(err.code, "X001");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.actions()[0].label(), "earlier");
    }

    struct Recorder {
        batches: Vec<Vec<Action>>,
    }

    impl Executor for Recorder {
        fn submit(&mut self, actions: Vec<Action>) -> Result<(), OverlayError> {
            self.batches.push(actions);
            Ok(())
        }
    }

    #[test]
    fn check_pair_is_submitted_in_one_batch() {
        let v = visitor(OverlayConfig::new("mypy", "mypy.ini"));
        let mut recorder = Recorder { batches: Vec::new() };
        let node = Node::new("//a:lib", "py_library").with_srcs(["a.py"]);

        v.visit(&node, &mut recorder).unwrap();
        assert_eq!(recorder.batches.len(), 1);
        assert_eq!(recorder.batches[0].len(), 2);
    }
}
