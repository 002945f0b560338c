//! The seam between the overlay and whatever executes its actions.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::action::Action;
use crate::error::OverlayError;

/// Host capability that accepts action descriptions for later execution.
pub trait Executor {
    /// Submit one node's actions as a unit: the host records all of them or
    /// none.
    fn submit(&mut self, actions: Vec<Action>) -> Result<(), OverlayError>;
}

/// In-process executor that records submissions in order and rejects any
/// batch whose outputs collide with an earlier action or with each other.
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Vec<Action>,
    owners: HashMap<PathBuf, String>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    fn check_outputs(&self, actions: &[Action]) -> Result<(), OverlayError> {
        let mut declared: HashMap<PathBuf, &str> = HashMap::new();
        for action in actions {
            for output in action.outputs() {
                if let Some(owner) = self.owners.get(&output) {
                    return Err(OverlayError::submit(
                        "X001",
                        format!(
                            "Output '{}' of '{}' is already declared by '{}'",
                            output.display(),
                            action.label(),
                            owner
                        ),
                        None,
                    ));
                }
                if let Some(first) = declared.insert(output.clone(), action.label()) {
                    return Err(OverlayError::submit(
                        "X002",
                        format!(
                            "Output '{}' is declared by both '{}' and '{}'",
                            output.display(),
                            first,
                            action.label()
                        ),
                        None,
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Executor for ActionQueue {
    fn submit(&mut self, actions: Vec<Action>) -> Result<(), OverlayError> {
        self.check_outputs(&actions)?;

        for action in actions {
            for output in action.outputs() {
                self.owners.insert(output, action.label().to_string());
            }
            self.actions.push(action);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::PlaceholderAction;

    fn placeholder(label: &str, outputs: &[&str]) -> Action {
        Action::Placeholder(PlaceholderAction {
            outputs: outputs.iter().map(PathBuf::from).collect(),
            label: label.into(),
        })
    }

    #[test]
    fn records_actions_in_submission_order() {
        let mut queue = ActionQueue::new();
        queue.submit(vec![placeholder("first", &["a"])]).unwrap();
        queue
            .submit(vec![placeholder("second", &["b"]), placeholder("third", &["c"])])
            .unwrap();
        let labels: Vec<&str> = queue.actions().iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["first", "second", "third"]);
    }

    #[test]
    fn rejects_overlapping_outputs() {
        let mut queue = ActionQueue::new();
        queue.submit(vec![placeholder("first", &["a", "b"])]).unwrap();
        let err = queue.submit(vec![placeholder("second", &["c", "b"])]).unwrap_err();
        assert_eq!(err.code, "X001");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn rejects_output_declared_twice_by_one_action() {
        let mut queue = ActionQueue::new();
        let err = queue.submit(vec![placeholder("only", &["a", "a"])]).unwrap_err();
        assert_eq!(err.code, "X002");
        assert!(queue.is_empty());
    }

    #[test]
    fn rejected_batch_records_nothing() {
        let mut queue = ActionQueue::new();
        queue.submit(vec![placeholder("first", &["taken"])]).unwrap();

        let err = queue
            .submit(vec![placeholder("human", &["h"]), placeholder("machine", &["taken"])])
            .unwrap_err();
        assert_eq!(err.code, "X001");
        assert_eq!(queue.len(), 1);

        // The rejected batch claimed nothing, so its free output is still free.
        queue.submit(vec![placeholder("retry", &["h"])]).unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn rejects_overlap_within_one_batch() {
        let mut queue = ActionQueue::new();
        let err = queue
            .submit(vec![placeholder("human", &["x"]), placeholder("machine", &["x"])])
            .unwrap_err();
        assert_eq!(err.code, "X002");
        assert!(queue.is_empty());
    }
}
