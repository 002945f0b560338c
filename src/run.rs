//! Local executor: runs queued actions as child processes.
//!
//! Every action runs independently on the rayon pool. Check actions follow
//! their `ExecutionMode`; placeholder actions create their outputs empty.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use rayon::prelude::*;

use crate::action::{Action, CheckAction, ExecutionMode, PlaceholderAction};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to spawn '{}': {source}", .tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{label} failed with exit status {status}")]
    ToolFailed {
        label: String,
        status: i32,
        output: String,
    },
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    /// Fail-fast action whose tool exited 0.
    Passed,
    /// Capture action; `status` is what landed in the status file.
    Captured { status: i32 },
    /// Placeholder outputs were created empty.
    Materialized,
}

#[derive(Debug)]
pub struct ActionOutcome {
    pub label: String,
    pub result: Result<ActionStatus, RunError>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// One outcome per action, in submission order.
    pub outcomes: Vec<ActionOutcome>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &RunError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.label.as_str(), e)))
    }

    pub fn captured_nonzero(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(ActionStatus::Captured { status }) if status != 0))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct LocalRunner {
    workspace: PathBuf,
}

impl LocalRunner {
    /// Tools run with `workspace` as working directory; relative output and
    /// tool paths resolve against it.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        LocalRunner {
            workspace: workspace.into(),
        }
    }

    pub fn run(&self, actions: &[Action]) -> RunSummary {
        let outcomes: Vec<ActionOutcome> = actions
            .par_iter()
            .map(|action| ActionOutcome {
                label: action.label().to_string(),
                result: self.run_one(action),
            })
            .collect();

        let summary = RunSummary { outcomes };
        tracing::info!(
            actions = summary.outcomes.len(),
            failed = summary.failures().count(),
            captured_nonzero = summary.captured_nonzero(),
            "run finished"
        );
        summary
    }

    pub fn run_one(&self, action: &Action) -> Result<ActionStatus, RunError> {
        match action {
            Action::Check(check) => self.run_check(check),
            Action::Placeholder(placeholder) => self.materialize(placeholder),
        }
    }

    fn run_check(&self, action: &CheckAction) -> Result<ActionStatus, RunError> {
        let tool = self.resolve_tool(&action.tool);
        tracing::debug!(label = %action.label, tool = %tool.display(), args = ?action.args, "running");

        let output = Command::new(&tool)
            .args(&action.args)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunError::Spawn {
                tool: tool.clone(),
                source,
            })?;
        let status = exit_code(output.status);

        match &action.mode {
            ExecutionMode::Capture { status: status_path } => {
                self.write(&action.stdout, &output.stdout)?;
                self.write(status_path, status.to_string().as_bytes())?;
                Ok(ActionStatus::Captured { status })
            }
            ExecutionMode::FailFast if output.status.success() => {
                self.write(&action.stdout, &output.stdout)?;
                Ok(ActionStatus::Passed)
            }
            ExecutionMode::FailFast => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                tracing::warn!(label = %action.label, status, "type-check failed");
                Err(RunError::ToolFailed {
                    label: action.label.clone(),
                    status,
                    output: text,
                })
            }
        }
    }

    fn materialize(&self, action: &PlaceholderAction) -> Result<ActionStatus, RunError> {
        for output in &action.outputs {
            self.write(output, b"")?;
        }
        Ok(ActionStatus::Materialized)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), RunError> {
        let path = self.workspace.join(path);
        let wrap = |source| RunError::Write {
            path: path.clone(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        fs::write(&path, contents).map_err(wrap)
    }

    fn resolve_tool(&self, tool: &Path) -> PathBuf {
        if tool.is_absolute() || tool.components().count() == 1 {
            tool.to_path_buf()
        } else {
            self.workspace.join(tool)
        }
    }
}

/// Exit status as a shell would report it: signals map to `128 + signo`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}
