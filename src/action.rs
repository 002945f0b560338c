//! Action descriptors: value types describing one external-process
//! invocation (or one placeholder write) for the host to execute.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a check action treats the tool's exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Non-zero exit fails the action; stdout is only written on success.
    FailFast,
    /// Exit status is written to `status`; the action always succeeds.
    Capture { status: PathBuf },
}

impl ExecutionMode {
    pub fn status_path(&self) -> Option<&Path> {
        match self {
            ExecutionMode::FailFast => None,
            ExecutionMode::Capture { status } => Some(status.as_path()),
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, ExecutionMode::Capture { .. })
    }
}

/// One invocation of the type-checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckAction {
    pub tool: PathBuf,
    /// Arguments after the tool: `options... sources... --config=<path>`.
    pub args: Vec<String>,
    /// Sources in declaration order, then the config file.
    pub inputs: Vec<PathBuf>,
    pub stdout: PathBuf,
    pub mode: ExecutionMode,
    /// Progress message shown by the host.
    pub label: String,
}

impl CheckAction {
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut outputs = vec![self.stdout.clone()];
        if let Some(status) = self.mode.status_path() {
            outputs.push(status.to_path_buf());
        }
        outputs
    }

    /// Full command line, tool first.
    pub fn argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.tool.display().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Materializes declared outputs as empty files; no tool involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderAction {
    pub outputs: Vec<PathBuf>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Check(CheckAction),
    Placeholder(PlaceholderAction),
}

impl Action {
    pub fn inputs(&self) -> Vec<PathBuf> {
        match self {
            Action::Check(a) => a.inputs.clone(),
            Action::Placeholder(_) => Vec::new(),
        }
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        match self {
            Action::Check(a) => a.outputs(),
            Action::Placeholder(a) => a.outputs.clone(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Action::Check(a) => &a.label,
            Action::Placeholder(a) => &a.label,
        }
    }

    pub fn is_tool_invocation(&self) -> bool {
        matches!(self, Action::Check(_))
    }
}

/// Everything needed to build one check action.
pub struct CheckRequest<'a> {
    pub tool: &'a Path,
    pub sources: &'a [String],
    pub config_file: &'a Path,
    pub stdout: PathBuf,
    pub mode: ExecutionMode,
    pub options: &'a [String],
    pub label: String,
}

/// Build one check action. Argument order is `options... sources...
/// --config=<path>` and never depends on anything but the request.
pub fn build_check_action(req: CheckRequest<'_>) -> CheckAction {
    let mut args = Vec::with_capacity(req.options.len() + req.sources.len() + 1);
    args.extend(req.options.iter().cloned());
    args.extend(req.sources.iter().cloned());
    args.push(format!("--config={}", req.config_file.display()));

    let mut inputs: Vec<PathBuf> = req.sources.iter().map(PathBuf::from).collect();
    inputs.push(req.config_file.to_path_buf());

    CheckAction {
        tool: req.tool.to_path_buf(),
        args,
        inputs,
        stdout: req.stdout,
        mode: req.mode,
        label: req.label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(
        sources: &'a [String],
        options: &'a [String],
        mode: ExecutionMode,
    ) -> CheckRequest<'a> {
        CheckRequest {
            tool: Path::new("mypy"),
            sources,
            config_file: Path::new("/ws/.mypy"),
            stdout: PathBuf::from("out/lib.human.stdout"),
            mode,
            options,
            label: "Type-checking //a:lib".into(),
        }
    }

    #[test]
    fn args_are_options_then_sources_then_config() {
        let sources = vec!["a.py".to_string(), "b.py".to_string()];
        let options = vec!["--color=always".to_string()];
        let action = build_check_action(request(&sources, &options, ExecutionMode::FailFast));

        assert_eq!(
            action.args,
            vec!["--color=always", "a.py", "b.py", "--config=/ws/.mypy"]
        );
        assert_eq!(
            action.inputs,
            vec![
                PathBuf::from("a.py"),
                PathBuf::from("b.py"),
                PathBuf::from("/ws/.mypy")
            ]
        );
    }

    #[test]
    fn fail_fast_declares_only_stdout() {
        let sources = vec!["a.py".to_string()];
        let action = build_check_action(request(&sources, &[], ExecutionMode::FailFast));
        assert_eq!(action.outputs(), vec![PathBuf::from("out/lib.human.stdout")]);
    }

    #[test]
    fn capture_declares_stdout_and_status() {
        let sources = vec!["a.py".to_string()];
        let mode = ExecutionMode::Capture {
            status: PathBuf::from("out/lib.human.status"),
        };
        let action = build_check_action(request(&sources, &[], mode));
        assert_eq!(
            action.outputs(),
            vec![
                PathBuf::from("out/lib.human.stdout"),
                PathBuf::from("out/lib.human.status")
            ]
        );
    }

    #[test]
    fn argv_prefixes_tool() {
        let sources = vec!["a.py".to_string()];
        let action = build_check_action(request(&sources, &[], ExecutionMode::FailFast));
        assert_eq!(action.argv(), vec!["mypy", "a.py", "--config=/ws/.mypy"]);
    }

    #[test]
    fn serializes_with_tagged_mode() {
        let mode = ExecutionMode::Capture {
            status: PathBuf::from("s"),
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "capture", "status": "s"}));
    }
}
