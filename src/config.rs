//! Engine configuration: tool and config references, eligibility sets, and
//! the per-report profiles that pick execution mode and option tokens.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

pub const DEFAULT_KINDS: [&str; 2] = ["py_library", "py_binary"];
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".py", ".pyi"];
pub const DEFAULT_SKIP_TAG: &str = "no-typecheck";
pub const COLOR_TOKEN: &str = "--color=always";

/// Per-invocation options shared read-only by every action of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Emit ANSI-colored diagnostics on reports whose profile allows it.
    #[serde(default)]
    pub color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeChoice {
    /// Record the exit status in a side file; never break the build.
    Capture,
    /// A non-zero exit status fails the action.
    FailFast,
}

/// How one of the two reports (human, machine) is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProfile {
    pub mode: ModeChoice,
    /// Whether `Options::color` applies to this report.
    #[serde(default)]
    pub color: bool,
    /// Literal option tokens placed after the color token.
    #[serde(default)]
    pub extra_options: Vec<String>,
}

impl ReportProfile {
    pub fn human() -> Self {
        ReportProfile {
            mode: ModeChoice::Capture,
            color: true,
            extra_options: Vec::new(),
        }
    }

    pub fn machine() -> Self {
        ReportProfile {
            mode: ModeChoice::FailFast,
            color: false,
            extra_options: Vec::new(),
        }
    }

    /// Resolve the ordered option tokens for this report.
    pub fn option_tokens(&self, options: &Options) -> Vec<String> {
        let mut tokens = Vec::with_capacity(self.extra_options.len() + 1);
        if self.color && options.color {
            tokens.push(COLOR_TOKEN.to_string());
        }
        tokens.extend(self.extra_options.iter().cloned());
        tokens
    }
}

fn default_kinds() -> Vec<String> {
    DEFAULT_KINDS.iter().map(|k| k.to_string()).collect()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_skip_tags() -> Vec<String> {
    vec![DEFAULT_SKIP_TAG.to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Type-checker executable: a path or a bare name looked up on `PATH`.
    pub tool: PathBuf,
    /// Checker config file, passed through as `--config=<path>`.
    pub config_file: PathBuf,
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "default_skip_tags")]
    pub skip_tags: Vec<String>,
    #[serde(default)]
    pub options: Options,
    #[serde(default = "ReportProfile::human")]
    pub human: ReportProfile,
    #[serde(default = "ReportProfile::machine")]
    pub machine: ReportProfile,
}

impl OverlayConfig {
    pub fn new(tool: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        OverlayConfig {
            tool: tool.into(),
            config_file: config_file.into(),
            kinds: default_kinds(),
            extensions: default_extensions(),
            skip_tags: default_skip_tags(),
            options: Options::default(),
            human: ReportProfile::human(),
            machine: ReportProfile::machine(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, OverlayError> {
        serde_json::from_str(json)
            .map_err(|e| OverlayError::config("C000", format!("Failed to parse config JSON: {}", e)))
    }

    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.options.color = color;
        self
    }

    /// Shape checks that need no filesystem access. Returns all errors found.
    pub fn validate(&self) -> Vec<OverlayError> {
        let mut errors = Vec::new();

        if self.tool.as_os_str().is_empty() {
            errors.push(OverlayError::config("C001", "Tool reference must not be empty"));
        }
        if self.config_file.as_os_str().is_empty() {
            errors.push(OverlayError::config("C002", "Config file reference must not be empty"));
        }
        if self.kinds.is_empty() {
            errors.push(OverlayError::config("C003", "At least one node kind must be allowed"));
        }
        if self.extensions.is_empty() {
            errors.push(OverlayError::config("C004", "At least one source extension is required"));
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                errors.push(OverlayError::config(
                    "C004",
                    format!("Source extension '{}' must look like '.ext'", ext),
                ));
            }
        }
        for (name, profile) in [("human", &self.human), ("machine", &self.machine)] {
            if profile.extra_options.iter().any(|o| o.is_empty()) {
                errors.push(OverlayError::config(
                    "C005",
                    format!("The {} report has an empty option token", name),
                ));
            }
        }

        errors
    }

    /// Resolve the tool and config file against the filesystem.
    ///
    /// A tool without a path separator is looked up on `PATH`; relative
    /// paths are taken relative to `workspace`.
    pub fn resolve_references(&self, workspace: &Path) -> Result<(), OverlayError> {
        let tool_is_bare = self.tool.components().count() == 1 && !self.tool.is_absolute();
        if tool_is_bare {
            which::which(&self.tool).map_err(|e| {
                OverlayError::config(
                    "C010",
                    format!("Tool '{}' not found on PATH: {}", self.tool.display(), e),
                )
            })?;
        } else if !workspace.join(&self.tool).is_file() {
            return Err(OverlayError::config(
                "C010",
                format!("Tool '{}' does not exist", self.tool.display()),
            ));
        }

        if !workspace.join(&self.config_file).is_file() {
            return Err(OverlayError::config(
                "C011",
                format!("Config file '{}' does not exist", self.config_file.display()),
            ));
        }

        Ok(())
    }
}
