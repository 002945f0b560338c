//! Output aggregation: artifact path allocation per node and the report
//! handle returned from a visit.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::action::PlaceholderAction;

const ARTIFACT_STEM: &str = "typecheck";

/// Maps node labels to artifact paths under one output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    out_dir: PathBuf,
}

impl ArtifactNaming {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        ArtifactNaming {
            out_dir: out_dir.into(),
        }
    }

    /// Allocate the four artifact paths of a node. Pure: the same label
    /// always yields the same paths.
    pub fn allocate(&self, label: &str) -> ReportPaths {
        let (package, name) = split_label(label);
        let mut dir = self.out_dir.clone();
        for segment in package {
            dir.push(segment);
        }
        let file = |group: &str, ext: &str| dir.join(format!("{name}.{ARTIFACT_STEM}.{group}.{ext}"));

        ReportPaths {
            human_stdout: file("human", "stdout"),
            human_status: file("human", "status"),
            machine_stdout: file("machine", "stdout"),
            machine_status: file("machine", "status"),
        }
    }
}

/// Split `@repo//pkg/sub:name` into escaped directory segments and an
/// escaped name. Main-repository packages live under `_main`, external
/// repositories under `_external/<repo>`, so neither tree can shadow the
/// other. `//pkg` is shorthand for `//pkg:pkg` and maps to the same paths.
fn split_label(label: &str) -> (Vec<String>, String) {
    let mut segments = Vec::new();

    let rest = match label.strip_prefix('@') {
        Some(external) => {
            let (repo, rest) = external.split_once("//").unwrap_or((external, ""));
            segments.push("_external".to_string());
            segments.push(escape(repo, true));
            rest
        }
        None => {
            segments.push("_main".to_string());
            label.trim_start_matches("//")
        }
    };

    let (package, name) = match rest.split_once(':') {
        Some((package, name)) => (package, name),
        None => (rest, rest.rsplit('/').next().unwrap_or(rest)),
    };

    segments.extend(
        package
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| escape(s, true)),
    );

    (segments, escape(name, false))
}

/// Reversible escape: `_` becomes `__`, any other byte outside
/// `[A-Za-z0-9-]` becomes `_xx` (lowercase hex). `.` is kept in names only,
/// so directory segments never look like an artifact file name and can never
/// be `.` or `..`.
fn escape(segment: &str, directory: bool) -> String {
    let mut escaped = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'_' => escaped.push_str("__"),
            b'.' if !directory => escaped.push('.'),
            b if b.is_ascii_alphanumeric() || b == b'-' => escaped.push(char::from(b)),
            b => escaped.push_str(&format!("_{b:02x}")),
        }
    }
    escaped
}

/// The four allocated paths for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPaths {
    pub human_stdout: PathBuf,
    pub human_status: PathBuf,
    pub machine_stdout: PathBuf,
    pub machine_status: PathBuf,
}

impl ReportPaths {
    pub fn all(&self) -> Vec<PathBuf> {
        vec![
            self.human_stdout.clone(),
            self.human_status.clone(),
            self.machine_stdout.clone(),
            self.machine_status.clone(),
        ]
    }

    /// Action that creates all four artifacts empty.
    pub fn placeholder(&self, label: &str) -> PlaceholderAction {
        PlaceholderAction {
            outputs: self.all(),
            label: format!("Writing empty type-check report for {label}"),
        }
    }

    /// Report where every artifact is materialized, as in the no-op case.
    pub fn full_report(&self, label: &str) -> Report {
        Report {
            label: label.to_string(),
            human: ArtifactGroup {
                stdout: self.human_stdout.clone(),
                status: Some(self.human_status.clone()),
            },
            machine: ArtifactGroup {
                stdout: self.machine_stdout.clone(),
                status: Some(self.machine_status.clone()),
            },
        }
    }
}

/// Diagnostic text plus, when captured, the tool's exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactGroup {
    pub stdout: PathBuf,
    pub status: Option<PathBuf>,
}

impl ArtifactGroup {
    pub fn files(&self) -> Vec<&Path> {
        let mut files = vec![self.stdout.as_path()];
        if let Some(status) = &self.status {
            files.push(status.as_path());
        }
        files
    }
}

/// Per-node result of the overlay, retrievable by downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub label: String,
    pub human: ArtifactGroup,
    pub machine: ArtifactGroup,
}

impl Report {
    pub fn files(&self) -> Vec<&Path> {
        let mut files = self.human.files();
        files.extend(self.machine.files());
        files
    }
}
