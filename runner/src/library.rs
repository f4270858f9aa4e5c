//! The analyzer library boundary and its node-backed implementation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintbridge_types::{FileResult, LintReport};
use serde::Deserialize;
use tokio::process::Command;

use crate::error::{LintError, LoadError};
use crate::process::run_captured;
use crate::{ANALYZER_PACKAGE, RunnerFut};

/// Relative path of the analyzer's command-line entry point inside its package.
const CLI_ENTRY: &str = "bin/eslint.js";

/// One "lint this file" call. Fixes are never applied by the analyzer; they
/// come back as suggestions inside the report.
#[derive(Debug, Clone, Copy)]
pub struct LintRequest<'a> {
    pub file: &'a Path,
    /// Snapshot contents. When `None` the analyzer reads the file from disk.
    pub text: Option<&'a str>,
    /// Directory the analyzer runs in.
    pub working_dir: Option<&'a Path>,
    pub config_file: Option<&'a Path>,
    pub allow_inline_config: bool,
    pub report_unused_disable_directives: bool,
}

/// What one analyzer call produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOutcome {
    pub report: LintReport,
    /// Warnings the analyzer printed on its warning channel during the call.
    pub warnings: Vec<String>,
}

/// A loaded analyzer library.
pub trait LintLibrary: Send + Sync {
    fn lint<'a>(&'a self, request: LintRequest<'a>) -> RunnerFut<'a, Result<LintOutcome, LintError>>;
}

/// Turns a resolved module path into a usable library.
pub trait LibraryLoader: Send + Sync {
    fn load(&self, library_path: &Path) -> Result<Arc<dyn LintLibrary>, LoadError>;
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: Option<String>,
    version: Option<String>,
}

/// Loads the analyzer as a node package and runs its command-line entry point.
#[derive(Debug, Clone)]
pub struct NodeLibraryLoader {
    node: Option<PathBuf>,
}

impl Default for NodeLibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeLibraryLoader {
    /// Locate `node` on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            node: which::which("node").ok(),
        }
    }

    #[must_use]
    pub fn with_node(node: impl Into<PathBuf>) -> Self {
        Self {
            node: Some(node.into()),
        }
    }
}

/// Walk up from `library_path` to the directory whose manifest names the analyzer package.
fn find_package_root(library_path: &Path) -> Result<(PathBuf, PackageManifest), LoadError> {
    for dir in library_path.ancestors().skip(1) {
        let manifest_path = dir.join("package.json");
        if !manifest_path.is_file() {
            continue;
        }
        let raw = fs::read_to_string(&manifest_path).map_err(|e| LoadError::Manifest {
            path: manifest_path.clone(),
            message: e.to_string(),
        })?;
        let manifest: PackageManifest =
            serde_json::from_str(&raw).map_err(|e| LoadError::Manifest {
                path: manifest_path.clone(),
                message: e.to_string(),
            })?;
        if manifest.name.as_deref() == Some(ANALYZER_PACKAGE) {
            return Ok((dir.to_path_buf(), manifest));
        }
    }
    Err(LoadError::PackageNotFound(library_path.to_path_buf()))
}

impl LibraryLoader for NodeLibraryLoader {
    fn load(&self, library_path: &Path) -> Result<Arc<dyn LintLibrary>, LoadError> {
        let node = self.node.clone().ok_or(LoadError::NodeMissing)?;
        let (root, manifest) = find_package_root(library_path)?;
        let entry = root.join(CLI_ENTRY);
        if !entry.is_file() {
            return Err(LoadError::EntryMissing(entry));
        }
        tracing::info!(
            root = %root.display(),
            version = manifest.version.as_deref().unwrap_or("unknown"),
            "Loaded analyzer library"
        );
        Ok(Arc::new(EslintCli {
            node,
            entry,
            version: manifest.version,
        }))
    }
}

/// The analyzer's command-line interface, driven with the JSON formatter.
#[derive(Debug, Clone)]
pub struct EslintCli {
    node: PathBuf,
    entry: PathBuf,
    version: Option<String>,
}

impl EslintCli {
    #[must_use]
    pub fn new(node: PathBuf, entry: PathBuf) -> Self {
        Self {
            node,
            entry,
            version: None,
        }
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[must_use]
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    fn args(&self, request: &LintRequest<'_>) -> Vec<String> {
        let mut args = vec![
            self.entry.display().to_string(),
            "--format".to_string(),
            "json".to_string(),
        ];
        if let Some(config) = request.config_file {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }
        if !request.allow_inline_config {
            args.push("--no-inline-config".to_string());
        }
        if request.report_unused_disable_directives {
            args.push("--report-unused-disable-directives".to_string());
        }
        if request.text.is_some() {
            args.push("--stdin".to_string());
            args.push("--stdin-filename".to_string());
        }
        args.push(request.file.display().to_string());
        args
    }
}

/// Exit codes 0 (clean) and 1 (problems found) both carry a report.
fn decode_outcome(
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<LintOutcome, LintError> {
    if !matches!(code, Some(0 | 1)) {
        return Err(LintError::Crashed {
            code,
            stderr: stderr.trim().to_string(),
        });
    }
    let results: Vec<FileResult> = if stdout.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(stdout)?
    };
    Ok(LintOutcome {
        report: LintReport::from_results(results),
        warnings: stderr_warnings(stderr),
    })
}

/// Groups stderr into warnings. Indented lines continue the previous warning
/// and node's `--trace-warnings` hint is dropped.
fn stderr_warnings(stderr: &str) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();
    for line in stderr.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("(Use `node --trace-warnings") {
            continue;
        }
        match warnings.last_mut() {
            Some(last) if line.starts_with(char::is_whitespace) => {
                last.push(' ');
                last.push_str(trimmed);
            }
            _ => warnings.push(trimmed.to_string()),
        }
    }
    warnings
}

impl LintLibrary for EslintCli {
    fn lint<'a>(&'a self, request: LintRequest<'a>) -> RunnerFut<'a, Result<LintOutcome, LintError>> {
        Box::pin(async move {
            let mut cmd = Command::new(&self.node);
            cmd.args(self.args(&request));
            if let Some(dir) = request.working_dir {
                cmd.current_dir(dir);
            }
            let output = run_captured(cmd, request.text.map(str::to_string), None).await?;
            decode_outcome(output.status.code(), &output.stdout, &output.stderr)
        })
    }
}
