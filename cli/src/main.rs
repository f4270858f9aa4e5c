//! lintbridge CLI: lint files through the overlay and print its diagnostics.
//!
//! ```text
//! lintbridge [--workspace DIR] [--config lintbridge.toml] [--fix] FILES...
//! ```
//!
//! With `--fix` the file-wide fix-all edit set is applied and written back
//! before the remaining diagnostics are printed.

mod host;

use std::path::{Path, PathBuf, absolute};
use std::process::ExitCode;
use std::sync::Arc;
use std::{env, io};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::fs;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lintbridge_config::PluginOptions;
use lintbridge_overlay::{LanguageService, LineIndex, LintOverlay, Problem, non_overlapping};
use lintbridge_types::{Diagnostic, TextChange};

use crate::host::{DiskService, WorkspaceHost};

const EXIT_LINT_ERRORS: u8 = 1;
const EXIT_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "lintbridge")]
#[command(about = "Run eslint through the lint overlay", long_about = None)]
#[command(version)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    workspace: Option<PathBuf>,

    /// Plugin options file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Apply all non-overlapping auto-fixes and write the files back
    #[arg(long)]
    fix: bool,

    /// Files to lint
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

/// 1-based line and column (in chars) of a byte offset.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let index = LineIndex::new(text);
    let line = index.line_of(offset);
    let line_start = index.line_start(line).unwrap_or(0);
    (line + 1, text[line_start..offset].chars().count() + 1)
}

/// Absolute workspace root and the absolute path of every file to lint.
/// Reported findings carry absolute paths and are matched against these.
fn lint_targets(workspace: Option<PathBuf>, files: &[PathBuf]) -> Result<(PathBuf, Vec<PathBuf>)> {
    let workspace = match workspace {
        Some(dir) => absolute(&dir)
            .with_context(|| format!("failed to resolve workspace {}", dir.display()))?,
        None => env::current_dir().context("failed to read current directory")?,
    };
    let targets = files
        .iter()
        .map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                workspace.join(file)
            }
        })
        .collect();
    Ok((workspace, targets))
}

fn format_diagnostic(path: &Path, text: &str, diagnostic: &Diagnostic) -> String {
    let (line, col) = line_col(text, diagnostic.span().start());
    format!(
        "{}:{line}:{col}: {}: {}",
        path.display(),
        diagnostic.category().label(),
        diagnostic.message()
    )
}

async fn apply_fixes(overlay: &LintOverlay<DiskService>, path: &Path, text: &str) -> Result<usize> {
    let problems = overlay.problems(path).await;
    let edits = non_overlapping(problems.iter().filter(|p| p.is_fixable()).map(Problem::edits));
    if edits.is_empty() {
        return Ok(0);
    }
    let fixed = TextChange::apply_all(text, &edits);
    fs::write(path, fixed)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(edits.len())
}

async fn run(cli: Cli) -> Result<bool> {
    let (workspace, targets) = lint_targets(cli.workspace, &cli.files)?;
    let options = match &cli.config {
        Some(path) => PluginOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => PluginOptions::default(),
    };
    let overlay = LintOverlay::new(
        DiskService,
        Arc::new(WorkspaceHost::new(workspace)),
        options,
    );

    let mut any_errors = false;
    for (file, path) in cli.files.iter().zip(&targets) {
        anyhow::ensure!(path.is_file(), "no such file: {}", path.display());

        let mut diagnostics = overlay.semantic_diagnostics(path).await;
        if cli.fix {
            let text = fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let applied = apply_fixes(&overlay, path, &text).await?;
            if applied > 0 {
                tracing::info!(path = %path.display(), edits = applied, "applied fixes");
                diagnostics = overlay.semantic_diagnostics(path).await;
            }
        }

        let text = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        for diagnostic in &diagnostics {
            any_errors |= diagnostic.category().is_error();
            println!("{}", format_diagnostic(file, &text, diagnostic));
        }
    }
    Ok(any_errors)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_LINT_ERRORS),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
