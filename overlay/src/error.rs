use std::path::PathBuf;

use lintbridge_runner::LintError;

/// A lint pass could not produce diagnostics. Never reaches the host: the
/// overlay logs it and falls back to the host's own diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("lint run failed: {0}")]
    Lint(#[from] LintError),
    #[error("no source text for {}", .0.display())]
    SourceUnavailable(PathBuf),
}
