use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// A subprocess could not be run to completion.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: io::Error,
    },
    #[error("{program} timed out after {} ms", after.as_millis())]
    TimedOut { program: String, after: Duration },
    #[error("i/o error talking to {program}: {source}")]
    Io {
        program: String,
        source: io::Error,
    },
}

/// The analyzer library resolved but could not be loaded.
///
/// `Clone` so the runner can cache the failure per library path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("no analyzer package found above {}", .0.display())]
    PackageNotFound(PathBuf),
    #[error("analyzer entry point {} is missing", .0.display())]
    EntryMissing(PathBuf),
    #[error("node runtime not found in PATH")]
    NodeMissing,
    #[error("unreadable package manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}

/// Running the analyzer against a file failed.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("analyzer exited with status {code:?}: {stderr}")]
    Crashed { code: Option<i32>, stderr: String },
    #[error("failed to decode analyzer report: {0}")]
    Decode(#[from] serde_json::Error),
}
