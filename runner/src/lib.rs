//! Lint tool runner: locate the analyzer installed for a file, run it, and
//! normalize its output.
//!
//! Resolution is two-level: a bounded [`MruCache`] maps each linted file to
//! the library path resolved for it, and an unbounded map keyed by that path
//! holds the loaded library (or the load failure). Every failure mode ends in
//! an empty report plus, where useful, an actionable warning.

mod error;
mod exclude;
mod library;
mod mru;
mod process;
mod resolve;
mod runner;

use std::future::Future;
use std::pin::Pin;

pub use error::{LintError, LoadError, ProcessError};
pub use exclude::{ExclusionMatcher, is_definition_file, is_js_file};
pub use library::{
    EslintCli, LibraryLoader, LintLibrary, LintOutcome, LintRequest, NodeLibraryLoader,
};
pub use mru::MruCache;
pub use resolve::{ModuleResolver, NodeResolver};
pub use runner::{
    LintRunner, RESOLUTION_CACHE_CAPACITY, RunConfiguration, RunResult, install_failure_message,
};

/// Package name of the analyzer library.
pub const ANALYZER_PACKAGE: &str = "eslint";

/// Future type returned by the runner's pluggable backends.
pub type RunnerFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
