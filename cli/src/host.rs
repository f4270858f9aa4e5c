//! Disk-backed host for running the overlay outside an editor.

use std::path::{Path, PathBuf};

use lintbridge_overlay::{LanguageService, ProjectHost, ServiceFut};
use lintbridge_types::{CodeFixAction, CombinedCodeActions, Diagnostic, TextSpan};
use tokio::fs;

/// Language service that reads snapshots from disk and has no diagnostics
/// or fixes of its own.
pub struct DiskService;

impl LanguageService for DiskService {
    fn semantic_diagnostics<'a>(&'a self, _file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        Box::pin(async { Vec::new() })
    }

    fn syntactic_diagnostics<'a>(&'a self, _file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        Box::pin(async { Vec::new() })
    }

    fn code_fixes_at_position<'a>(
        &'a self,
        _file: &'a Path,
        _span: TextSpan,
        _error_codes: &'a [String],
    ) -> ServiceFut<'a, Vec<CodeFixAction>> {
        Box::pin(async { Vec::new() })
    }

    fn combined_code_fix<'a>(
        &'a self,
        _file: &'a Path,
        _fix_id: &'a str,
    ) -> ServiceFut<'a, CombinedCodeActions> {
        Box::pin(async { CombinedCodeActions::default() })
    }

    fn source_text<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Option<String>> {
        Box::pin(async move {
            match fs::read_to_string(file).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(path = %file.display(), "Failed to read source: {e}");
                    None
                }
            }
        })
    }
}

/// A one-shot run has nothing to watch or refresh.
pub struct WorkspaceHost {
    root: PathBuf,
}

impl WorkspaceHost {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ProjectHost for WorkspaceHost {
    fn workspace_root(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }

    fn watch_file(&self, path: &Path) {
        tracing::trace!(path = %path.display(), "ignoring watch request");
    }

    fn refresh_diagnostics(&self) {}
}
