//! Host collaborator boundaries.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use lintbridge_types::{CodeFixAction, CombinedCodeActions, Diagnostic, TextSpan};

/// Future type returned by [`LanguageService`] methods.
pub type ServiceFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The host's language service: the capability surface the overlay decorates.
pub trait LanguageService: Send + Sync {
    fn semantic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>>;

    fn syntactic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>>;

    /// Fixes for the diagnostic published at exactly `span`.
    fn code_fixes_at_position<'a>(
        &'a self,
        file: &'a Path,
        span: TextSpan,
        error_codes: &'a [String],
    ) -> ServiceFut<'a, Vec<CodeFixAction>>;

    /// Edits for every fix of the group `fix_id` in `file`.
    fn combined_code_fix<'a>(
        &'a self,
        file: &'a Path,
        fix_id: &'a str,
    ) -> ServiceFut<'a, CombinedCodeActions>;

    /// Current snapshot text of `file`.
    fn source_text<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Option<String>>;

    /// Marker telling [`crate::decorate`] this service is already overlaid.
    fn is_lint_overlay(&self) -> bool {
        false
    }
}

impl<T: LanguageService + ?Sized> LanguageService for Box<T> {
    fn semantic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        (**self).semantic_diagnostics(file)
    }

    fn syntactic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        (**self).syntactic_diagnostics(file)
    }

    fn code_fixes_at_position<'a>(
        &'a self,
        file: &'a Path,
        span: TextSpan,
        error_codes: &'a [String],
    ) -> ServiceFut<'a, Vec<CodeFixAction>> {
        (**self).code_fixes_at_position(file, span, error_codes)
    }

    fn combined_code_fix<'a>(
        &'a self,
        file: &'a Path,
        fix_id: &'a str,
    ) -> ServiceFut<'a, CombinedCodeActions> {
        (**self).combined_code_fix(file, fix_id)
    }

    fn source_text<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Option<String>> {
        (**self).source_text(file)
    }

    fn is_lint_overlay(&self) -> bool {
        (**self).is_lint_overlay()
    }
}

/// Project-level services of the host.
pub trait ProjectHost: Send + Sync {
    /// Root of the project's workspace, if the host knows one.
    fn workspace_root(&self) -> Option<PathBuf>;

    /// Start watching `path`; the host calls back into the overlay when it changes.
    fn watch_file(&self, path: &Path);

    /// Ask the host to recompute diagnostics for open files.
    fn refresh_diagnostics(&self);
}
