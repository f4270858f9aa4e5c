//! The lint overlay: a [`LanguageService`] decorator adding analyzer findings
//! and fixes to the host's own.
//!
//! Each diagnostics pass replaces the file's [`ProblemRegistry`] wholesale; the
//! code-fix operations only ever read the registry of the latest pass. All
//! mutable state sits behind one async mutex, so lint runs and registry
//! replacement never interleave.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintbridge_config::PluginOptions;
use lintbridge_runner::{LintRunner, RunConfiguration, is_definition_file};
use lintbridge_types::{CodeFixAction, CombinedCodeActions, Diagnostic, TextSpan};
use tokio::sync::Mutex;

use crate::diagnostics::{operational_warning, problem_diagnostic};
use crate::error::OverlayError;
use crate::fixes::{disable_rule, fix_all, rule_fix_all, rule_from_fix_id, single_fix};
use crate::line_index::LineIndex;
use crate::problems::{Problem, ProblemRegistry};
use crate::service::{LanguageService, ProjectHost, ServiceFut};

struct OverlayState {
    options: PluginOptions,
    runner: LintRunner,
    problems: HashMap<PathBuf, ProblemRegistry>,
}

/// Wraps a host language service, overriding semantic diagnostics, code
/// fixes and combined fixes. Everything else is delegated untouched.
pub struct LintOverlay<S> {
    inner: S,
    host: Arc<dyn ProjectHost>,
    state: Mutex<OverlayState>,
}

/// Overlay `service` unless it already is an overlay.
pub fn decorate(
    service: Box<dyn LanguageService>,
    host: Arc<dyn ProjectHost>,
    options: PluginOptions,
) -> Box<dyn LanguageService> {
    if service.is_lint_overlay() {
        tracing::debug!("language service already carries the lint overlay");
        return service;
    }
    Box::new(LintOverlay::new(service, host, options))
}

impl<S: LanguageService> LintOverlay<S> {
    /// Overlay backed by the node-based runner.
    pub fn new(inner: S, host: Arc<dyn ProjectHost>, options: PluginOptions) -> Self {
        Self::with_runner(inner, host, options, LintRunner::new())
    }

    pub fn with_runner(
        inner: S,
        host: Arc<dyn ProjectHost>,
        options: PluginOptions,
        runner: LintRunner,
    ) -> Self {
        watch_lint_config(host.as_ref(), &options);
        Self {
            inner,
            host,
            state: Mutex::new(OverlayState {
                options,
                runner,
                problems: HashMap::new(),
            }),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub async fn options(&self) -> PluginOptions {
        self.state.lock().await.options.clone()
    }

    /// Apply a configuration-change notification.
    ///
    /// Cached resolutions are dropped since the override path or package
    /// manager may have changed.
    pub async fn update_options(&self, options: PluginOptions) {
        {
            let mut state = self.state.lock().await;
            state.runner.clear_caches();
            state.options = options;
            watch_lint_config(self.host.as_ref(), &state.options);
        }
        tracing::info!("lint options updated");
        self.host.refresh_diagnostics();
    }

    /// The watched lint config file changed on disk.
    pub fn on_config_file_changed(&self) {
        tracing::debug!("lint config changed; refreshing diagnostics");
        self.host.refresh_diagnostics();
    }

    /// Problems registered by the latest diagnostics pass for `file`.
    pub async fn problems(&self, file: &Path) -> Vec<Problem> {
        self.state
            .lock()
            .await
            .problems
            .get(file)
            .map(|registry| registry.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Run the analyzer on `file` and rebuild its registry.
    async fn lint(
        &self,
        state: &mut OverlayState,
        file: &Path,
    ) -> Result<Vec<Diagnostic>, OverlayError> {
        let text = self
            .inner
            .source_text(file)
            .await
            .ok_or_else(|| OverlayError::SourceUnavailable(file.to_path_buf()))?;
        let root = self.host.workspace_root();
        let config = RunConfiguration::from_options(&state.options, root.as_deref());
        let result = state.runner.run(file, Some(&text), &config).await?;

        let mut diagnostics = Vec::new();
        if !result.warnings.is_empty() {
            let base = root
                .as_deref()
                .or_else(|| file.parent())
                .unwrap_or(Path::new("."));
            if state.options.find_lint_config(base).is_some() {
                diagnostics.extend(result.warnings.iter().map(|w| operational_warning(file, w)));
            } else {
                for warning in &result.warnings {
                    tracing::info!(path = %file.display(), "{warning}");
                }
            }
        }

        let index = LineIndex::new(&text);
        let as_warnings = state.options.show_failures_as_warnings();
        let mut registry = ProblemRegistry::new();
        for finding in result.lint_result.findings_for(file) {
            let problem = Problem::new(finding.clone(), &index);
            diagnostics.push(problem_diagnostic(file, &problem, as_warnings));
            registry.set(problem);
        }
        tracing::debug!(
            path = %file.display(),
            problems = registry.len(),
            "lint pass finished"
        );
        state.problems.insert(file.to_path_buf(), registry);
        Ok(diagnostics)
    }
}

fn watch_lint_config(host: &dyn ProjectHost, options: &PluginOptions) {
    let Some(root) = host.workspace_root() else {
        return;
    };
    if let Some(config) = options
        .config_file_path(&root)
        .or_else(|| options.find_lint_config(&root))
    {
        host.watch_file(&config);
    }
}

impl<S: LanguageService> LanguageService for LintOverlay<S> {
    fn semantic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        Box::pin(async move {
            let mut diagnostics = self.inner.semantic_diagnostics(file).await;
            let mut state = self.state.lock().await;
            if state.options.suppress_while_type_errors_present && !diagnostics.is_empty() {
                return diagnostics;
            }
            state.problems.remove(file);
            if state.options.ignore_definition_files && is_definition_file(file) {
                return diagnostics;
            }
            match self.lint(&mut state, file).await {
                Ok(lint) => diagnostics.extend(lint),
                Err(e) => {
                    tracing::warn!(path = %file.display(), "Lint pass failed: {e:#}");
                }
            }
            diagnostics
        })
    }

    fn syntactic_diagnostics<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
        self.inner.syntactic_diagnostics(file)
    }

    fn code_fixes_at_position<'a>(
        &'a self,
        file: &'a Path,
        span: TextSpan,
        error_codes: &'a [String],
    ) -> ServiceFut<'a, Vec<CodeFixAction>> {
        Box::pin(async move {
            let mut fixes = self
                .inner
                .code_fixes_at_position(file, span, error_codes)
                .await;
            let state = self.state.lock().await;
            if state.options.suppress_while_type_errors_present && !fixes.is_empty() {
                return fixes;
            }
            let Some(registry) = state.problems.get(file) else {
                return fixes;
            };
            let Some(problem) = registry.get(span) else {
                return fixes;
            };

            if problem.is_fixable()
                && let Some(rule) = problem.rule_id()
            {
                fixes.push(single_fix(file, problem));
                if registry.fixable_for_rule(rule).nth(1).is_some() {
                    fixes.push(rule_fix_all(file, registry, rule));
                }
            }
            fixes.push(fix_all(file, registry));
            if let Some(disable) = disable_rule(file, problem) {
                fixes.push(disable);
            }
            fixes
        })
    }

    fn combined_code_fix<'a>(
        &'a self,
        file: &'a Path,
        fix_id: &'a str,
    ) -> ServiceFut<'a, CombinedCodeActions> {
        Box::pin(async move {
            let Some(rule) = rule_from_fix_id(fix_id) else {
                return self.inner.combined_code_fix(file, fix_id).await;
            };
            let state = self.state.lock().await;
            let changes = state
                .problems
                .get(file)
                .map(|registry| rule_fix_all(file, registry, rule).changes)
                .unwrap_or_default()
                .into_iter()
                .filter(|c| !c.text_changes.is_empty())
                .collect();
            CombinedCodeActions {
                changes,
                commands: Vec::new(),
            }
        })
    }

    fn source_text<'a>(&'a self, file: &'a Path) -> ServiceFut<'a, Option<String>> {
        self.inner.source_text(file)
    }

    fn is_lint_overlay(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::{fs, ptr};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lintbridge_runner::{
        LibraryLoader, LintError, LintLibrary, LintOutcome, LintRequest, LoadError,
        ModuleResolver, RunnerFut,
    };
    use lintbridge_types::{DiagnosticCategory, FileResult, Finding, Fix, LintReport};

    use super::*;

    struct FakeService {
        text: String,
        semantic: Vec<Diagnostic>,
        host_fixes: Vec<CodeFixAction>,
    }

    impl FakeService {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                semantic: Vec::new(),
                host_fixes: Vec::new(),
            }
        }
    }

    impl LanguageService for FakeService {
        fn semantic_diagnostics<'a>(&'a self, _file: &'a Path) -> ServiceFut<'a, Vec<Diagnostic>> {
            Box::pin(async move { self.semantic.clone() })
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
            Box::pin(async move { self.host_fixes.clone() })
        }

        fn combined_code_fix<'a>(
            &'a self,
            _file: &'a Path,
            fix_id: &'a str,
        ) -> ServiceFut<'a, CombinedCodeActions> {
            Box::pin(async move {
                CombinedCodeActions {
                    changes: Vec::new(),
                    commands: vec![serde_json::json!({ "host": fix_id })],
                }
            })
        }

        fn source_text<'a>(&'a self, _file: &'a Path) -> ServiceFut<'a, Option<String>> {
            Box::pin(async move { Some(self.text.clone()) })
        }
    }

    #[derive(Default)]
    struct FakeHost {
        root: Option<PathBuf>,
        watched: StdMutex<Vec<PathBuf>>,
        refreshes: AtomicUsize,
    }

    impl ProjectHost for FakeHost {
        fn workspace_root(&self) -> Option<PathBuf> {
            self.root.clone()
        }

        fn watch_file(&self, path: &Path) {
            self.watched.lock().unwrap().push(path.to_path_buf());
        }

        fn refresh_diagnostics(&self) {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Resolves;

    impl ModuleResolver for Resolves {
        fn resolve<'a>(
            &'a self,
            _module: &'a str,
            _node_path: Option<&'a Path>,
            _directory: &'a Path,
        ) -> RunnerFut<'a, Option<PathBuf>> {
            Box::pin(async { Some(PathBuf::from("/lib/eslint/lib/api.js")) })
        }

        fn global_root(
            &self,
            _package_manager: lintbridge_config::PackageManager,
        ) -> RunnerFut<'_, Option<PathBuf>> {
            Box::pin(async { None })
        }
    }

    struct Canned {
        report: LintReport,
        warnings: Vec<String>,
        fail: bool,
        runs: AtomicUsize,
    }

    impl LintLibrary for Canned {
        fn lint<'a>(
            &'a self,
            _request: LintRequest<'a>,
        ) -> RunnerFut<'a, Result<LintOutcome, LintError>> {
            Box::pin(async move {
                self.runs.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    return Err(LintError::Crashed {
                        code: Some(2),
                        stderr: "Oops! Something went wrong!".to_string(),
                    });
                }
                Ok(LintOutcome {
                    report: self.report.clone(),
                    warnings: self.warnings.clone(),
                })
            })
        }
    }

    struct CannedLoader(Arc<Canned>);

    impl LibraryLoader for CannedLoader {
        fn load(&self, _library_path: &Path) -> Result<Arc<dyn LintLibrary>, LoadError> {
            Ok(self.0.clone())
        }
    }

    const FILE: &str = "/w/src/a.ts";
    const TEXT: &str = "var a = \"x\"\nvar b = \"y\"\n";

    fn quotes(line: u32, start: usize) -> Finding {
        Finding::new(Some("quotes"), "Strings must use singlequote.", 2, line, 9)
            .with_end(line, 12)
            .with_fix(Fix::single(start, start + 3, "'q'"))
    }

    fn report(findings: Vec<Finding>) -> LintReport {
        LintReport::from_results(vec![FileResult {
            file_path: PathBuf::from(FILE),
            error_count: findings.len(),
            warning_count: 0,
            messages: findings,
        }])
    }

    fn canned(report: LintReport) -> Arc<Canned> {
        Arc::new(Canned {
            report,
            warnings: Vec::new(),
            fail: false,
            runs: AtomicUsize::new(0),
        })
    }

    fn overlay_with(
        service: FakeService,
        host: Arc<FakeHost>,
        options: PluginOptions,
        library: Arc<Canned>,
    ) -> LintOverlay<FakeService> {
        let runner = LintRunner::with_backends(Arc::new(Resolves), Arc::new(CannedLoader(library)));
        LintOverlay::with_runner(service, host, options, runner)
    }

    fn overlay(library: Arc<Canned>) -> LintOverlay<FakeService> {
        overlay_with(
            FakeService::new(TEXT),
            Arc::new(FakeHost::default()),
            PluginOptions::default(),
            library,
        )
    }

    fn host_error() -> Diagnostic {
        Diagnostic::new(
            FILE,
            TextSpan::new(0, 3),
            "Cannot find name 'x'.",
            DiagnosticCategory::Error,
        )
    }

    #[tokio::test]
    async fn appends_findings_to_host_diagnostics() {
        let library = canned(report(vec![quotes(1, 8)]));
        let overlay = overlay(library);
        let diags = overlay.semantic_diagnostics(Path::new(FILE)).await;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span(), TextSpan::from_bounds(8, 11));
        assert_eq!(diags[0].category(), DiagnosticCategory::Warning);
        assert_eq!(diags[0].message(), "Strings must use singlequote. (quotes)");
        assert_eq!(overlay.problems(Path::new(FILE)).await.len(), 1);
    }

    #[tokio::test]
    async fn errors_kept_when_not_forced_to_warnings() {
        let options = PluginOptions {
            always_show_rule_failures_as_warnings: Some(false),
            ..PluginOptions::default()
        };
        let overlay = overlay_with(
            FakeService::new(TEXT),
            Arc::new(FakeHost::default()),
            options,
            canned(report(vec![quotes(1, 8)])),
        );
        let diags = overlay.semantic_diagnostics(Path::new(FILE)).await;
        assert_eq!(diags[0].category(), DiagnosticCategory::Error);
    }

    #[tokio::test]
    async fn suppression_returns_host_diagnostics_untouched() {
        let library = canned(report(vec![quotes(1, 8)]));
        let mut service = FakeService::new(TEXT);
        service.semantic = vec![host_error()];
        let options = PluginOptions {
            suppress_while_type_errors_present: true,
            ..PluginOptions::default()
        };
        let overlay = overlay_with(service, Arc::new(FakeHost::default()), options, library.clone());
        let diags = overlay.semantic_diagnostics(Path::new(FILE)).await;
        assert_eq!(diags, vec![host_error()]);
        assert_eq!(library.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lint_crash_degrades_to_host_diagnostics() {
        let library = Arc::new(Canned {
            report: LintReport::empty(),
            warnings: Vec::new(),
            fail: true,
            runs: AtomicUsize::new(0),
        });
        let mut service = FakeService::new(TEXT);
        service.semantic = vec![host_error()];
        let overlay = overlay_with(
            service,
            Arc::new(FakeHost::default()),
            PluginOptions::default(),
            library,
        );
        let diags = overlay.semantic_diagnostics(Path::new(FILE)).await;
        assert_eq!(diags, vec![host_error()]);
        assert!(overlay.problems(Path::new(FILE)).await.is_empty());
    }

    #[tokio::test]
    async fn definition_files_are_skipped() {
        let library = canned(report(vec![quotes(1, 8)]));
        let overlay = overlay(library.clone());
        let diags = overlay.semantic_diagnostics(Path::new("/w/src/a.d.ts")).await;
        assert!(diags.is_empty());
        assert_eq!(library.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn warnings_surface_only_with_lint_config() {
        let dir = tempfile::tempdir().unwrap();
        let library = Arc::new(Canned {
            report: LintReport::empty(),
            warnings: vec!["deprecated option".to_string()],
            fail: false,
            runs: AtomicUsize::new(0),
        });
        let host = Arc::new(FakeHost {
            root: Some(dir.path().to_path_buf()),
            ..FakeHost::default()
        });
        let overlay = overlay_with(
            FakeService::new(TEXT),
            host,
            PluginOptions::default(),
            library,
        );

        let file = dir.path().join("a.ts");
        assert!(overlay.semantic_diagnostics(&file).await.is_empty());

        fs::write(dir.path().join(".eslintrc.json"), "{}").unwrap();
        let diags = overlay.semantic_diagnostics(&file).await;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].span(), TextSpan::empty_at(0));
        assert_eq!(diags[0].message(), "deprecated option");
        assert_eq!(diags[0].category(), DiagnosticCategory::Warning);
    }

    #[tokio::test]
    async fn code_fixes_for_published_span() {
        let overlay = overlay(canned(report(vec![quotes(1, 8), quotes(2, 20)])));
        let file = Path::new(FILE);
        overlay.semantic_diagnostics(file).await;

        let fixes = overlay
            .code_fixes_at_position(file, TextSpan::from_bounds(8, 11), &[])
            .await;
        let descriptions: Vec<&str> = fixes.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "Fix: Strings must use singlequote.",
                "Fix all 'quotes'",
                "Fix all auto-fixable eslint failures",
                "Disable rule 'quotes'",
            ]
        );
        assert!(fixes.iter().all(|f| f.fix_name == "eslint"));

        let misses = overlay
            .code_fixes_at_position(file, TextSpan::from_bounds(8, 10), &[])
            .await;
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn unfixable_problem_only_offers_fix_all_and_disable() {
        let finding = Finding::new(Some("no-var"), "Unexpected var.", 2, 1, 1).with_end(1, 12);
        let overlay = overlay(canned(report(vec![finding, quotes(2, 20)])));
        let file = Path::new(FILE);
        overlay.semantic_diagnostics(file).await;
        let fixes = overlay
            .code_fixes_at_position(file, TextSpan::from_bounds(0, 11), &[])
            .await;
        let descriptions: Vec<&str> = fixes.iter().map(|f| f.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["Fix all auto-fixable eslint failures", "Disable rule 'no-var'"]
        );
        assert_eq!(fixes[0].edit_count(), 1);
    }

    #[tokio::test]
    async fn host_fixes_win_under_suppression() {
        let host_fix = CodeFixAction {
            fix_name: "fixMissingImport".to_string(),
            description: "Add import".to_string(),
            changes: Vec::new(),
            fix_id: None,
            fix_all_description: None,
        };
        let mut service = FakeService::new(TEXT);
        service.host_fixes = vec![host_fix.clone()];
        let options = PluginOptions {
            suppress_while_type_errors_present: true,
            ..PluginOptions::default()
        };
        let overlay = overlay_with(
            service,
            Arc::new(FakeHost::default()),
            options,
            canned(report(vec![quotes(1, 8)])),
        );
        let file = Path::new(FILE);
        overlay.semantic_diagnostics(file).await;
        let fixes = overlay
            .code_fixes_at_position(file, TextSpan::from_bounds(8, 11), &[])
            .await;
        assert_eq!(fixes, vec![host_fix]);
    }

    #[tokio::test]
    async fn combined_fix_by_rule_group() {
        let overlay = overlay(canned(report(vec![quotes(1, 8), quotes(2, 20)])));
        let file = Path::new(FILE);
        overlay.semantic_diagnostics(file).await;

        let combined = overlay.combined_code_fix(file, "eslint:quotes").await;
        assert_eq!(combined.changes.len(), 1);
        assert_eq!(combined.changes[0].text_changes.len(), 2);
        assert!(combined.commands.is_empty());

        let none = overlay.combined_code_fix(file, "eslint:semi").await;
        assert!(none.changes.is_empty());

        let host = overlay.combined_code_fix(file, "fixMissingImport").await;
        assert_eq!(host.commands, vec![serde_json::json!({ "host": "fixMissingImport" })]);
    }

    #[tokio::test]
    async fn options_update_clears_and_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eslint.config.js"), "export default [];").unwrap();
        let host = Arc::new(FakeHost {
            root: Some(dir.path().to_path_buf()),
            ..FakeHost::default()
        });
        let overlay = overlay_with(
            FakeService::new(TEXT),
            host.clone(),
            PluginOptions::default(),
            canned(LintReport::empty()),
        );
        assert_eq!(
            host.watched.lock().unwrap().as_slice(),
            &[dir.path().join("eslint.config.js")]
        );

        let options = PluginOptions {
            config_file: Some(PathBuf::from("custom.json")),
            js_enable: true,
            ..PluginOptions::default()
        };
        overlay.update_options(options).await;
        assert!(overlay.options().await.js_enable);
        assert_eq!(
            host.watched.lock().unwrap().last(),
            Some(&dir.path().join("custom.json"))
        );
        assert_eq!(host.refreshes.load(Ordering::SeqCst), 1);

        overlay.on_config_file_changed();
        assert_eq!(host.refreshes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn decorate_is_idempotent() {
        let host: Arc<dyn ProjectHost> = Arc::new(FakeHost::default());
        let once = decorate(
            Box::new(FakeService::new(TEXT)),
            host.clone(),
            PluginOptions::default(),
        );
        assert!(once.is_lint_overlay());
        let before = ptr::from_ref(&*once).cast::<()>();
        let twice = decorate(once, host, PluginOptions::default());
        assert!(twice.is_lint_overlay());
        assert_eq!(ptr::from_ref(&*twice).cast::<()>(), before);
    }
}
