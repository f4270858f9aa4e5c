//! The per-file lint pipeline: exclusion, resolution, loading, execution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lintbridge_config::{PackageManager, PluginOptions};
use lintbridge_types::LintReport;

use crate::ANALYZER_PACKAGE;
use crate::error::{LintError, LoadError};
use crate::exclude::{ExclusionMatcher, is_definition_file, is_js_file};
use crate::library::{LibraryLoader, LintLibrary, LintRequest, NodeLibraryLoader};
use crate::mru::MruCache;
use crate::resolve::{ModuleResolver, NodeResolver};

/// Maximum number of files whose library resolution is remembered.
pub const RESOLUTION_CACHE_CAPACITY: usize = 100;

/// How to run the analyzer for one request. Immutable once assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfiguration {
    pub config_file: Option<PathBuf>,
    pub js_enable: bool,
    pub ignore_definition_files: bool,
    pub exclude: Vec<String>,
    pub package_manager: PackageManager,
    pub workspace_folder_path: Option<PathBuf>,
    /// Directory to resolve the analyzer from before the file's own directory.
    pub node_path: Option<PathBuf>,
    pub allow_inline_config: bool,
    pub report_unused_disable_directives: bool,
}

impl RunConfiguration {
    #[must_use]
    pub fn from_options(options: &PluginOptions, workspace_folder_path: Option<&Path>) -> Self {
        let config_file = workspace_folder_path
            .map(|root| options.config_file_path(root))
            .unwrap_or_else(|| options.config_file.clone());
        Self {
            config_file,
            js_enable: options.js_enable,
            ignore_definition_files: options.ignore_definition_files,
            exclude: options.exclude.as_slice().to_vec(),
            package_manager: options.package_manager,
            workspace_folder_path: workspace_folder_path.map(Path::to_path_buf),
            node_path: options.node_path.clone(),
            allow_inline_config: options.allow_inline_config,
            report_unused_disable_directives: options.report_unused_disable_directives,
        }
    }
}

/// Normalized outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    pub lint_result: LintReport,
    /// Non-fatal operational messages (missing install, ignored settings,
    /// analyzer warnings).
    pub warnings: Vec<String>,
    pub workspace_folder_path: Option<PathBuf>,
    pub config_file_path: Option<PathBuf>,
}

impl RunResult {
    fn empty(config: &RunConfiguration, warnings: Vec<String>) -> Self {
        Self {
            lint_result: LintReport::empty(),
            warnings,
            workspace_folder_path: config.workspace_folder_path.clone(),
            config_file_path: config.config_file.clone(),
        }
    }
}

/// Actionable message for a file whose analyzer library could not be found.
#[must_use]
pub fn install_failure_message(file: &Path, package_manager: PackageManager) -> String {
    format!(
        "Failed to load the {ANALYZER_PACKAGE} library for '{}'. To use {ANALYZER_PACKAGE}, please install it using '{}' or globally using '{}'. Be sure to restart your editor after installing {ANALYZER_PACKAGE}.",
        file.display(),
        package_manager.local_install_command(ANALYZER_PACKAGE),
        package_manager.global_install_command(ANALYZER_PACKAGE),
    )
}

fn ignored_node_path_message(node_path: &Path) -> String {
    format!(
        "The setting 'nodePath' refers to '{}', but this path does not exist. The setting will be ignored.",
        node_path.display()
    )
}

/// Where a file's library lives, remembered per file. `None` means nothing
/// resolved; that outcome is cached too.
#[derive(Debug, Clone)]
struct CachedResolution {
    library_path: Option<PathBuf>,
}

#[derive(Clone)]
enum LoadedLibrary {
    Ready(Arc<dyn LintLibrary>),
    Failed(LoadError),
}

/// Runs the analyzer for individual files.
///
/// Not internally synchronized: callers that share a runner serialize access
/// (the overlay keeps it behind a mutex).
pub struct LintRunner {
    resolver: Arc<dyn ModuleResolver>,
    loader: Arc<dyn LibraryLoader>,
    resolutions: MruCache<PathBuf, CachedResolution>,
    libraries: HashMap<PathBuf, LoadedLibrary>,
    global_roots: HashMap<PackageManager, Option<PathBuf>>,
}

impl Default for LintRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRunner {
    /// Runner backed by real `node` subprocesses.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backends(
            Arc::new(NodeResolver::new()),
            Arc::new(NodeLibraryLoader::new()),
        )
    }

    #[must_use]
    pub fn with_backends(resolver: Arc<dyn ModuleResolver>, loader: Arc<dyn LibraryLoader>) -> Self {
        Self {
            resolver,
            loader,
            resolutions: MruCache::new(RESOLUTION_CACHE_CAPACITY),
            libraries: HashMap::new(),
            global_roots: HashMap::new(),
        }
    }

    /// Forget every resolution and loaded library, e.g. after the options changed.
    pub fn clear_caches(&mut self) {
        self.resolutions.clear();
        self.libraries.clear();
        self.global_roots.clear();
    }

    #[must_use]
    pub fn cached_resolution_count(&self) -> usize {
        self.resolutions.len()
    }

    /// Whether `file` is skipped without consulting the analyzer.
    #[must_use]
    pub fn is_excluded(file: &Path, config: &RunConfiguration) -> bool {
        if config.ignore_definition_files && is_definition_file(file) {
            return true;
        }
        if config.exclude.is_empty() {
            return false;
        }
        ExclusionMatcher::new(&config.exclude)
            .is_excluded(file, config.workspace_folder_path.as_deref())
    }

    /// Lint one file.
    ///
    /// Resolution and load failures produce an empty report (with warnings
    /// where useful). Only failures of the analyzer call itself are returned
    /// as `Err`.
    pub async fn run(
        &mut self,
        file: &Path,
        text: Option<&str>,
        config: &RunConfiguration,
    ) -> Result<RunResult, LintError> {
        if Self::is_excluded(file, config) {
            tracing::debug!(path = %file.display(), "file excluded from linting");
            return Ok(RunResult::empty(config, Vec::new()));
        }
        if is_js_file(file) && !config.js_enable {
            tracing::trace!(path = %file.display(), "js linting disabled");
            return Ok(RunResult::empty(config, Vec::new()));
        }

        let mut warnings = Vec::new();
        let library_path = self.library_path_for(file, config, &mut warnings).await;
        let Some(library_path) = library_path else {
            warnings.push(install_failure_message(file, config.package_manager));
            return Ok(RunResult::empty(config, warnings));
        };

        let library = match self.load_library(&library_path) {
            LoadedLibrary::Ready(library) => library,
            LoadedLibrary::Failed(e) => {
                tracing::debug!(path = %library_path.display(), "analyzer library unavailable: {e}");
                return Ok(RunResult::empty(config, warnings));
            }
        };

        let request = LintRequest {
            file,
            text,
            working_dir: config.workspace_folder_path.as_deref(),
            config_file: config.config_file.as_deref(),
            allow_inline_config: config.allow_inline_config,
            report_unused_disable_directives: config.report_unused_disable_directives,
        };
        let outcome = library.lint(request).await?;
        warnings.extend(outcome.warnings);

        Ok(RunResult {
            lint_result: outcome.report,
            warnings,
            workspace_folder_path: config.workspace_folder_path.clone(),
            config_file_path: config.config_file.clone(),
        })
    }

    async fn library_path_for(
        &mut self,
        file: &Path,
        config: &RunConfiguration,
        warnings: &mut Vec<String>,
    ) -> Option<PathBuf> {
        let key = file.to_path_buf();
        if let Some(cached) = self.resolutions.get(&key) {
            tracing::trace!(path = %file.display(), "resolution cache hit");
            return cached.library_path.clone();
        }

        let library_path = self.resolve_library(file, config, warnings).await;
        if let Some((evicted, _)) = self.resolutions.insert(
            key,
            CachedResolution {
                library_path: library_path.clone(),
            },
        ) {
            tracing::trace!(path = %evicted.display(), "resolution cache evicted entry");
        }
        library_path
    }

    async fn resolve_library(
        &mut self,
        file: &Path,
        config: &RunConfiguration,
        warnings: &mut Vec<String>,
    ) -> Option<PathBuf> {
        let directory = file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let override_path = match &config.node_path {
            Some(path) if path.exists() => Some(path.clone()),
            Some(path) => {
                warnings.push(ignored_node_path_message(path));
                None
            }
            None => None,
        };

        let local = match &override_path {
            Some(np) => self.resolver.resolve(ANALYZER_PACKAGE, Some(np), np).await,
            None => self.resolver.resolve(ANALYZER_PACKAGE, None, directory).await,
        };
        if local.is_some() {
            return local;
        }

        let global = self.global_root(config.package_manager).await?;
        self.resolver
            .resolve(ANALYZER_PACKAGE, Some(&global), directory)
            .await
    }

    async fn global_root(&mut self, package_manager: PackageManager) -> Option<PathBuf> {
        if let Some(root) = self.global_roots.get(&package_manager) {
            return root.clone();
        }
        let root = self.resolver.global_root(package_manager).await;
        tracing::debug!(%package_manager, root = ?root, "global module root");
        self.global_roots.insert(package_manager, root.clone());
        root
    }

    fn load_library(&mut self, library_path: &Path) -> LoadedLibrary {
        if let Some(loaded) = self.libraries.get(library_path) {
            return loaded.clone();
        }
        let loaded = match self.loader.load(library_path) {
            Ok(library) => LoadedLibrary::Ready(library),
            Err(e) => {
                tracing::warn!(path = %library_path.display(), "Failed to load analyzer library: {e}");
                LoadedLibrary::Failed(e)
            }
        };
        self.libraries
            .insert(library_path.to_path_buf(), loaded.clone());
        loaded
    }
}
