//! Locating the analyzer library on disk.
//!
//! Node's own module resolution is authoritative, so rather than re-implement
//! it we ask a short-lived `node` process to `require.resolve` the package.

use std::env::{join_paths, split_paths, var_os};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lintbridge_config::PackageManager;
use tokio::process::Command;

use crate::RunnerFut;
use crate::process::run_captured;

const RESOLVE_TIMEOUT_SECS: u64 = 10;

const NODE_PATH_VAR: &str = "NODE_PATH";

/// Finds installed modules. Implementations must never fail loudly:
/// anything that goes wrong is "not resolved".
pub trait ModuleResolver: Send + Sync {
    /// Resolve `module` as seen from `directory`, with `node_path` prepended
    /// to the module search path.
    fn resolve<'a>(
        &'a self,
        module: &'a str,
        node_path: Option<&'a Path>,
        directory: &'a Path,
    ) -> RunnerFut<'a, Option<PathBuf>>;

    /// Global module root for `package_manager`.
    fn global_root(&self, package_manager: PackageManager) -> RunnerFut<'_, Option<PathBuf>>;
}

/// Resolver backed by `node`, `npm`, `pnpm` and `yarn` subprocesses.
#[derive(Debug, Clone)]
pub struct NodeResolver {
    timeout: Duration,
}

impl Default for NodeResolver {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(RESOLVE_TIMEOUT_SECS),
        }
    }
}

impl NodeResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn capture_line(&self, cmd: Command) -> Option<String> {
        match run_captured(cmd, None, Some(self.timeout)).await {
            Ok(output) => {
                if !output.status.success() {
                    tracing::debug!(
                        status = ?output.status.code(),
                        stderr = %output.stderr.trim(),
                        "resolution subprocess failed"
                    );
                }
                output.success_line().map(str::to_string)
            }
            Err(e) => {
                tracing::warn!("resolution subprocess failed: {e}");
                None
            }
        }
    }
}

/// `node_path` followed by the inherited `NODE_PATH` entries.
fn search_path(node_path: &Path, inherited: Option<OsString>) -> Option<OsString> {
    let mut entries = vec![node_path.to_path_buf()];
    if let Some(existing) = inherited {
        entries.extend(split_paths(&existing));
    }
    join_paths(entries).ok()
}

fn resolve_script(module: &str) -> String {
    format!("console.log(require.resolve({module:?}))")
}

impl ModuleResolver for NodeResolver {
    fn resolve<'a>(
        &'a self,
        module: &'a str,
        node_path: Option<&'a Path>,
        directory: &'a Path,
    ) -> RunnerFut<'a, Option<PathBuf>> {
        Box::pin(async move {
            let Ok(node) = which::which("node") else {
                tracing::debug!("node not found in PATH; cannot resolve {module}");
                return None;
            };
            let mut cmd = Command::new(node);
            cmd.arg("-e").arg(resolve_script(module)).current_dir(directory);
            if let Some(node_path) = node_path {
                match search_path(node_path, var_os(NODE_PATH_VAR)) {
                    Some(value) => {
                        cmd.env(NODE_PATH_VAR, value);
                    }
                    None => {
                        tracing::warn!(
                            "cannot add {} to {NODE_PATH_VAR}; resolving without it",
                            node_path.display()
                        );
                    }
                }
            }
            let resolved = self.capture_line(cmd).await.map(PathBuf::from);
            tracing::debug!(
                module,
                directory = %directory.display(),
                resolved = ?resolved,
                "module resolution finished"
            );
            resolved
        })
    }

    fn global_root(&self, package_manager: PackageManager) -> RunnerFut<'_, Option<PathBuf>> {
        Box::pin(async move {
            let Ok(binary) = which::which(package_manager.as_str()) else {
                tracing::debug!("{package_manager} not found in PATH");
                return None;
            };
            let mut cmd = Command::new(binary);
            match package_manager {
                PackageManager::Npm | PackageManager::Pnpm => {
                    cmd.args(["root", "-g"]);
                }
                PackageManager::Yarn => {
                    cmd.args(["global", "dir"]);
                }
            }
            let line = self.capture_line(cmd).await?;
            let root = match package_manager {
                PackageManager::Yarn => PathBuf::from(line).join("node_modules"),
                PackageManager::Npm | PackageManager::Pnpm => PathBuf::from(line),
            };
            Some(root)
        })
    }
}
