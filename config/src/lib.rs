//! Plugin options for lintbridge.
//!
//! Options arrive either as a JSON configuration-change notification from the
//! host ([`PluginOptions::from_json`]) or from a TOML file on disk
//! ([`PluginOptions::load`]). Both use the same camelCase keys.
//!
//! ```toml
//! jsEnable = true
//! exclude = ["**/generated/**"]
//! packageManager = "pnpm"
//! ```

use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use serde::Deserialize;
use toml::de::Error as TomlError;

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

/// Lint configuration files whose presence signals that linting is intended.
pub const LINT_CONFIG_FILE_NAMES: &[&str] = &[
    "eslint.config.js",
    "eslint.config.mjs",
    "eslint.config.cjs",
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.json",
    ".eslintrc.yaml",
    ".eslintrc.yml",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: TomlError,
    },
    #[error("invalid plugin options: {0}")]
    Notification(#[from] serde_json::Error),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Notification(_) => None,
        }
    }
}

/// Package manager used to locate a global analyzer install.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
}

impl PackageManager {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
        }
    }

    /// Command that installs `package` into the current project.
    #[must_use]
    pub fn local_install_command(self, package: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm install {package}"),
            PackageManager::Pnpm => format!("pnpm install {package}"),
            PackageManager::Yarn => format!("yarn add {package}"),
        }
    }

    /// Command that installs `package` globally.
    #[must_use]
    pub fn global_install_command(self, package: &str) -> String {
        match self {
            PackageManager::Npm => format!("npm install -g {package}"),
            PackageManager::Pnpm => format!("pnpm install -g {package}"),
            PackageManager::Yarn => format!("yarn global add {package}"),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glob patterns excluding files from linting.
///
/// Accepts either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "ExcludeRepr")]
pub struct ExcludePatterns(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ExcludeRepr {
    One(String),
    Many(Vec<String>),
}

impl From<ExcludeRepr> for ExcludePatterns {
    fn from(repr: ExcludeRepr) -> Self {
        match repr {
            ExcludeRepr::One(pattern) => Self(vec![pattern]),
            ExcludeRepr::Many(patterns) => Self(patterns),
        }
    }
}

impl ExcludePatterns {
    #[must_use]
    pub fn new(patterns: Vec<String>) -> Self {
        Self(patterns)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options recognised in a configuration-change notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    /// Return host diagnostics untouched while the host reports its own errors.
    #[serde(default)]
    pub suppress_while_type_errors_present: bool,
    /// Skip `.d.ts` files. Default: true.
    #[serde(default = "default_true")]
    pub ignore_definition_files: bool,
    /// Lint `.js`/`.jsx` files too. Default: false.
    #[serde(default)]
    pub js_enable: bool,
    #[serde(default)]
    pub exclude: ExcludePatterns,
    #[serde(default)]
    pub package_manager: PackageManager,
    /// Unset means "on".
    #[serde(default)]
    pub always_show_rule_failures_as_warnings: Option<bool>,
    /// Explicit analyzer config file.
    #[serde(default)]
    pub config_file: Option<PathBuf>,
    /// Directory to resolve the analyzer library from before the project itself.
    #[serde(default)]
    pub node_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub allow_inline_config: bool,
    #[serde(default)]
    pub report_unused_disable_directives: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            suppress_while_type_errors_present: false,
            ignore_definition_files: true,
            js_enable: false,
            exclude: ExcludePatterns::default(),
            package_manager: PackageManager::default(),
            always_show_rule_failures_as_warnings: None,
            config_file: None,
            node_path: None,
            allow_inline_config: true,
            report_unused_disable_directives: false,
        }
    }
}

impl PluginOptions {
    /// Parse a configuration-change notification payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(options) => Ok(options),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Whether every finding is presented as a warning regardless of its severity.
    #[must_use]
    pub fn show_failures_as_warnings(&self) -> bool {
        self.always_show_rule_failures_as_warnings.unwrap_or(true)
    }

    /// Explicit config file, resolved against `base` when relative.
    #[must_use]
    pub fn config_file_path(&self, base: &Path) -> Option<PathBuf> {
        self.config_file.as_ref().map(|file| {
            if file.is_absolute() {
                file.clone()
            } else {
                base.join(file)
            }
        })
    }

    /// First lint configuration file that exists on disk.
    ///
    /// The explicit `configFile` wins when it exists; otherwise the
    /// well-known names are checked in `base`.
    #[must_use]
    pub fn find_lint_config(&self, base: &Path) -> Option<PathBuf> {
        if let Some(explicit) = self.config_file_path(base)
            && explicit.is_file()
        {
            return Some(explicit);
        }
        LINT_CONFIG_FILE_NAMES
            .iter()
            .map(|name| base.join(name))
            .find(|candidate| candidate.is_file())
    }
}
