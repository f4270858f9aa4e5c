//! File exclusion rules.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// `.d.ts` declaration files.
#[must_use]
pub fn is_definition_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts"))
}

/// Plain JavaScript sources (`.js`, `.jsx`), which are only linted on request.
#[must_use]
pub fn is_js_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("js") || e.eq_ignore_ascii_case("jsx"))
}

/// Matches files against the configured exclusion globs.
///
/// `*` does not cross path separators and dotfiles are matched like any
/// other name. A path is tried relative to the workspace first, then as given.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    set: GlobSet,
}

impl ExclusionMatcher {
    /// Invalid patterns are logged and skipped so one typo doesn't disable
    /// every other exclusion.
    #[must_use]
    pub fn new(patterns: &[String]) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            match GlobBuilder::new(pat).literal_separator(true).build() {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid exclude pattern '{pat}': {e}");
                }
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Invalid exclude patterns: {e}");
            GlobSet::empty()
        });
        Self { set }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[must_use]
    pub fn is_excluded(&self, file: &Path, workspace_root: Option<&Path>) -> bool {
        if self.set.is_empty() {
            return false;
        }
        if let Some(root) = workspace_root
            && let Ok(relative) = file.strip_prefix(root)
            && self.set.is_match(relative)
        {
            return true;
        }
        self.set.is_match(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> ExclusionMatcher {
        ExclusionMatcher::new(&patterns.iter().map(|p| (*p).to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn definition_and_js_detection() {
        assert!(is_definition_file(Path::new("/w/types/index.d.ts")));
        assert!(!is_definition_file(Path::new("/w/src/index.ts")));
        assert!(is_js_file(Path::new("/w/a.js")));
        assert!(is_js_file(Path::new("/w/a.JSX")));
        assert!(!is_js_file(Path::new("/w/a.ts")));
        assert!(!is_js_file(Path::new("/w/a.json")));
    }

    #[test]
    fn excludes_relative_to_workspace() {
        let m = matcher(&["src/generated/*.ts"]);
        let root = Path::new("/w");
        assert!(m.is_excluded(Path::new("/w/src/generated/api.ts"), Some(root)));
        assert!(!m.is_excluded(Path::new("/w/src/api.ts"), Some(root)));
    }

    #[test]
    fn excludes_absolute_path() {
        let m = matcher(&["/w/src/test.ts"]);
        assert!(m.is_excluded(Path::new("/w/src/test.ts"), Some(Path::new("/w"))));
        assert!(m.is_excluded(Path::new("/w/src/test.ts"), None));
    }

    #[test]
    fn star_does_not_cross_separators() {
        let m = matcher(&["src/*.ts"]);
        let root = Path::new("/w");
        assert!(m.is_excluded(Path::new("/w/src/a.ts"), Some(root)));
        assert!(!m.is_excluded(Path::new("/w/src/nested/a.ts"), Some(root)));
    }

    #[test]
    fn matches_dotfiles() {
        let m = matcher(&["**/*.ts"]);
        assert!(m.is_excluded(Path::new("/w/.hidden/.config.ts"), Some(Path::new("/w"))));
    }

    #[test]
    fn invalid_pattern_is_skipped() {
        let m = matcher(&["a[", "*.spec.ts"]);
        assert!(m.is_excluded(Path::new("/w/a.spec.ts"), Some(Path::new("/w"))));
    }

    #[test]
    fn empty_matcher_excludes_nothing() {
        let m = matcher(&[]);
        assert!(m.is_empty());
        assert!(!m.is_excluded(Path::new("/w/a.ts"), Some(Path::new("/w"))));
    }
}
