//! Analyzer-side types: the shape of a lint report as the analyzer emits it.
//!
//! These mirror the analyzer's JSON report (`[{filePath, messages, ...}]`).
//! Offsets inside a [`Replacement`] and the columns of a [`Finding`] are in the
//! analyzer's own units; converting them into snapshot offsets is the overlay's job.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One textual edit proposed by the analyzer: replace `[start, end)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReplacementRepr", into = "ReplacementRepr")]
pub struct Replacement {
    start: usize,
    end: usize,
    text: String,
}

#[derive(Serialize, Deserialize)]
struct ReplacementRepr {
    range: (usize, usize),
    #[serde(default)]
    text: String,
}

impl From<ReplacementRepr> for Replacement {
    fn from(repr: ReplacementRepr) -> Self {
        Self::new(repr.range.0, repr.range.1, repr.text)
    }
}

impl From<Replacement> for ReplacementRepr {
    fn from(value: Replacement) -> Self {
        Self {
            range: (value.start, value.end),
            text: value.text,
        }
    }
}

impl Replacement {
    /// An `end` before `start` is clamped up to `start`.
    #[must_use]
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end: end.max(start),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Neither deletes nor inserts anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end && self.text.is_empty()
    }
}

/// A fix is one or more disjoint replacements.
///
/// The analyzer emits either a single `{range, text}` object or an array of
/// them; both forms deserialize into the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FixRepr", into = "Vec<Replacement>")]
pub struct Fix {
    replacements: Vec<Replacement>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FixRepr {
    One(Replacement),
    Many(Vec<Replacement>),
}

impl From<FixRepr> for Fix {
    fn from(repr: FixRepr) -> Self {
        match repr {
            FixRepr::One(replacement) => Self::new(vec![replacement]),
            FixRepr::Many(replacements) => Self::new(replacements),
        }
    }
}

impl From<Fix> for Vec<Replacement> {
    fn from(fix: Fix) -> Self {
        fix.replacements
    }
}

impl Fix {
    #[must_use]
    pub fn new(replacements: Vec<Replacement>) -> Self {
        Self { replacements }
    }

    #[must_use]
    pub fn single(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self::new(vec![Replacement::new(start, end, text)])
    }

    #[must_use]
    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    /// Whether applying this fix would change anything.
    #[must_use]
    pub fn has_effect(&self) -> bool {
        self.replacements.iter().any(|r| !r.is_empty())
    }
}

/// One problem reported by the analyzer.
///
/// Fields are private; a finding is immutable once the runner has produced it.
/// Lines and columns are 1-based. A missing or zero line means the finding is
/// not attached to a position (e.g. "file ignored" notices).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default)]
    rule_id: Option<String>,
    message: String,
    #[serde(default)]
    severity: u8,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default)]
    end_line: Option<u32>,
    #[serde(default)]
    end_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fix: Option<Fix>,
}

impl Finding {
    /// Analyzer severity value for "error". Everything else is a warning.
    pub const SEVERITY_ERROR: u8 = 2;

    #[must_use]
    pub fn new(
        rule_id: Option<&str>,
        message: impl Into<String>,
        severity: u8,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            rule_id: rule_id.map(str::to_string),
            message: message.into(),
            severity,
            line: Some(line),
            column: Some(column),
            end_line: None,
            end_column: None,
            fix: None,
        }
    }

    #[must_use]
    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn severity(&self) -> u8 {
        self.severity
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Self::SEVERITY_ERROR
    }

    #[must_use]
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> Option<u32> {
        self.column
    }

    #[must_use]
    pub fn end_line(&self) -> Option<u32> {
        self.end_line
    }

    #[must_use]
    pub fn end_column(&self) -> Option<u32> {
        self.end_column
    }

    #[must_use]
    pub fn fix(&self) -> Option<&Fix> {
        self.fix.as_ref()
    }

    /// A finding is fixable iff it carries a fix with at least one
    /// non-empty replacement.
    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fix.as_ref().is_some_and(Fix::has_effect)
    }
}

/// All findings the analyzer reported for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_path: PathBuf,
    #[serde(default)]
    pub messages: Vec<Finding>,
    #[serde(default)]
    pub error_count: usize,
    #[serde(default)]
    pub warning_count: usize,
}

/// A complete analyzer report for one run, grouped per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub results: Vec<FileResult>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl LintReport {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a report from per-file results, totalling their counts.
    #[must_use]
    pub fn from_results(results: Vec<FileResult>) -> Self {
        let error_count = results.iter().map(|r| r.error_count).sum();
        let warning_count = results.iter().map(|r| r.warning_count).sum();
        Self {
            results,
            error_count,
            warning_count,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.iter().all(|r| r.messages.is_empty())
    }

    /// Findings addressed at `file`. A run may report on other files too;
    /// those are skipped.
    pub fn findings_for<'a>(&'a self, file: &Path) -> impl Iterator<Item = &'a Finding> + 'a {
        let wanted = normalize_path(file);
        self.results
            .iter()
            .filter(move |r| normalize_path(&r.file_path) == wanted)
            .flat_map(|r| r.messages.iter())
    }
}

/// Lexically normalize a path: drop `.` components and fold `..` into its parent.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = Vec::new();
    for c in path.components() {
        match c {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other),
        }
    }
    out.iter().collect()
}
