//! Host-side types: what the editor host consumes from its language service.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::span::TextSpan;

/// Category of a host diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl DiagnosticCategory {
    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        }
    }
}

/// A diagnostic as published to the host.
///
/// Fields are private; external consumers read via accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    file: PathBuf,
    span: TextSpan,
    message: String,
    category: DiagnosticCategory,
    /// Rule identifier for lint diagnostics, host error code otherwise.
    code: Option<String>,
    /// Producer of the diagnostic (e.g. "eslint"). `None` for the host's own.
    source: Option<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn new(
        file: impl Into<PathBuf>,
        span: TextSpan,
        message: impl Into<String>,
        category: DiagnosticCategory,
    ) -> Self {
        Self {
            file: file.into(),
            span,
            message: message.into(),
            category,
            code: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    #[must_use]
    pub fn span(&self) -> TextSpan {
        self.span
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn category(&self) -> DiagnosticCategory {
        self.category
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

/// Replace `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub span: TextSpan,
    pub new_text: String,
}

impl TextChange {
    #[must_use]
    pub fn new(span: TextSpan, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    /// Apply a set of non-overlapping changes to `text`.
    ///
    /// Changes are applied back to front so earlier offsets stay valid.
    /// Changes whose span falls outside `text` or off a char boundary are skipped.
    #[must_use]
    pub fn apply_all(text: &str, changes: &[TextChange]) -> String {
        let mut sorted: Vec<&TextChange> = changes.iter().collect();
        sorted.sort_by_key(|c| Reverse(c.span.start()));
        let mut out = text.to_string();
        for change in sorted {
            let (start, end) = (change.span.start(), change.span.end());
            if end > out.len() || !out.is_char_boundary(start) || !out.is_char_boundary(end) {
                continue;
            }
            out.replace_range(start..end, &change.new_text);
        }
        out
    }
}

/// Text changes for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTextChanges {
    pub file_name: PathBuf,
    pub text_changes: Vec<TextChange>,
}

/// A quick-fix offered to the host for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeFixAction {
    pub fix_name: String,
    pub description: String,
    pub changes: Vec<FileTextChanges>,
    /// Groups this action with others that can be applied together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_all_description: Option<String>,
}

impl CodeFixAction {
    /// Total number of text edits across all files.
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.changes.iter().map(|c| c.text_changes.len()).sum()
    }
}

/// Result of applying a fix-group across a scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedCodeActions {
    pub changes: Vec<FileTextChanges>,
    /// Host commands to run after the edits. Opaque to this crate.
    #[serde(default)]
    pub commands: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder_sets_code_and_source() {
        let diag = Diagnostic::new(
            "a.ts",
            TextSpan::new(0, 3),
            "Missing semicolon. (semi)",
            DiagnosticCategory::Warning,
        )
        .with_code("semi")
        .with_source("eslint");
        assert_eq!(diag.code(), Some("semi"));
        assert_eq!(diag.source(), Some("eslint"));
        assert!(!diag.category().is_error());
    }

    #[test]
    fn apply_all_applies_back_to_front() {
        let changes = vec![
            TextChange::new(TextSpan::from_bounds(0, 3), "let"),
            TextChange::new(TextSpan::from_bounds(9, 9), ";"),
        ];
        assert_eq!(TextChange::apply_all("var x = 1", &changes), "let x = 1;");
    }

    #[test]
    fn apply_all_skips_out_of_range_changes() {
        let changes = vec![TextChange::new(TextSpan::from_bounds(5, 50), "x")];
        assert_eq!(TextChange::apply_all("short", &changes), "short");
    }

    #[test]
    fn category_labels() {
        assert_eq!(DiagnosticCategory::Error.label(), "error");
        assert_eq!(DiagnosticCategory::Warning.label(), "warning");
    }
}
