//! Finding → host diagnostic conversion.

use std::path::Path;

use lintbridge_types::{Diagnostic, DiagnosticCategory, Finding, LINT_SOURCE, TextSpan};

use crate::problems::Problem;

/// Category for a finding. With `as_warnings` every finding is a warning;
/// otherwise analyzer errors stay errors.
#[must_use]
pub fn category_for(finding: &Finding, as_warnings: bool) -> DiagnosticCategory {
    if !as_warnings && finding.is_error() {
        DiagnosticCategory::Error
    } else {
        DiagnosticCategory::Warning
    }
}

/// `"<message> (<rule>)"`, or the bare message for rule-less findings.
#[must_use]
pub fn message_for(finding: &Finding) -> String {
    match finding.rule_id() {
        Some(rule) => format!("{} ({rule})", finding.message()),
        None => finding.message().to_string(),
    }
}

#[must_use]
pub fn problem_diagnostic(file: &Path, problem: &Problem, as_warnings: bool) -> Diagnostic {
    let finding = problem.finding();
    let diagnostic = Diagnostic::new(
        file,
        problem.span(),
        message_for(finding),
        category_for(finding, as_warnings),
    )
    .with_source(LINT_SOURCE);
    match finding.rule_id() {
        Some(rule) => diagnostic.with_code(rule),
        None => diagnostic,
    }
}

/// Zero-length warning at the top of `file` carrying an operational message.
#[must_use]
pub fn operational_warning(file: &Path, message: &str) -> Diagnostic {
    Diagnostic::new(
        file,
        TextSpan::empty_at(0),
        message,
        DiagnosticCategory::Warning,
    )
    .with_source(LINT_SOURCE)
}
