//! Code-fix action builders.

use std::path::Path;

use lintbridge_types::{CodeFixAction, FileTextChanges, LINT_SOURCE, TextChange};

use crate::problems::{Problem, ProblemRegistry};
use crate::replacements::non_overlapping;

/// `fix_name` of every action the overlay offers.
pub const FIX_NAME: &str = LINT_SOURCE;

const FIX_ID_PREFIX: &str = "eslint:";

const FIX_ALL_DESCRIPTION: &str = "Fix all auto-fixable eslint failures";

/// Fix-group identifier for `rule`.
#[must_use]
pub fn fix_id(rule: &str) -> String {
    format!("{FIX_ID_PREFIX}{rule}")
}

/// Rule named by a fix-group identifier, if it is one of ours.
#[must_use]
pub fn rule_from_fix_id(id: &str) -> Option<&str> {
    id.strip_prefix(FIX_ID_PREFIX).filter(|rule| !rule.is_empty())
}

fn action(file: &Path, description: String, edits: Vec<TextChange>) -> CodeFixAction {
    CodeFixAction {
        fix_name: FIX_NAME.to_string(),
        description,
        changes: vec![FileTextChanges {
            file_name: file.to_path_buf(),
            text_changes: edits,
        }],
        fix_id: None,
        fix_all_description: None,
    }
}

/// Apply this one problem's fix.
#[must_use]
pub fn single_fix(file: &Path, problem: &Problem) -> CodeFixAction {
    action(
        file,
        format!("Fix: {}", problem.finding().message()),
        problem.edits().to_vec(),
    )
}

/// Apply every fixable problem of `rule`, as far as they don't overlap.
#[must_use]
pub fn rule_fix_all(file: &Path, registry: &ProblemRegistry, rule: &str) -> CodeFixAction {
    let description = format!("Fix all '{rule}'");
    let edits = non_overlapping(registry.fixable_for_rule(rule).map(Problem::edits));
    CodeFixAction {
        fix_id: Some(fix_id(rule)),
        fix_all_description: Some(description.clone()),
        ..action(file, description, edits)
    }
}

/// Apply every fixable problem in the file, as far as they don't overlap.
#[must_use]
pub fn fix_all(file: &Path, registry: &ProblemRegistry) -> CodeFixAction {
    action(
        file,
        FIX_ALL_DESCRIPTION.to_string(),
        non_overlapping(registry.fixable().map(Problem::edits)),
    )
}

/// Silence the problem's rule on its line. `None` for rule-less problems.
#[must_use]
pub fn disable_rule(file: &Path, problem: &Problem) -> Option<CodeFixAction> {
    let rule = problem.rule_id()?;
    let edit = problem.disable_edit()?.clone();
    Some(action(file, format!("Disable rule '{rule}'"), vec![edit]))
}
