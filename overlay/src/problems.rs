//! Problem registry: the findings of the latest lint pass, keyed by span.

use std::collections::HashMap;

use lintbridge_types::{Finding, TextChange, TextSpan};

use crate::line_index::LineIndex;

/// A finding mapped onto one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    finding: Finding,
    span: TextSpan,
    fixable: bool,
    /// The finding's fix, in snapshot offsets.
    edits: Vec<TextChange>,
    disable_edit: Option<TextChange>,
}

impl Problem {
    /// Map `finding` onto the snapshot behind `index`.
    #[must_use]
    pub fn new(finding: Finding, index: &LineIndex<'_>) -> Self {
        let span = index.span_for(&finding);
        let edits = finding
            .fix()
            .map(|fix| {
                fix.replacements()
                    .iter()
                    .map(|r| {
                        TextChange::new(
                            TextSpan::from_bounds(
                                index.offset_from_utf16(r.start()),
                                index.offset_from_utf16(r.end()),
                            ),
                            r.text(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        let disable_edit = finding
            .rule_id()
            .map(|rule| index.disable_comment(finding.line().unwrap_or(1), rule));
        Self {
            fixable: finding.is_fixable(),
            finding,
            span,
            edits,
            disable_edit,
        }
    }

    #[must_use]
    pub fn finding(&self) -> &Finding {
        &self.finding
    }

    #[must_use]
    pub fn rule_id(&self) -> Option<&str> {
        self.finding.rule_id()
    }

    #[must_use]
    pub fn span(&self) -> TextSpan {
        self.span
    }

    #[must_use]
    pub fn is_fixable(&self) -> bool {
        self.fixable
    }

    #[must_use]
    pub fn edits(&self) -> &[TextChange] {
        &self.edits
    }

    /// Comment insertion that silences this problem's rule on its line.
    #[must_use]
    pub fn disable_edit(&self) -> Option<&TextChange> {
        self.disable_edit.as_ref()
    }
}

/// Problems of one file, in insertion order. Registering a span again
/// replaces the earlier problem in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemRegistry {
    problems: Vec<Problem>,
    by_span: HashMap<TextSpan, usize>,
}

impl ProblemRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, problem: Problem) {
        match self.by_span.get(&problem.span) {
            Some(&slot) => self.problems[slot] = problem,
            None => {
                self.by_span.insert(problem.span, self.problems.len());
                self.problems.push(problem);
            }
        }
    }

    /// Problem published at exactly `span`.
    #[must_use]
    pub fn get(&self, span: TextSpan) -> Option<&Problem> {
        self.by_span.get(&span).map(|&slot| &self.problems[slot])
    }

    pub fn values(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter()
    }

    pub fn fixable(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.fixable)
    }

    pub fn fixable_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Problem> + 'a {
        self.fixable().filter(move |p| p.rule_id() == Some(rule))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use lintbridge_types::{Fix, Replacement};

    use super::*;

    const TEXT: &str = "var a = \"x\";\nvar b = \"y\";\n";

    fn quote_finding(line: u32, start: usize) -> Finding {
        Finding::new(Some("quotes"), "Strings must use singlequote.", 1, line, 9)
            .with_end(line, 12)
            .with_fix(Fix::single(start, start + 3, "'x'"))
    }

    #[test]
    fn fixability_follows_fix_contents() {
        let idx = LineIndex::new(TEXT);
        let plain = Problem::new(Finding::new(Some("no-var"), "m", 1, 1, 1), &idx);
        assert!(!plain.is_fixable());
        assert!(plain.edits().is_empty());

        let empty_fix = Finding::new(Some("no-var"), "m", 1, 1, 1).with_fix(Fix::new(vec![
            Replacement::new(4, 4, ""),
        ]));
        assert!(!Problem::new(empty_fix, &idx).is_fixable());

        let fixed = Problem::new(quote_finding(1, 8), &idx);
        assert!(fixed.is_fixable());
        assert_eq!(
            fixed.edits(),
            &[TextChange::new(TextSpan::from_bounds(8, 11), "'x'")]
        );
    }

    #[test]
    fn disable_edit_requires_rule() {
        let idx = LineIndex::new(TEXT);
        let anonymous = Problem::new(Finding::new(None, "Parsing error", 2, 2, 1), &idx);
        assert!(anonymous.disable_edit().is_none());

        let named = Problem::new(quote_finding(2, 21), &idx);
        let edit = named.disable_edit().unwrap();
        assert_eq!(edit.span, TextSpan::empty_at(13));
        assert_eq!(edit.new_text, "// eslint-disable-next-line quotes\n");
    }

    #[test]
    fn registry_keys_by_exact_span() {
        let idx = LineIndex::new(TEXT);
        let mut registry = ProblemRegistry::new();
        registry.set(Problem::new(quote_finding(1, 8), &idx));
        registry.set(Problem::new(quote_finding(2, 21), &idx));

        assert_eq!(registry.len(), 2);
        assert!(registry.get(TextSpan::from_bounds(8, 11)).is_some());
        assert!(registry.get(TextSpan::from_bounds(8, 10)).is_none());
        assert_eq!(registry.fixable_for_rule("quotes").count(), 2);
        assert_eq!(registry.fixable_for_rule("semi").count(), 0);
    }

    #[test]
    fn same_span_overwrites_in_place() {
        let idx = LineIndex::new(TEXT);
        let mut registry = ProblemRegistry::new();
        registry.set(Problem::new(quote_finding(1, 8), &idx));
        registry.set(Problem::new(Finding::new(Some("no-var"), "m", 1, 2, 1), &idx));
        let replacement = Finding::new(Some("semi"), "other", 2, 1, 9).with_end(1, 12);
        registry.set(Problem::new(replacement, &idx));

        assert_eq!(registry.len(), 2);
        let rules: Vec<_> = registry.values().map(Problem::rule_id).collect();
        assert_eq!(rules, vec![Some("semi"), Some("no-var")]);
    }
}
