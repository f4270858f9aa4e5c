use lintbridge_types::TextChange;

/// Reduce several fixes to one batch of edits that can be applied together.
///
/// Fixes are ordered by the start of their first edit (stable). The first
/// fix is always kept; each later fix is kept only if its first edit starts
/// strictly after the end of the last kept edit. Touching ranges count as
/// overlapping. A rejected fix is dropped whole, and fixes without edits are
/// ignored.
#[must_use]
pub fn non_overlapping<'a, I>(fixes: I) -> Vec<TextChange>
where
    I: IntoIterator<Item = &'a [TextChange]>,
{
    let mut ordered: Vec<&[TextChange]> = fixes.into_iter().filter(|f| !f.is_empty()).collect();
    ordered.sort_by_key(|fix| fix[0].span.start());

    let mut kept: Vec<TextChange> = Vec::new();
    for fix in ordered {
        if let Some(last) = kept.last()
            && last.span.end() >= fix[0].span.start()
        {
            continue;
        }
        kept.extend(fix.iter().cloned());
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::iter;

    use lintbridge_types::TextSpan;

    use super::*;

    fn edit(start: usize, end: usize, text: &str) -> TextChange {
        TextChange::new(TextSpan::from_bounds(start, end), text)
    }

    fn starts(edits: &[TextChange]) -> Vec<usize> {
        edits.iter().map(|e| e.span.start()).collect()
    }

    #[test]
    fn keeps_disjoint_fixes_in_position_order() {
        let a = vec![edit(10, 12, "a")];
        let b = vec![edit(0, 2, "b")];
        let kept = non_overlapping([a.as_slice(), b.as_slice()]);
        assert_eq!(starts(&kept), vec![0, 10]);
    }

    #[test]
    fn touching_ranges_are_rejected() {
        let a = vec![edit(0, 5, "a")];
        let b = vec![edit(5, 7, "b")];
        let c = vec![edit(6, 8, "c")];
        let kept = non_overlapping([a.as_slice(), b.as_slice(), c.as_slice()]);
        assert_eq!(starts(&kept), vec![0, 6]);
    }

    #[test]
    fn rejected_fix_is_dropped_whole() {
        let a = vec![edit(0, 4, "a")];
        let b = vec![edit(3, 4, "b1"), edit(20, 21, "b2")];
        let c = vec![edit(10, 11, "c")];
        let kept = non_overlapping([a.as_slice(), b.as_slice(), c.as_slice()]);
        assert_eq!(starts(&kept), vec![0, 10]);
    }

    #[test]
    fn multi_edit_fix_is_kept_whole() {
        let a = vec![edit(0, 1, "("), edit(8, 9, ")")];
        let b = vec![edit(5, 6, "x")];
        let c = vec![edit(12, 13, "y")];
        let kept = non_overlapping([a.as_slice(), b.as_slice(), c.as_slice()]);
        // b starts before a's last kept edit ends.
        assert_eq!(starts(&kept), vec![0, 8, 12]);
    }

    #[test]
    fn equal_starts_keep_the_earlier_fix() {
        let a = vec![edit(3, 3, "first")];
        let b = vec![edit(3, 3, "second")];
        let kept = non_overlapping([a.as_slice(), b.as_slice()]);
        assert_eq!(kept, vec![edit(3, 3, "first")]);
    }

    #[test]
    fn empty_fixes_are_ignored() {
        let empty: Vec<TextChange> = Vec::new();
        let a = vec![edit(1, 2, "a")];
        assert_eq!(non_overlapping([empty.as_slice(), a.as_slice()]).len(), 1);
        assert!(non_overlapping(iter::empty::<&[TextChange]>()).is_empty());
    }
}
