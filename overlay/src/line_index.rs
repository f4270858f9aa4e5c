//! Position mapping from analyzer coordinates to snapshot byte offsets.
//!
//! The analyzer counts lines from 1 and columns in UTF-16 code units; fix
//! ranges are UTF-16 offsets into the whole text. Everything it reports is
//! clamped into the snapshot rather than rejected.

use lintbridge_types::{Finding, TextChange, TextSpan};

/// Byte bounds of one line. `end` excludes the terminator, `next` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    start: usize,
    end: usize,
    next: usize,
}

/// Line-start table for one source snapshot.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    lines: Vec<Line>,
    /// UTF-16 offset of each line start, parallel to `lines`.
    utf16_starts: Vec<usize>,
    ascii: bool,
}

impl<'a> LineIndex<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut lines = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    lines.push(Line {
                        start,
                        end: i,
                        next: i + 1,
                    });
                    start = i + 1;
                }
                b'\r' => {
                    let next = if bytes.get(i + 1) == Some(&b'\n') {
                        i + 2
                    } else {
                        i + 1
                    };
                    lines.push(Line {
                        start,
                        end: i,
                        next,
                    });
                    start = next;
                    i = next;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
        lines.push(Line {
            start,
            end: bytes.len(),
            next: bytes.len(),
        });

        let ascii = text.is_ascii();
        let mut utf16_starts = Vec::with_capacity(lines.len());
        let mut units = 0;
        for line in &lines {
            utf16_starts.push(units);
            units += if ascii {
                line.next - line.start
            } else {
                text[line.start..line.next].encode_utf16().count()
            };
        }

        Self {
            text,
            lines,
            utf16_starts,
            ascii,
        }
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Byte offset where the 0-based `line` starts, if it exists.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|l| l.start)
    }

    /// 0-based line containing byte `offset`. Offsets past the end belong to
    /// the last line.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|l| l.start <= offset)
            .saturating_sub(1)
    }

    /// Offset for a 1-based `(line, column)`.
    ///
    /// `None` when `line` is absent or zero. A line past the end clamps to the
    /// end of the last line, a missing column means end of line, and a column
    /// past the end of its line clamps to the line end.
    #[must_use]
    pub fn offset(&self, line: Option<u32>, column: Option<u32>) -> Option<usize> {
        let line = line.filter(|l| *l > 0)?;
        let Some(l) = self.lines.get(line as usize - 1) else {
            return self.lines.last().map(|l| l.end);
        };
        let Some(column) = column else {
            return Some(l.end);
        };
        let units = column.saturating_sub(1) as usize;
        Some(self.advance_utf16(l.start, l.end, units))
    }

    /// Span covering a finding's start and end positions.
    ///
    /// An unresolvable start becomes 0; an unresolvable end collapses the
    /// span onto its start.
    #[must_use]
    pub fn span_for(&self, finding: &Finding) -> TextSpan {
        let start = self.offset(finding.line(), finding.column()).unwrap_or(0);
        let end = self
            .offset(finding.end_line(), finding.end_column())
            .unwrap_or(start);
        TextSpan::from_bounds(start, end)
    }

    /// Byte offset of a whole-text UTF-16 offset, clamped to the text length.
    #[must_use]
    pub fn offset_from_utf16(&self, offset: usize) -> usize {
        if self.ascii {
            return offset.min(self.text.len());
        }
        let line = self
            .utf16_starts
            .partition_point(|start| *start <= offset)
            .saturating_sub(1);
        let l = self.lines[line];
        self.advance_utf16(l.start, l.next, offset - self.utf16_starts[line])
    }

    /// Byte offset `units` UTF-16 code units past `from`, never beyond `limit`.
    fn advance_utf16(&self, from: usize, limit: usize, units: usize) -> usize {
        if self.ascii {
            return (from + units).min(limit);
        }
        let mut remaining = units;
        for (i, ch) in self.text[from..limit].char_indices() {
            if remaining == 0 {
                return from + i;
            }
            let width = ch.len_utf16();
            if width > remaining {
                // Inside a surrogate pair; snap to the char start.
                return from + i;
            }
            remaining -= width;
        }
        limit
    }

    /// Insertion that places `// eslint-disable-next-line <rule>` above the
    /// 1-based `line`, indented like that line.
    #[must_use]
    pub fn disable_comment(&self, line: u32, rule: &str) -> TextChange {
        let idx = (line.max(1) as usize - 1).min(self.lines.len() - 1);
        let l = self.lines[idx];
        let content = &self.text[l.start..l.end];
        let indent_len = content.len() - content.trim_start_matches([' ', '\t']).len();
        let indent = &content[..indent_len];
        TextChange::new(
            TextSpan::empty_at(l.start),
            format!("{indent}// eslint-disable-next-line {rule}{}", self.terminator(idx)),
        )
    }

    /// Terminator of the 0-based `line`; an unterminated last line borrows
    /// the first terminator in the file.
    fn terminator(&self, line: usize) -> &'a str {
        let own = self.lines[line];
        if own.next > own.end {
            return &self.text[own.end..own.next];
        }
        self.lines
            .iter()
            .find(|l| l.next > l.end)
            .map_or("\n", |l| &self.text[l.end..l.next])
    }
}
