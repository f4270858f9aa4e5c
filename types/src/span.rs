use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range of byte offsets into one source snapshot.
///
/// Spans are only meaningful against the snapshot they were computed from.
/// `end() - start() == length()` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextSpan {
    start: usize,
    length: usize,
}

impl TextSpan {
    #[must_use]
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Build a span from two offsets. An `end` before `start` collapses to a
    /// zero-length span at `start`.
    #[must_use]
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    #[must_use]
    pub fn empty_at(offset: usize) -> Self {
        Self::new(offset, 0)
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end())
    }
}
