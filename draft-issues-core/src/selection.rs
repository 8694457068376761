//! Inclusive, 1-based range over the parsed issue list.

use std::ops::Range;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// First issue to publish, 1-based. Values below 1 are treated as 1.
    pub start: usize,
    /// Last issue to publish, 1-based and inclusive. `None` means through the end.
    pub end: Option<usize>,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            start: 1,
            end: None,
        }
    }
}

impl Selection {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Zero-based half-open index range into a list of `total` records.
    /// Out-of-bounds or inverted selections give an empty range.
    pub fn range(&self, total: usize) -> Range<usize> {
        let lo = self.start.max(1) - 1;
        let hi = self.end.unwrap_or(total).min(total);
        if lo >= hi {
            warn!(
                start = self.start,
                end = ?self.end,
                total,
                "Selection matches no issues"
            );
            return lo.min(total)..lo.min(total);
        }
        lo..hi
    }
}
