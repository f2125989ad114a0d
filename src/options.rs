//! Tunables for a [`Document`](crate::Document).

use std::time::Duration;

/// Minimum number of free slots kept in the gap.
pub const DEFAULT_MIN_GAP: usize = 50;

/// Edits of the same kind closer together than this merge into one undo step.
pub const DEFAULT_MERGE_WINDOW: Duration = Duration::from_secs(1);

/// Default maximum number of undo groups to retain.
pub const DEFAULT_MAX_HISTORY_DEPTH: usize = 1000;

/// Default number of line anchors kept by the line offset cache.
pub const DEFAULT_LINE_CACHE_CAPACITY: usize = 4;

/// Largest number of `char` slots a buffer may address.
pub const MAX_ADDRESSABLE_CHARS: usize = isize::MAX as usize / std::mem::size_of::<char>();

/// Document construction options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Gap slack added on every growth step (scaled by a doubling multiplier).
    pub min_gap: usize,
    /// Coalescing window for continuous typing.
    pub merge_window: Duration,
    /// Maximum undo groups; the oldest are dropped beyond this.
    pub max_history_depth: usize,
    /// Number of `(line, offset)` anchors cached for line translation.
    pub line_cache_capacity: usize,
    /// Hard ceiling on buffer capacity, in chars.
    pub max_capacity: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            min_gap: DEFAULT_MIN_GAP,
            merge_window: DEFAULT_MERGE_WINDOW,
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
            line_cache_capacity: DEFAULT_LINE_CACHE_CAPACITY,
            max_capacity: MAX_ADDRESSABLE_CHARS,
        }
    }
}

impl DocumentOptions {
    /// Set the coalescing window (builder pattern).
    #[must_use]
    pub fn merge_window(mut self, window: Duration) -> Self {
        self.merge_window = window;
        self
    }

    /// Set the maximum undo depth (builder pattern).
    #[must_use]
    pub fn max_history_depth(mut self, depth: usize) -> Self {
        self.max_history_depth = depth;
        self
    }

    /// Set the capacity ceiling (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, chars: usize) -> Self {
        self.max_capacity = chars;
        self
    }

    /// Set the minimum gap (builder pattern). Values below 1 are raised to 1.
    #[must_use]
    pub fn min_gap(mut self, gap: usize) -> Self {
        self.min_gap = gap.max(1);
        self
    }

    /// Set the line cache capacity (builder pattern).
    #[must_use]
    pub fn line_cache_capacity(mut self, anchors: usize) -> Self {
        self.line_cache_capacity = anchors;
        self
    }

    pub(crate) fn merge_window_nanos(&self) -> u64 {
        u64::try_from(self.merge_window.as_nanos()).unwrap_or(u64::MAX)
    }
}
