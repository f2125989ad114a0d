//! Gap buffer text storage.
//!
//! The buffer keeps all text in one `Vec<char>` with a single movable hole
//! (the gap). Edits move the gap to the edit point and then write into it or
//! widen it, so typing and deleting around one spot costs O(1) per char and a
//! jump costs O(distance). Deleted chars are not cleared; they stay in the gap
//! until something overwrites them, which is what lets
//! [`EditHistory`](super::history::EditHistory) undo a recent edit by moving
//! the gap boundary back with [`GapBuffer::shift_gap_start`].
//!
//! The last logical position always holds [`EOF`].
//!
//! # Layout
//!
//! ```text
//!  0          gap_start      gap_end          capacity
//!  | text ... |  (gap) ...   | text ... | EOF |
//! ```
//!
//! Mutating methods trust their arguments (debug assertions only). The
//! [`Document`](super::Document) façade is where offsets are validated.

use crate::error::{Error, Result};
use crate::event::{LogLevel, emit_log};
use crate::options::DocumentOptions;
use crate::text::line_cache::{LineAnchor, LineOffsetCache};
use std::cell::RefCell;
use std::cmp::Ordering;

/// Line terminator.
pub const NEWLINE: char = '\n';

/// End-of-text sentinel stored in the last logical slot.
pub const EOF: char = '\u{FFFF}';

const FILL: char = '\0';

fn count_newlines(chars: &[char]) -> usize {
    chars.iter().filter(|&&c| c == NEWLINE).count()
}

/// Char storage with a movable gap and cached line lookup.
#[derive(Clone, Debug)]
pub struct GapBuffer {
    contents: Vec<char>,
    gap_start: usize,
    /// One past the end of the gap.
    gap_end: usize,
    line_count: usize,
    /// Growth slack multiplier; doubles after every reallocation.
    alloc_multiplier: usize,
    min_gap: usize,
    max_capacity: usize,
    revision: u64,
    cache: RefCell<LineOffsetCache>,
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl GapBuffer {
    /// Create an empty buffer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(&DocumentOptions::default())
    }

    /// Create an empty buffer: `min_gap` free slots plus the sentinel.
    #[must_use]
    pub fn with_options(options: &DocumentOptions) -> Self {
        let min_gap = options.min_gap.max(1);
        let mut contents = vec![FILL; min_gap + 1];
        contents[min_gap] = EOF;
        Self {
            contents,
            gap_start: 0,
            gap_end: min_gap,
            line_count: 1,
            alloc_multiplier: 1,
            min_gap,
            max_capacity: options.max_capacity,
            revision: 0,
            cache: RefCell::new(LineOffsetCache::new(options.line_cache_capacity)),
        }
    }

    /// Create a buffer holding `text`.
    pub fn with_text(text: &str) -> Result<Self> {
        let mut buffer = Self::new();
        buffer.load(text)?;
        Ok(buffer)
    }

    /// Logical length including the trailing sentinel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len() - self.gap_len()
    }

    /// True when the buffer holds nothing but the sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Physical slot count.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.contents.len()
    }

    #[must_use]
    pub fn gap_len(&self) -> usize {
        self.gap_end - self.gap_start
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Mutation stamp. Advances by one on every content-changing call.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn is_valid(&self, offset: usize) -> bool {
        offset < self.len()
    }

    /// Validate an insert position for [`insert`](Self::insert).
    pub fn check_offset(&self, offset: usize) -> Result<()> {
        if self.is_valid(offset) {
            Ok(())
        } else {
            Err(Error::InvalidOffset {
                offset,
                len: self.len(),
            })
        }
    }

    /// Validate a range for [`delete`](Self::delete). The range must be
    /// non-empty and stop short of the sentinel.
    pub fn check_range(&self, offset: usize, count: usize) -> Result<()> {
        let text_len = self.len() - 1;
        match offset.checked_add(count) {
            Some(end) if count > 0 && end <= text_len => Ok(()),
            _ => Err(Error::InvalidRange {
                offset,
                count,
                len: text_len,
            }),
        }
    }

    fn real_index(&self, offset: usize) -> usize {
        if offset < self.gap_start {
            offset
        } else {
            offset + self.gap_len()
        }
    }

    /// Physical slices covering the logical range `[start, end)`.
    fn slices(&self, start: usize, end: usize) -> (&[char], &[char]) {
        let gap = self.gap_len();
        if end <= self.gap_start {
            (&self.contents[start..end], &[])
        } else if start >= self.gap_start {
            (&self.contents[start + gap..end + gap], &[])
        } else {
            (
                &self.contents[start..self.gap_start],
                &self.contents[self.gap_end..end + gap],
            )
        }
    }

    /// Chars of the logical range `[start, end)`, skipping the gap.
    pub fn chars_in(
        &self,
        start: usize,
        end: usize,
    ) -> impl DoubleEndedIterator<Item = char> + '_ {
        let (head, tail) = self.slices(start, end);
        head.iter().chain(tail.iter()).copied()
    }

    /// Char at `offset`, or `None` past the sentinel.
    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.is_valid(offset)
            .then(|| self.contents[self.real_index(offset)])
    }

    /// Up to `max_chars` chars starting at `offset`.
    ///
    /// Returns an empty string when `offset` is invalid or `max_chars` is 0.
    #[must_use]
    pub fn sub_sequence(&self, offset: usize, max_chars: usize) -> String {
        if !self.is_valid(offset) || max_chars == 0 {
            return String::new();
        }
        let end = offset + max_chars.min(self.len() - offset);
        self.chars_in(offset, end).collect()
    }

    /// Full text without the sentinel.
    #[must_use]
    pub fn text(&self) -> String {
        self.chars_in(0, self.len() - 1).collect()
    }

    /// Offset of the first char of `line`, or `None` if the line does not exist.
    #[must_use]
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        if line >= self.line_count {
            return None;
        }

        let anchor = self.cache.borrow_mut().nearest_line(line);
        let offset = match line.cmp(&anchor.line) {
            Ordering::Equal => anchor.offset,
            Ordering::Greater => {
                let skip = line - anchor.line;
                self.chars_in(anchor.offset, self.len())
                    .enumerate()
                    .filter(|&(_, c)| c == NEWLINE)
                    .nth(skip - 1)
                    .map(|(i, _)| anchor.offset + i + 1)?
            }
            Ordering::Less if line == 0 => 0,
            Ordering::Less => {
                // Walking backward, the newline ending line `line - 1` is the
                // (anchor.line - line + 1)-th one met.
                let skip = anchor.line - line;
                self.chars_in(0, anchor.offset)
                    .rev()
                    .enumerate()
                    .filter(|&(_, c)| c == NEWLINE)
                    .nth(skip)
                    .map_or(0, |(i, _)| anchor.offset - i)
            }
        };

        self.cache.borrow_mut().update(line, offset);
        Some(offset)
    }

    /// Line containing `offset`, or `None` if `offset` is invalid.
    #[must_use]
    pub fn find_line_number(&self, offset: usize) -> Option<usize> {
        if !self.is_valid(offset) {
            return None;
        }

        let anchor = self.cache.borrow_mut().nearest_offset(offset);
        if offset >= anchor.offset {
            let mut line = anchor.line;
            let mut line_start = anchor.offset;
            for (i, c) in self.chars_in(anchor.offset, offset).enumerate() {
                if c == NEWLINE {
                    line += 1;
                    line_start = anchor.offset + i + 1;
                }
            }
            if line != anchor.line {
                self.cache.borrow_mut().update(line, line_start);
            }
            Some(line)
        } else {
            let mut newlines = 0;
            let mut first_break = None;
            for (i, c) in self.chars_in(offset, anchor.offset).enumerate() {
                if c == NEWLINE {
                    newlines += 1;
                    first_break.get_or_insert(offset + i + 1);
                }
            }
            let line = anchor.line - newlines;
            if let Some(next_start) = first_break {
                self.cache.borrow_mut().update(line + 1, next_start);
            }
            Some(line)
        }
    }

    /// Number of chars on `line` including its terminator (`\n` or the
    /// sentinel). Every existing line has at least one; missing lines have 0.
    #[must_use]
    pub fn line_size(&self, line: usize) -> usize {
        let Some(start) = self.line_offset(line) else {
            return 0;
        };
        self.chars_in(start, self.len())
            .position(|c| c == NEWLINE || c == EOF)
            .map_or(self.len() - start, |pos| pos + 1)
    }

    /// Text of `line` including its terminator, or empty if it does not exist.
    #[must_use]
    pub fn line(&self, line: usize) -> String {
        self.line_offset(line)
            .map(|start| self.sub_sequence(start, self.line_size(line)))
            .unwrap_or_default()
    }

    /// Make room for `additional` more chars without reallocating on insert.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        if additional >= self.gap_len() {
            self.grow_by(additional - self.gap_len())?;
        }
        Ok(())
    }

    /// Widen the gap by at least `min_increment` slots plus growth slack.
    fn grow_by(&mut self, min_increment: usize) -> Result<()> {
        let old_len = self.contents.len();
        let fits = |increment: usize| {
            old_len
                .checked_add(increment)
                .is_some_and(|n| n <= self.max_capacity)
        };

        let slack = self.min_gap.saturating_mul(self.alloc_multiplier);
        let preferred = min_increment.saturating_add(slack);
        let increment = if fits(preferred) {
            preferred
        } else {
            min_increment.saturating_add(1)
        };
        let exceeded = Error::CapacityExceeded {
            requested: old_len.saturating_add(increment),
            limit: self.max_capacity,
        };
        if !fits(increment) {
            return Err(exceeded);
        }
        self.contents
            .try_reserve_exact(increment)
            .map_err(|_| exceeded)?;

        self.contents.resize(old_len + increment, FILL);
        self.contents
            .copy_within(self.gap_end..old_len, self.gap_end + increment);
        self.gap_end += increment;
        self.alloc_multiplier = self.alloc_multiplier.saturating_mul(2);

        emit_log(
            LogLevel::Debug,
            &format!("gap buffer grew to {} chars", self.contents.len()),
        );
        Ok(())
    }

    /// Move the gap so it starts at logical `pos`. Each char crossing the gap
    /// is copied once.
    fn move_gap_to(&mut self, pos: usize) {
        match pos.cmp(&self.gap_start) {
            Ordering::Less => {
                let shift = self.gap_start - pos;
                self.contents
                    .copy_within(pos..self.gap_start, self.gap_end - shift);
                self.gap_start = pos;
                self.gap_end -= shift;
            }
            Ordering::Greater => {
                let shift = pos - self.gap_start;
                self.contents
                    .copy_within(self.gap_end..self.gap_end + shift, self.gap_start);
                self.gap_start += shift;
                self.gap_end += shift;
            }
            Ordering::Equal => {}
        }
    }

    /// Insert `chars` before logical `offset`.
    ///
    /// `offset` must be below [`len`](Self::len) (text cannot follow the
    /// sentinel). Fails only when the buffer cannot grow; the content is then
    /// unchanged.
    pub fn insert(&mut self, offset: usize, chars: &[char]) -> Result<()> {
        debug_assert!(offset < self.len(), "insert offset {offset} past sentinel");
        self.reserve(chars.len())?;
        self.move_gap_to(offset);

        let end = self.gap_start + chars.len();
        self.contents[self.gap_start..end].copy_from_slice(chars);
        self.line_count += count_newlines(chars);
        self.gap_start = end;

        self.cache.get_mut().invalidate(offset);
        self.bump_revision();
        Ok(())
    }

    /// Remove `count` chars starting at logical `offset`.
    ///
    /// The removed chars stay physically in the gap at
    /// `[offset, offset + count)` until overwritten.
    pub fn delete(&mut self, offset: usize, count: usize) {
        debug_assert!(
            offset + count < self.len(),
            "delete range {offset}+{count} reaches sentinel"
        );
        let end = offset + count;
        self.move_gap_to(end);
        self.line_count -= count_newlines(&self.contents[offset..end]);
        self.gap_start = offset;

        self.cache.get_mut().invalidate(offset);
        self.bump_revision();
    }

    /// Move the gap start by `displacement` without copying anything.
    ///
    /// Negative values pull the chars just before the gap into it (erasing a
    /// fresh insert); positive values reclaim chars still resident at the
    /// front of the gap (restoring a fresh delete). Only the edit history
    /// calls this, and only when it knows those slots are untouched.
    pub fn shift_gap_start(&mut self, displacement: isize) {
        let distance = displacement.unsigned_abs();
        if displacement >= 0 {
            debug_assert!(distance <= self.gap_len(), "shift past gap end");
            let from = self.gap_start;
            self.line_count += count_newlines(&self.contents[from..from + distance]);
            self.gap_start += distance;
            self.cache.get_mut().invalidate(from);
        } else {
            debug_assert!(distance <= self.gap_start, "shift before buffer start");
            let to = self.gap_start - distance;
            self.line_count -= count_newlines(&self.contents[to..self.gap_start]);
            self.gap_start = to;
            self.cache.get_mut().invalidate(to);
        }
        self.bump_revision();
    }

    /// Replace all content with `text`, leaving the gap at the front.
    pub fn load(&mut self, text: &str) -> Result<()> {
        if let Some(offset) = text.chars().position(|c| c == EOF) {
            return Err(Error::SentinelInText { offset });
        }
        let text_len = text.chars().count();
        let capacity = text_len
            .checked_add(self.min_gap + 1)
            .filter(|&n| n <= self.max_capacity)
            .ok_or(Error::CapacityExceeded {
                requested: text_len.saturating_add(self.min_gap + 1),
                limit: self.max_capacity,
            })?;

        let mut contents = Vec::new();
        contents
            .try_reserve_exact(capacity)
            .map_err(|_| Error::CapacityExceeded {
                requested: capacity,
                limit: self.max_capacity,
            })?;
        contents.resize(self.min_gap, FILL);
        contents.extend(text.chars());
        contents.push(EOF);

        self.line_count = 1 + text.chars().filter(|&c| c == NEWLINE).count();
        self.contents = contents;
        self.gap_start = 0;
        self.gap_end = self.min_gap;
        self.alloc_multiplier = 1;
        self.cache.get_mut().clear();
        self.bump_revision();
        Ok(())
    }

    /// Snapshot of the cached anchors (for diagnostics and tests).
    #[must_use]
    pub fn cached_anchors(&self) -> Vec<LineAnchor> {
        self.cache.borrow().anchors().collect()
    }

    #[cfg(test)]
    pub(crate) fn gap_start(&self) -> usize {
        self.gap_start
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
