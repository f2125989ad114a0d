//! Undo/redo history over a [`GapBuffer`].
//!
//! Every tracked edit is captured just before the buffer is mutated and
//! lands in one of three places:
//!
//! 1. the open batch group, if a batch is open;
//! 2. the top op of the newest group, if it is the same kind, touches the
//!    same spot, and falls inside the merge window (continuous typing);
//! 3. a fresh group otherwise.
//!
//! # Reverting cheaply
//!
//! A fresh insert sits right before the gap and a fresh delete leaves its
//! chars at the front of the gap, so the most recent op can be undone (and
//! an undo redone) by moving the gap start alone. That is only sound while
//! nothing else has touched the buffer, so each op carries the buffer
//! revision it was last applied at; when the stamp no longer matches, the
//! op is replayed from its stored text through a regular insert/delete.

use crate::error::Result;
use crate::event::{LogLevel, emit_log};
use crate::options::DocumentOptions;
use crate::text::gap::GapBuffer;

/// Kind of a recorded edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditKind {
    Insert,
    Delete,
}

/// One recorded edit.
#[derive(Clone, Debug)]
pub struct EditOp {
    pub kind: EditKind,
    /// Logical offset of the first affected char.
    pub offset: usize,
    /// Inserted or deleted chars.
    pub text: Vec<char>,
    /// Caller timestamp of the latest edit merged into this op.
    pub timestamp: u64,
    pub group_id: u64,
    /// Buffer revision right after this op was last applied.
    stamp: Option<u64>,
    /// The op's chars sit contiguously at the gap edge as left by that
    /// application.
    resident: bool,
}

impl EditOp {
    fn new(kind: EditKind, offset: usize, text: Vec<char>, timestamp: u64, group_id: u64) -> Self {
        Self {
            kind,
            offset,
            text,
            timestamp,
            group_id,
            stamp: None,
            resident: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn is_fresh(&self, buffer: &GapBuffer) -> bool {
        self.resident && self.stamp == Some(buffer.revision())
    }

    /// Fold a follow-up edit into this op. Returns false if it does not fit.
    fn absorb(
        &mut self,
        kind: EditKind,
        offset: usize,
        text: &[char],
        timestamp: u64,
        revision_before: u64,
    ) -> bool {
        if kind != self.kind {
            return false;
        }
        let mut resident = self.resident && self.stamp == Some(revision_before);
        match kind {
            EditKind::Insert if offset == self.offset + self.len() => {
                self.text.extend_from_slice(text);
            }
            // Backspace run: the new range ends where the previous one began.
            EditKind::Delete if offset + text.len() == self.offset => {
                self.text.splice(0..0, text.iter().copied());
                self.offset = offset;
            }
            // Forward-delete run: each delete overwrites the previous
            // resident chars while pulling the next char into the gap.
            EditKind::Delete if offset == self.offset => {
                self.text.extend_from_slice(text);
                resident = false;
            }
            _ => return false,
        }
        self.resident = resident;
        self.timestamp = timestamp;
        self.stamp = None;
        true
    }

    /// Undo this op. Returns the change in document length.
    fn revert(&mut self, buffer: &mut GapBuffer) -> Result<isize> {
        let len = self.len() as isize;
        let fresh = self.is_fresh(buffer);
        if !fresh {
            self.log_replay("undo");
        }
        let delta = match (self.kind, fresh) {
            (EditKind::Insert, true) => {
                buffer.shift_gap_start(-len);
                -len
            }
            (EditKind::Insert, false) => {
                buffer.delete(self.offset, self.len());
                -len
            }
            (EditKind::Delete, true) => {
                buffer.shift_gap_start(len);
                len
            }
            (EditKind::Delete, false) => {
                buffer.insert(self.offset, &self.text)?;
                len
            }
        };
        self.mark_applied(buffer);
        Ok(delta)
    }

    /// Redo this op. Returns the change in document length.
    fn reapply(&mut self, buffer: &mut GapBuffer) -> Result<isize> {
        let len = self.len() as isize;
        let fresh = self.is_fresh(buffer);
        if !fresh {
            self.log_replay("redo");
        }
        let delta = match (self.kind, fresh) {
            (EditKind::Insert, true) => {
                buffer.shift_gap_start(len);
                len
            }
            (EditKind::Insert, false) => {
                buffer.insert(self.offset, &self.text)?;
                len
            }
            (EditKind::Delete, true) => {
                buffer.shift_gap_start(-len);
                -len
            }
            (EditKind::Delete, false) => {
                buffer.delete(self.offset, self.len());
                -len
            }
        };
        self.mark_applied(buffer);
        Ok(delta)
    }

    fn mark_applied(&mut self, buffer: &GapBuffer) {
        self.stamp = Some(buffer.revision());
        self.resident = true;
    }

    fn log_replay(&self, action: &str) {
        emit_log(
            LogLevel::Debug,
            &format!(
                "{action} of {:?} at {} ({} chars) replayed from snapshot",
                self.kind,
                self.offset,
                self.len()
            ),
        );
    }

    /// Where the edit cursor belongs after this op was undone.
    fn caret_after_revert(&self) -> usize {
        match self.kind {
            EditKind::Insert => self.offset,
            EditKind::Delete => self.offset + self.len(),
        }
    }

    /// Where the edit cursor belongs after this op was redone.
    fn caret_after_reapply(&self) -> usize {
        match self.kind {
            EditKind::Insert => self.offset + self.len(),
            EditKind::Delete => self.offset,
        }
    }
}

#[derive(Clone, Debug)]
struct EditGroup {
    id: u64,
    ops: Vec<EditOp>,
    /// No further edits may merge into a sealed group.
    sealed: bool,
}

/// Outcome of a successful undo or redo.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Revert {
    /// Net change in document length.
    pub delta: isize,
    /// Suggested edit cursor position.
    pub caret: usize,
}

/// Stack of reversible edit groups.
#[derive(Clone, Debug)]
pub struct EditHistory {
    done: Vec<EditGroup>,
    undone: Vec<EditGroup>,
    batch_depth: usize,
    /// Group receiving the ops of the open batch, once the first one arrives.
    batch_group: Option<u64>,
    next_group_id: u64,
    merge_window: u64,
    /// Maximum number of undo groups to retain. Oldest entries are dropped when exceeded.
    max_depth: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(&DocumentOptions::default())
    }
}

impl EditHistory {
    #[must_use]
    pub fn new(options: &DocumentOptions) -> Self {
        Self {
            done: Vec::new(),
            undone: Vec::new(),
            batch_depth: 0,
            batch_group: None,
            next_group_id: 1,
            merge_window: options.merge_window_nanos(),
            max_depth: options.max_history_depth,
        }
    }

    /// Record an insert of `text` at `offset`; call right before mutating.
    pub fn capture_insert(&mut self, offset: usize, text: &[char], timestamp: u64, revision: u64) {
        self.capture(EditKind::Insert, offset, text, timestamp, revision);
    }

    /// Record the deletion of `text` (the chars about to be removed) at
    /// `offset`; call right before mutating.
    pub fn capture_delete(&mut self, offset: usize, text: &[char], timestamp: u64, revision: u64) {
        self.capture(EditKind::Delete, offset, text, timestamp, revision);
    }

    /// Stamp the op captured last with the revision the buffer reached.
    pub fn settle(&mut self, revision: u64) {
        if let Some(op) = self.done.last_mut().and_then(|g| g.ops.last_mut()) {
            op.stamp = Some(revision);
        }
    }

    fn capture(
        &mut self,
        kind: EditKind,
        offset: usize,
        text: &[char],
        timestamp: u64,
        revision: u64,
    ) {
        self.undone.clear();

        if self.batch_depth > 0 {
            let open = self
                .done
                .last_mut()
                .filter(|group| Some(group.id) == self.batch_group);
            if let Some(group) = open {
                let merged = group
                    .ops
                    .last_mut()
                    .is_some_and(|op| op.absorb(kind, offset, text, timestamp, revision));
                if !merged {
                    group
                        .ops
                        .push(EditOp::new(kind, offset, text.to_vec(), timestamp, group.id));
                }
                return;
            }
            let id = self.push_group(kind, offset, text, timestamp);
            self.batch_group = Some(id);
            return;
        }

        let window = self.merge_window;
        let merged = self
            .done
            .last_mut()
            .filter(|group| !group.sealed)
            .and_then(|group| group.ops.last_mut())
            .filter(|op| timestamp.saturating_sub(op.timestamp) <= window)
            .is_some_and(|op| op.absorb(kind, offset, text, timestamp, revision));
        if !merged {
            self.push_group(kind, offset, text, timestamp);
        }
    }

    fn push_group(&mut self, kind: EditKind, offset: usize, text: &[char], timestamp: u64) -> u64 {
        self.seal_top();
        let id = self.next_group_id;
        self.next_group_id += 1;
        self.done.push(EditGroup {
            id,
            ops: vec![EditOp::new(kind, offset, text.to_vec(), timestamp, id)],
            sealed: false,
        });
        self.trim_to_depth();
        id
    }

    fn seal_top(&mut self) {
        if let Some(group) = self.done.last_mut() {
            group.sealed = true;
        }
    }

    /// Force a group boundary: the next edit starts a new undo step.
    pub fn commit(&mut self) {
        if self.batch_depth == 0 {
            self.seal_top();
        }
    }

    /// An edit bypassed the history. Every recorded offset may now point at
    /// different text, so both stacks are dropped. An open batch stays open
    /// and starts a fresh group on its next edit.
    pub fn note_untracked_edit(&mut self) {
        if !self.done.is_empty() || !self.undone.is_empty() {
            emit_log(
                LogLevel::Debug,
                &format!(
                    "untracked edit dropped {} undo and {} redo steps",
                    self.done.len(),
                    self.undone.len()
                ),
            );
        }
        self.done.clear();
        self.undone.clear();
        self.batch_group = None;
    }

    #[must_use]
    pub fn is_batch_edit(&self) -> bool {
        self.batch_depth > 0
    }

    /// Open a batch. Batches nest; the group closes at the outermost end.
    pub fn begin_batch(&mut self) {
        if self.batch_depth == 0 {
            self.seal_top();
            self.batch_group = None;
        }
        self.batch_depth += 1;
    }

    /// Close a batch. A batch that captured nothing leaves no trace.
    pub fn end_batch(&mut self) {
        match self.batch_depth {
            0 => {}
            1 => self.close_batch(),
            _ => self.batch_depth -= 1,
        }
    }

    fn close_batch(&mut self) {
        self.batch_depth = 0;
        self.batch_group = None;
        self.seal_top();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.done.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.undone.len()
    }

    /// Ops of the newest undo step, oldest first.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&[EditOp]> {
        self.done.last().map(|group| group.ops.as_slice())
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth limit, dropping the oldest groups beyond it.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
        self.trim_to_depth();
    }

    fn trim_to_depth(&mut self) {
        if self.done.len() > self.max_depth {
            let excess = self.done.len() - self.max_depth;
            self.done.drain(..excess);
        }
    }

    /// Undo the newest group. An open batch is closed first.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. On a capacity error
    /// the group stays on the undo stack and the buffer is untouched.
    pub fn undo(&mut self, buffer: &mut GapBuffer) -> Result<Option<Revert>> {
        if self.batch_depth > 0 {
            self.close_batch();
        }
        let Some(mut group) = self.done.pop() else {
            return Ok(None);
        };
        if let Err(err) = buffer.reserve(group.growth(EditKind::Delete)) {
            self.done.push(group);
            return Err(err);
        }

        let mut delta = 0;
        let mut caret = 0;
        for op in group.ops.iter_mut().rev() {
            delta += op.revert(buffer)?;
            caret = op.caret_after_revert();
        }
        group.sealed = true;
        self.undone.push(group);
        Ok(Some(Revert { delta, caret }))
    }

    /// Redo the newest undone group.
    pub fn redo(&mut self, buffer: &mut GapBuffer) -> Result<Option<Revert>> {
        if self.batch_depth > 0 {
            self.close_batch();
        }
        let Some(mut group) = self.undone.pop() else {
            return Ok(None);
        };
        if let Err(err) = buffer.reserve(group.growth(EditKind::Insert)) {
            self.undone.push(group);
            return Err(err);
        }

        let mut delta = 0;
        let mut caret = 0;
        for op in &mut group.ops {
            delta += op.reapply(buffer)?;
            caret = op.caret_after_reapply();
        }
        self.seal_top();
        self.done.push(group);
        Ok(Some(Revert { delta, caret }))
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
        self.batch_depth = 0;
        self.batch_group = None;
    }
}

impl EditGroup {
    /// Chars that replaying ops of `kind` may write into the buffer.
    fn growth(&self, kind: EditKind) -> usize {
        self.ops
            .iter()
            .filter(|op| op.kind == kind)
            .map(EditOp::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MS: u64 = 1_000_000;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    struct Harness {
        buffer: GapBuffer,
        history: EditHistory,
    }

    impl Harness {
        fn new(text: &str) -> Self {
            Self {
                buffer: GapBuffer::with_text(text).unwrap(),
                history: EditHistory::default(),
            }
        }

        fn insert(&mut self, offset: usize, text: &str, ts: u64) {
            let text = chars(text);
            self.history
                .capture_insert(offset, &text, ts, self.buffer.revision());
            self.buffer.insert(offset, &text).unwrap();
            self.history.settle(self.buffer.revision());
        }

        fn delete(&mut self, offset: usize, count: usize, ts: u64) {
            let text: Vec<char> = self.buffer.chars_in(offset, offset + count).collect();
            self.history
                .capture_delete(offset, &text, ts, self.buffer.revision());
            self.buffer.delete(offset, count);
            self.history.settle(self.buffer.revision());
        }

        fn undo(&mut self) -> Option<Revert> {
            self.history.undo(&mut self.buffer).unwrap()
        }

        fn redo(&mut self) -> Option<Revert> {
            self.history.redo(&mut self.buffer).unwrap()
        }

        fn text(&self) -> String {
            self.buffer.text()
        }
    }

    #[test]
    fn test_undo_insert_and_redo() {
        let mut h = Harness::new("");
        h.insert(0, "Hello", 0);
        assert_eq!(h.undo(), Some(Revert { delta: -5, caret: 0 }));
        assert_eq!(h.text(), "");
        assert_eq!(h.redo(), Some(Revert { delta: 5, caret: 5 }));
        assert_eq!(h.text(), "Hello");
    }

    #[test]
    fn test_empty_stack_is_noop() {
        let mut h = Harness::new("abc");
        assert!(!h.history.can_undo());
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), None);
        assert_eq!(h.text(), "abc");
    }

    #[test]
    fn test_typing_coalesces_within_window() {
        let mut h = Harness::new("");
        h.insert(0, "x", 0);
        h.insert(1, "y", 10 * MS);
        h.insert(2, "z", 20 * MS);
        assert_eq!(h.history.undo_depth(), 1);
        assert_eq!(h.history.peek_undo().unwrap()[0].text, chars("xyz"));
        h.undo();
        assert_eq!(h.text(), "");
    }

    #[test]
    fn test_pause_splits_groups() {
        let mut h = Harness::new("");
        h.insert(0, "x", 0);
        h.insert(1, "y", 2_000 * MS);
        assert_eq!(h.history.undo_depth(), 2);
        h.undo();
        assert_eq!(h.text(), "x");
    }

    #[test]
    fn test_non_adjacent_or_other_kind_splits_groups() {
        let mut h = Harness::new("abcdef");
        h.insert(0, "1", 0);
        h.insert(5, "2", 0);
        h.delete(0, 1, 0);
        assert_eq!(h.history.undo_depth(), 3);
    }

    #[test]
    fn test_backspace_run_coalesces_and_restores_by_gap_shift() {
        let mut h = Harness::new("hello");
        h.delete(4, 1, 0);
        h.delete(3, 1, 0);
        h.delete(2, 1, 0);
        assert_eq!(h.text(), "he");
        assert_eq!(h.history.undo_depth(), 1);
        let op = &h.history.peek_undo().unwrap()[0];
        assert_eq!((op.offset, op.text.clone()), (2, chars("llo")));
        assert!(op.is_fresh(&h.buffer));

        assert_eq!(h.undo(), Some(Revert { delta: 3, caret: 5 }));
        assert_eq!(h.text(), "hello");
        h.redo();
        assert_eq!(h.text(), "he");
    }

    #[test]
    fn test_forward_delete_run_replays_snapshot() {
        let mut h = Harness::new("abcdef");
        h.delete(1, 1, 0);
        h.delete(1, 1, 0);
        h.delete(1, 1, 0);
        assert_eq!(h.text(), "aef");
        let op = &h.history.peek_undo().unwrap()[0];
        assert_eq!(op.text, chars("bcd"));
        assert!(!op.is_fresh(&h.buffer));

        h.undo();
        assert_eq!(h.text(), "abcdef");
        h.redo();
        assert_eq!(h.text(), "aef");
        h.undo();
        assert_eq!(h.text(), "abcdef");
    }

    #[test]
    fn test_stale_stamp_falls_back_to_snapshot() {
        let mut h = Harness::new("hello");
        h.delete(1, 3, 0);
        // A later edit moves the gap and reuses the slots holding "ell".
        h.insert(2, "ZZZZ", 5_000 * MS);
        assert_eq!(h.text(), "hoZZZZ");

        h.undo();
        assert_eq!(h.text(), "ho");
        h.undo();
        assert_eq!(h.text(), "hello");
    }

    #[test]
    fn test_untracked_edit_drops_both_stacks() {
        let mut h = Harness::new("");
        h.insert(0, "abc", 0);
        h.insert(3, "def", 5_000 * MS);
        h.undo();
        assert!(h.history.can_undo() && h.history.can_redo());

        h.buffer.delete(0, 3);
        h.history.note_untracked_edit();
        assert!(!h.history.can_undo());
        assert!(!h.history.can_redo());
        assert!(h.undo().is_none());
        assert_eq!(h.text(), "");
    }

    #[test]
    fn test_untracked_edit_inside_batch() {
        let mut h = Harness::new("xyz");
        h.history.begin_batch();
        h.insert(0, "ab", 0);
        h.buffer.delete(0, 4);
        h.history.note_untracked_edit();
        assert!(!h.history.can_undo());
        h.insert(0, "q", 0);
        h.history.end_batch();
        assert_eq!(h.text(), "qz");

        assert_eq!(h.undo().map(|r| r.delta), Some(-1));
        assert_eq!(h.text(), "z");
        assert!(!h.history.can_undo());
    }

    #[test]
    fn test_lowering_max_depth_trims_immediately() {
        let mut h = Harness::new("");
        for i in 0..5 {
            h.insert(i, "x", (i as u64) * 5_000 * MS);
        }
        assert_eq!(h.history.undo_depth(), 5);
        h.history.set_max_depth(2);
        assert_eq!(h.history.undo_depth(), 2);
        h.undo();
        h.undo();
        assert!(h.undo().is_none());
        assert_eq!(h.text(), "xxx");
    }

    #[test]
    fn test_batch_undoes_as_one_step() {
        let mut h = Harness::new("");
        h.history.begin_batch();
        h.insert(0, "a", 0);
        h.insert(0, "b", 5_000 * MS);
        h.insert(2, "c\n", 9_000 * MS);
        h.history.end_batch();
        assert!(!h.history.is_batch_edit());
        assert_eq!(h.text(), "bac\n");
        assert_eq!(h.history.undo_depth(), 1);

        assert_eq!(h.undo().unwrap().delta, -4);
        assert_eq!(h.text(), "");
        assert_eq!(h.buffer.line_count(), 1);
        h.redo();
        assert_eq!(h.text(), "bac\n");
        assert_eq!(h.buffer.line_count(), 2);
    }

    #[test]
    fn test_batch_does_not_merge_with_previous_typing() {
        let mut h = Harness::new("");
        h.insert(0, "a", 0);
        h.history.begin_batch();
        h.insert(1, "b", 1);
        h.history.end_batch();
        h.insert(2, "c", 2);
        assert_eq!(h.history.undo_depth(), 3);
    }

    #[test]
    fn test_empty_batch_leaves_no_entry() {
        let mut h = Harness::new("");
        h.history.begin_batch();
        h.history.end_batch();
        assert!(!h.history.can_undo());
    }

    #[test]
    fn test_nested_batches_close_at_outermost() {
        let mut h = Harness::new("");
        h.history.begin_batch();
        h.insert(0, "a", 0);
        h.history.begin_batch();
        h.insert(0, "b", 0);
        h.history.end_batch();
        assert!(h.history.is_batch_edit());
        h.insert(0, "c", 0);
        h.history.end_batch();
        assert_eq!(h.history.undo_depth(), 1);
        h.undo();
        assert_eq!(h.text(), "");
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut h = Harness::new("");
        h.insert(0, "a", 0);
        h.undo();
        assert!(h.history.can_redo());
        h.insert(0, "b", 0);
        assert!(!h.history.can_redo());
    }

    #[test]
    fn test_undo_does_not_merge_into_redone_group() {
        let mut h = Harness::new("");
        h.insert(0, "a", 0);
        h.undo();
        h.redo();
        h.insert(1, "b", 1);
        assert_eq!(h.history.undo_depth(), 2);
    }

    #[test]
    fn test_history_depth_limit() {
        let opts = DocumentOptions::default()
            .max_history_depth(3)
            .merge_window(Duration::ZERO);
        let mut h = Harness::new("");
        h.history = EditHistory::new(&opts);
        assert_eq!(h.history.max_depth(), 3);

        for i in 0..5 {
            h.insert(i, &i.to_string(), (i as u64) * 2_000 * MS);
        }
        assert_eq!(h.text(), "01234");

        assert!(h.undo().is_some()); // "4"
        assert!(h.undo().is_some()); // "3"
        assert!(h.undo().is_some()); // "2"
        assert!(h.undo().is_none());
        assert_eq!(h.text(), "01");
    }

    #[test]
    fn test_commit_forces_boundary() {
        let mut h = Harness::new("");
        h.insert(0, "a", 0);
        h.history.commit();
        h.insert(1, "b", 0);
        assert_eq!(h.history.undo_depth(), 2);
    }

    #[test]
    fn test_undo_closes_open_batch() {
        let mut h = Harness::new("");
        h.history.begin_batch();
        h.insert(0, "abc", 0);
        h.undo();
        assert!(!h.history.is_batch_edit());
        assert_eq!(h.text(), "");
    }
}
