//! Editable document: gap buffer, undo history and highlight spans.
//!
//! [`Document`] is the entry point for the UI layer and the tokenizer. It
//! validates every externally triggered edit, routes tracked edits through
//! the [`EditHistory`] before touching the buffer, and reports capacity
//! failures through the [`event`](crate::event) callbacks.
//!
//! # Examples
//!
//! ```
//! use gapdoc::Document;
//!
//! let mut doc = Document::new();
//! doc.insert_before("ab\ncd", 0, 0).unwrap();
//! assert_eq!(doc.doc_length(), 6); // includes the end-of-text sentinel
//! assert_eq!(doc.line_count(), 2);
//! assert_eq!(doc.line(0), "ab\n");
//!
//! assert_eq!(doc.undo(), -5);
//! assert_eq!(doc.text(), "");
//! assert_eq!(doc.redo(), 5);
//! assert_eq!(doc.text(), "ab\ncd");
//! ```

use crate::error::{Error, Result};
use crate::event::{EVENT_CAPACITY_EXCEEDED, LogLevel, emit_event, emit_log};
use crate::highlight::token::normalize_spans;
use crate::highlight::{HighlightSpan, TokenKind, kind_at};
use crate::options::DocumentOptions;
use crate::text::cursor::{ScanPosition, SequentialCursor};
use crate::text::format::SourceFormat;
use crate::text::gap::{EOF, GapBuffer, NEWLINE};
use crate::text::history::{EditHistory, Revert};
use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

bitflags! {
    /// What an edit changed, so listeners can skip work they do not need.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct Changes: u8 {
        /// Document content changed.
        const TEXT    = 0x01;
        /// Line count or line boundaries changed.
        const LINES   = 0x02;
        /// Undo/redo availability may have changed.
        const HISTORY = 0x04;
    }
}

/// Kind of change reported to the edit listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditAction {
    Insert,
    Delete,
    Undo,
    Redo,
    Load,
}

/// Notification sent to the edit listener after a change was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditEvent {
    pub action: EditAction,
    /// Edit offset; for undo/redo, the suggested caret position.
    pub offset: usize,
    /// Chars inserted or removed; for undo/redo, the absolute length delta.
    pub len: usize,
    pub changes: Changes,
}

type EditListener = Arc<dyn Fn(&EditEvent) + Send + Sync + 'static>;

/// Text document backed by a gap buffer.
#[derive(Clone)]
pub struct Document {
    buffer: GapBuffer,
    history: EditHistory,
    spans: Vec<HighlightSpan>,
    format: SourceFormat,
    scan: ScanPosition,
    caret_hint: Option<usize>,
    listener: Option<EditListener>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("doc_length", &self.doc_length())
            .field("line_count", &self.line_count())
            .field("revision", &self.buffer.revision())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("spans", &self.spans.len())
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// Create an empty document with custom tunables.
    #[must_use]
    pub fn with_options(options: DocumentOptions) -> Self {
        Self {
            buffer: GapBuffer::with_options(&options),
            history: EditHistory::new(&options),
            spans: vec![HighlightSpan::FIRST],
            format: SourceFormat::default(),
            scan: ScanPosition::default(),
            caret_hint: None,
            listener: None,
        }
    }

    /// Create a document holding `text`, with no undo history.
    pub fn with_text(text: &str) -> Result<Self> {
        let mut doc = Self::new();
        doc.load(text, SourceFormat::default())?;
        Ok(doc)
    }

    pub(crate) fn buffer(&self) -> &GapBuffer {
        &self.buffer
    }

    /// Replace the whole content, as read by an I/O collaborator.
    ///
    /// Clears history and highlight spans. Text containing [`EOF`] is
    /// rejected with [`Error::SentinelInText`] and the document is unchanged.
    pub fn load(&mut self, text: &str, format: SourceFormat) -> Result<()> {
        self.buffer.load(text).map_err(report)?;
        self.history.clear();
        self.spans = vec![HighlightSpan::FIRST];
        self.format = format;
        self.scan = ScanPosition::default();
        self.caret_hint = None;
        self.notify(EditAction::Load, 0, self.buffer.len() - 1, Changes::all());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Number of chars including the end-of-text sentinel.
    #[must_use]
    pub fn doc_length(&self) -> usize {
        self.buffer.len()
    }

    /// True when the document holds no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.buffer.line_count()
    }

    /// Content without the sentinel.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    #[must_use]
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer.char_at(offset)
    }

    #[must_use]
    pub fn sub_sequence(&self, offset: usize, max_chars: usize) -> String {
        self.buffer.sub_sequence(offset, max_chars)
    }

    #[must_use]
    pub fn line(&self, line: usize) -> String {
        self.buffer.line(line)
    }

    #[must_use]
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        self.buffer.line_offset(line)
    }

    #[must_use]
    pub fn line_size(&self, line: usize) -> usize {
        self.buffer.line_size(line)
    }

    #[must_use]
    pub fn find_line_number(&self, offset: usize) -> Option<usize> {
        self.buffer.find_line_number(offset)
    }

    /// Buffer revision; changes whenever the content does.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.buffer.revision()
    }

    /// Leading spaces and tabs of `line` (empty if the line does not exist).
    #[must_use]
    pub fn leading_whitespace(&self, line: usize) -> String {
        let Some(start) = self.line_offset(line) else {
            return String::new();
        };
        let mut cursor = self.cursor();
        cursor.seek(start);
        cursor.take_while(|&c| c == ' ' || c == '\t').collect()
    }

    // ------------------------------------------------------------------
    // Sequential scan
    // ------------------------------------------------------------------

    /// Independent scanner over this document.
    #[must_use]
    pub fn cursor(&self) -> SequentialCursor<'_> {
        SequentialCursor::new(self)
    }

    /// Position the built-in scan cursor. Returns `None` if `offset` is invalid.
    pub fn seek_char(&mut self, offset: usize) -> Option<usize> {
        self.scan.seek(&self.buffer, offset)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.scan.has_next(&self.buffer)
    }

    /// Next char of the built-in scan, the sentinel included.
    pub fn next_char(&mut self) -> Option<char> {
        self.scan.advance(&self.buffer)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Insert `text` before `offset` as an undoable edit.
    ///
    /// Returns `Ok(false)` and changes nothing if `offset` is past the last
    /// text position, `text` is empty, or `text` contains the sentinel.
    pub fn insert_before(&mut self, text: &str, offset: usize, timestamp: u64) -> Result<bool> {
        self.insert_before_with(text, offset, timestamp, true)
    }

    /// Insert a single char before `offset` as an undoable edit.
    pub fn insert_char_before(&mut self, ch: char, offset: usize, timestamp: u64) -> Result<bool> {
        let mut buf = [0u8; 4];
        self.insert_before_with(ch.encode_utf8(&mut buf), offset, timestamp, true)
    }

    /// Insert `text` before `offset`, optionally bypassing the history.
    pub fn insert_before_with(
        &mut self,
        text: &str,
        offset: usize,
        timestamp: u64,
        undoable: bool,
    ) -> Result<bool> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() || chars.contains(&EOF) {
            return Ok(false);
        }
        if let Err(err) = self.buffer.check_offset(offset) {
            emit_log(LogLevel::Debug, &format!("insert ignored: {err}"));
            return Ok(false);
        }
        self.buffer.reserve(chars.len()).map_err(report)?;

        if undoable {
            self.history
                .capture_insert(offset, &chars, timestamp, self.buffer.revision());
        } else {
            self.history.note_untracked_edit();
        }
        self.buffer.insert(offset, &chars).map_err(report)?;
        if undoable {
            self.history.settle(self.buffer.revision());
        }

        let mut changes = Changes::TEXT | Changes::HISTORY;
        if chars.contains(&NEWLINE) {
            changes |= Changes::LINES;
        }
        self.notify(EditAction::Insert, offset, chars.len(), changes);
        Ok(true)
    }

    /// Delete `count` chars starting at `offset` as an undoable edit.
    ///
    /// Returns `Ok(false)` and changes nothing if the range is empty or
    /// reaches the sentinel.
    pub fn delete_at(&mut self, offset: usize, count: usize, timestamp: u64) -> Result<bool> {
        self.delete_at_with(offset, count, timestamp, true)
    }

    /// Delete the char at `offset` as an undoable edit.
    pub fn delete_char_at(&mut self, offset: usize, timestamp: u64) -> Result<bool> {
        self.delete_at_with(offset, 1, timestamp, true)
    }

    /// Delete `count` chars at `offset`, optionally bypassing the history.
    pub fn delete_at_with(
        &mut self,
        offset: usize,
        count: usize,
        timestamp: u64,
        undoable: bool,
    ) -> Result<bool> {
        if let Err(err) = self.buffer.check_range(offset, count) {
            emit_log(LogLevel::Debug, &format!("delete ignored: {err}"));
            return Ok(false);
        }

        let removed: Vec<char> = self.buffer.chars_in(offset, offset + count).collect();
        if undoable {
            self.history
                .capture_delete(offset, &removed, timestamp, self.buffer.revision());
        } else {
            self.history.note_untracked_edit();
        }
        self.buffer.delete(offset, count);
        if undoable {
            self.history.settle(self.buffer.revision());
        }

        let mut changes = Changes::TEXT | Changes::HISTORY;
        if removed.contains(&NEWLINE) {
            changes |= Changes::LINES;
        }
        self.notify(EditAction::Delete, offset, count, changes);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Undo / redo / batch
    // ------------------------------------------------------------------

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the newest edit group. Returns the change in document length,
    /// 0 when there was nothing to undo.
    pub fn undo(&mut self) -> isize {
        let outcome = self.history.undo(&mut self.buffer);
        self.finish_revert(EditAction::Undo, outcome)
    }

    /// Redo the newest undone group. Returns the change in document length,
    /// 0 when there was nothing to redo.
    pub fn redo(&mut self) -> isize {
        let outcome = self.history.redo(&mut self.buffer);
        self.finish_revert(EditAction::Redo, outcome)
    }

    fn finish_revert(&mut self, action: EditAction, outcome: Result<Option<Revert>>) -> isize {
        match outcome {
            Ok(Some(revert)) => {
                self.caret_hint = Some(revert.caret);
                self.notify(
                    action,
                    revert.caret,
                    revert.delta.unsigned_abs(),
                    Changes::all(),
                );
                revert.delta
            }
            Ok(None) => 0,
            Err(err) => {
                report(err);
                0
            }
        }
    }

    /// Where the edit cursor belongs after the last undo/redo.
    #[must_use]
    pub fn caret_hint(&self) -> Option<usize> {
        self.caret_hint
    }

    /// Start a group of edits that undo/redo as one step.
    pub fn begin_batch_edit(&mut self) {
        self.history.begin_batch();
    }

    /// Close the current batch.
    pub fn end_batch_edit(&mut self) {
        self.history.end_batch();
    }

    #[must_use]
    pub fn is_batch_edit(&self) -> bool {
        self.history.is_batch_edit()
    }

    /// Force an undo boundary: the next edit never merges with the last one.
    pub fn commit(&mut self) {
        self.history.commit();
    }

    /// Drop all undo/redo history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Read access to the edit history.
    #[must_use]
    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    // ------------------------------------------------------------------
    // Highlight spans
    // ------------------------------------------------------------------

    /// Stored highlight spans; never empty, first span at offset 0.
    #[must_use]
    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }

    /// Replace the highlight spans. A leading span at offset 0 is added if
    /// missing.
    pub fn set_spans(&mut self, spans: Vec<HighlightSpan>) {
        self.spans = normalize_spans(spans);
    }

    /// Reset to the single sentinel span.
    pub fn clear_spans(&mut self) {
        self.spans = vec![HighlightSpan::FIRST];
    }

    /// Token kind in effect at `offset`.
    #[must_use]
    pub fn token_kind_at(&self, offset: usize) -> TokenKind {
        kind_at(&self.spans, offset)
    }

    // ------------------------------------------------------------------
    // Source format
    // ------------------------------------------------------------------

    #[must_use]
    pub fn source_format(&self) -> &SourceFormat {
        &self.format
    }

    /// Settle the format to write with and remember it for next time.
    pub fn resolve_write_format(&mut self, encoding: &str, line_ending: &str) -> SourceFormat {
        self.format = self.format.resolve(encoding, line_ending);
        self.format.clone()
    }

    // ------------------------------------------------------------------
    // Listener / snapshot
    // ------------------------------------------------------------------

    /// Register a listener called after every applied change.
    pub fn set_edit_listener<F>(&mut self, listener: F)
    where
        F: Fn(&EditEvent) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
    }

    pub fn clear_edit_listener(&mut self) {
        self.listener = None;
    }

    /// Independent copy for background consumers such as a tokenizer.
    /// The copy carries no listener.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        let mut copy = self.clone();
        copy.listener = None;
        copy
    }

    fn notify(&self, action: EditAction, offset: usize, len: usize, changes: Changes) {
        if let Some(listener) = &self.listener {
            listener(&EditEvent {
                action,
                offset,
                len,
                changes,
            });
        }
    }
}

/// Surface an edit failure to the host before handing it back.
fn report(err: Error) -> Error {
    let message = err.to_string();
    if matches!(err, Error::CapacityExceeded { .. }) {
        emit_log(LogLevel::Error, &message);
        emit_event(EVENT_CAPACITY_EXCEEDED, &message);
    } else {
        emit_log(LogLevel::Debug, &message);
    }
    err
}
