//! Forward char scanning.

use crate::text::document::Document;
use crate::text::gap::GapBuffer;

/// Position of a forward scan. `None` means exhausted or never seeked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScanPosition(Option<usize>);

impl ScanPosition {
    pub(crate) fn seek(&mut self, buffer: &GapBuffer, offset: usize) -> Option<usize> {
        self.0 = buffer.is_valid(offset).then_some(offset);
        self.0
    }

    pub(crate) fn has_next(self, buffer: &GapBuffer) -> bool {
        self.0.is_some_and(|pos| buffer.is_valid(pos))
    }

    pub(crate) fn advance(&mut self, buffer: &GapBuffer) -> Option<char> {
        let pos = self.0?;
        let ch = buffer.char_at(pos)?;
        self.0 = Some(pos + 1);
        Some(ch)
    }

    pub(crate) fn get(self) -> Option<usize> {
        self.0
    }
}

/// Re-seekable forward scanner over a [`Document`].
///
/// Yields every logical char including the trailing sentinel. Seeking to an
/// invalid offset exhausts the cursor.
///
/// ```
/// use gapdoc::{Document, SequentialCursor};
///
/// let doc = Document::with_text("\t  let x;").unwrap();
/// let mut cursor = SequentialCursor::new(&doc);
/// let indent: String = cursor.by_ref().take_while(|c| c.is_whitespace()).collect();
/// assert_eq!(indent, "\t  ");
/// ```
#[derive(Clone, Debug)]
pub struct SequentialCursor<'a> {
    doc: &'a Document,
    pos: ScanPosition,
}

impl<'a> SequentialCursor<'a> {
    /// Cursor positioned at the start of `doc`.
    #[must_use]
    pub fn new(doc: &'a Document) -> Self {
        let mut pos = ScanPosition::default();
        pos.seek(doc.buffer(), 0);
        Self { doc, pos }
    }

    /// Move to `offset`. Returns the new position, or `None` if invalid.
    pub fn seek(&mut self, offset: usize) -> Option<usize> {
        self.pos.seek(self.doc.buffer(), offset)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.pos.has_next(self.doc.buffer())
    }

    /// Offset of the char the next call to `next` returns.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.pos.get().filter(|_| self.has_next())
    }
}

impl Iterator for SequentialCursor<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.pos.advance(self.doc.buffer())
    }
}
