//! Text storage and editing.
//!
//! Key types:
//!
//! - [`GapBuffer`]: char storage with a movable gap and cached line lookups
//! - [`EditHistory`]: coalescing undo/redo stack over a gap buffer
//! - [`Document`]: the editing façade combining both with highlight spans
//! - [`SharedDocument`]: a lock-guarded handle for multi-threaded hosts
//!
//! # Examples
//!
//! ## Typing and undo
//!
//! ```
//! use gapdoc::Document;
//!
//! let mut doc = Document::new();
//! // Keystrokes within the merge window collapse into one undo step.
//! doc.insert_before("h", 0, 0).unwrap();
//! doc.insert_before("i", 1, 10_000_000).unwrap();
//! assert_eq!(doc.text(), "hi");
//! assert_eq!(doc.undo(), -2);
//! assert!(doc.is_empty());
//! ```
//!
//! ## Line queries
//!
//! ```
//! use gapdoc::Document;
//!
//! let doc = Document::with_text("alpha\nbeta\ngamma").unwrap();
//! assert_eq!(doc.line_count(), 3);
//! assert_eq!(doc.line_offset(2), Some(11));
//! assert_eq!(doc.find_line_number(7), Some(1));
//! assert_eq!(doc.line(1), "beta\n");
//! ```

mod cursor;
mod document;
pub mod format;
pub mod gap;
pub mod history;
pub mod line_cache;
mod shared;

pub use cursor::SequentialCursor;
pub use document::{Changes, Document, EditAction, EditEvent};
pub use format::SourceFormat;
pub use gap::{EOF, GapBuffer, NEWLINE};
pub use history::{EditHistory, EditKind, EditOp, Revert};
pub use line_cache::{LineAnchor, LineOffsetCache};
pub use shared::SharedDocument;
