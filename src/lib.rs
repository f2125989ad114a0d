//! `gapdoc` - Gap-buffer text document core for code editors
//!
//! Provides char storage with a movable gap, line/offset translation backed
//! by a small anchor cache, coalescing undo/redo with batch edits, and
//! storage for externally produced highlight spans.

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Offsets fit in isize by construction
#![allow(clippy::cast_sign_loss)] // Signed deltas are checked before conversion
#![allow(clippy::cast_possible_wrap)] // Buffer lengths never exceed isize::MAX
#![allow(clippy::module_name_repetitions)] // Allow history::EditHistory etc
#![allow(clippy::missing_errors_doc)] // Only capacity errors are possible
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod error;
pub mod event;
pub mod highlight;
pub mod options;
pub mod text;

// Re-export core types at crate root
pub use error::{Error, Result};
pub use event::{
    LogLevel, clear_event_callback, clear_log_callback, emit_event, emit_log, set_event_callback,
    set_log_callback, set_log_level,
};
pub use highlight::{HighlightSpan, TokenKind};
pub use options::DocumentOptions;
pub use text::{
    Changes, Document, EOF, EditAction, EditEvent, NEWLINE, SequentialCursor, SharedDocument,
    SourceFormat,
};
