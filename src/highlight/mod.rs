//! Opaque highlight span storage types.

pub mod token;

pub use token::{HighlightSpan, TokenKind, kind_at};
