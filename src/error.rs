//! Error types for gapdoc.

use std::fmt;

/// Result type alias for gapdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for document operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Buffer growth would exceed the addressable (or configured) capacity.
    CapacityExceeded { requested: usize, limit: usize },
    /// Offset outside `[0, len)`.
    InvalidOffset { offset: usize, len: usize },
    /// Range `[offset, offset + count)` not inside the editable text.
    InvalidRange {
        offset: usize,
        count: usize,
        len: usize,
    },
    /// Loaded text contains the end-of-text sentinel at char `offset`.
    SentinelInText { offset: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { requested, limit } => {
                write!(
                    f,
                    "buffer capacity exceeded: {requested} chars requested, limit is {limit}"
                )
            }
            Self::InvalidOffset { offset, len } => {
                write!(f, "offset {offset} out of bounds for length {len}")
            }
            Self::InvalidRange { offset, count, len } => {
                write!(
                    f,
                    "range {offset}..{} out of bounds for length {len}",
                    offset.saturating_add(*count)
                )
            }
            Self::SentinelInText { offset } => {
                write!(f, "text contains the end-of-text sentinel at char {offset}")
            }
        }
    }
}

impl std::error::Error for Error {}
