//! Token kinds and highlight spans.
//!
//! The core stores spans produced by an external tokenizer and never looks
//! inside them. A span marks where a run of uniformly styled text begins;
//! it runs until the next span's offset.

/// Semantic token categories. Mapping a kind to a color is the theme's job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TokenKind {
    #[default]
    Normal,
    Keyword,
    Function,
    Variable,
    Type,
    String,
    Number,
    Symbol,
    Operator,
    Comment,
    Error,
    /// Tokenizer-specific tag the core passes through untouched.
    Custom(u16),
}

/// Start of a run of text sharing one token kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HighlightSpan {
    pub offset: usize,
    pub kind: TokenKind,
}

impl HighlightSpan {
    /// The span every span list begins with.
    pub const FIRST: Self = Self {
        offset: 0,
        kind: TokenKind::Normal,
    };

    #[must_use]
    pub const fn new(offset: usize, kind: TokenKind) -> Self {
        Self { offset, kind }
    }
}

/// Bring `spans` into the stored form: non-empty, first span at offset 0.
pub(crate) fn normalize_spans(mut spans: Vec<HighlightSpan>) -> Vec<HighlightSpan> {
    if spans.first().is_none_or(|span| span.offset != 0) {
        spans.insert(0, HighlightSpan::FIRST);
    }
    spans
}

/// Token kind in effect at `offset`, assuming `spans` is sorted by offset.
#[must_use]
pub fn kind_at(spans: &[HighlightSpan], offset: usize) -> TokenKind {
    let idx = spans.partition_point(|span| span.offset <= offset);
    idx.checked_sub(1)
        .map_or(TokenKind::Normal, |i| spans[i].kind)
}
