//! Source encoding and line-ending metadata.
//!
//! The core does no I/O. It only remembers how the text was stored so the
//! I/O collaborator can write it back the same way.

/// UTF-8 encoding name.
pub const ENCODING_UTF8: &str = "UTF-8";
/// UTF-16 (little endian) encoding name.
pub const ENCODING_UTF16LE: &str = "UTF-16LE";
/// UTF-16 (big endian) encoding name.
pub const ENCODING_UTF16BE: &str = "UTF-16BE";
/// Write back with whatever encoding the text was loaded with.
pub const ENCODING_AUTO: &str = "auto";

/// Unix line endings.
pub const LINE_BREAK_LF: &str = "LF";
/// Windows line endings.
pub const LINE_BREAK_CRLF: &str = "CRLF";
/// Classic Mac line endings.
pub const LINE_BREAK_CR: &str = "CR";
/// Write back with whatever line ending the text was loaded with.
pub const LINE_BREAK_AUTO: &str = "auto";

/// Encoding and line-ending style of the original source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceFormat {
    encoding: String,
    line_ending: String,
}

impl Default for SourceFormat {
    fn default() -> Self {
        Self::new(ENCODING_UTF8, LINE_BREAK_LF)
    }
}

impl SourceFormat {
    #[must_use]
    pub fn new(encoding: impl Into<String>, line_ending: impl Into<String>) -> Self {
        Self {
            encoding: encoding.into(),
            line_ending: line_ending.into(),
        }
    }

    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    #[must_use]
    pub fn line_ending(&self) -> &str {
        &self.line_ending
    }

    /// Format to write with when the caller asks for `encoding` and
    /// `line_ending`; [`ENCODING_AUTO`] / [`LINE_BREAK_AUTO`] keep ours.
    #[must_use]
    pub fn resolve(&self, encoding: &str, line_ending: &str) -> Self {
        let pick = |requested: &str, auto: &str, current: &str| {
            if requested.eq_ignore_ascii_case(auto) {
                current.to_string()
            } else {
                requested.to_string()
            }
        };
        Self {
            encoding: pick(encoding, ENCODING_AUTO, &self.encoding),
            line_ending: pick(line_ending, LINE_BREAK_AUTO, &self.line_ending),
        }
    }

    /// The terminator sequence for a known line-ending name.
    #[must_use]
    pub fn line_break(&self) -> Option<&'static str> {
        match self.line_ending.to_ascii_uppercase().as_str() {
            "LF" => Some("\n"),
            "CRLF" => Some("\r\n"),
            "CR" => Some("\r"),
            _ => None,
        }
    }
}
