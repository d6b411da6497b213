//! Output buffer for mangled names.
//!
//! An append-only byte sink whose current length doubles as the position
//! counter for back-references. Everything written to it is ASCII; the
//! permitted alphabet is checked by [`is_valid_mangling`].

use std::fmt::Write as _;

/// Punctuation allowed in a mangled name besides ASCII letters and digits.
pub const MANGLE_PUNCTUATION: &str = "$%().:?@[]_";

/// Append-only sink for one mangling request.
#[derive(Debug, Default, Clone)]
pub struct MangleBuffer {
    out: String,
}

impl MangleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn push(&mut self, c: char) {
        debug_assert!(c.is_ascii());
        self.out.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Unsigned decimal.
    pub fn push_decimal(&mut self, value: u64) {
        // Writing into a String cannot fail.
        let _ = write!(self.out, "{}", value);
    }

    /// `<len><text>`
    pub fn push_length_prefixed(&mut self, text: &str) {
        self.push_decimal(text.len() as u64);
        self.out.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

/// Whether `c` may appear in a mangled name.
pub fn is_mangle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || MANGLE_PUNCTUATION.contains(c)
}

/// Position and value of the first character outside the alphabet.
pub fn first_invalid_char(mangled: &str) -> Option<(usize, char)> {
    mangled.char_indices().find(|&(_, c)| !is_mangle_char(c))
}

/// Whether every character of `mangled` is in the permitted alphabet.
pub fn is_valid_mangling(mangled: &str) -> bool {
    first_invalid_char(mangled).is_none()
}
