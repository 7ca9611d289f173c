//! Character-offset view over a string.
//!
//! Every offset the pipeline exposes is a character offset, but
//! Rust strings and regex matches speak in bytes. `CharIndex`
//! keeps the byte position of every character (via
//! `char_indices()`) so the two can be converted in either
//! direction and slices always land on character boundaries.

/// Bidirectional char/byte offset table for one string.
#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,

    /// Byte offset of every char, followed by `text.len()`
    byte_offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut byte_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        byte_offsets.push(text.len());
        Self { text, byte_offsets }
    }

    /// Number of characters
    pub fn len(&self) -> usize {
        self.byte_offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Byte offset of a character offset (clamped to the end)
    pub fn byte_offset(&self, char_pos: usize) -> usize {
        self.byte_offsets[char_pos.min(self.len())]
    }

    /// Character offset of a byte offset.
    ///
    /// A byte offset inside a multi-byte character maps to the
    /// next character boundary.
    pub fn char_offset(&self, byte_pos: usize) -> usize {
        match self.byte_offsets.binary_search(&byte_pos) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    /// Slice by character offsets; out-of-range bounds are clamped
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let byte_start = self.byte_offset(start);
        let byte_end = self.byte_offset(end);
        if byte_start >= byte_end {
            return "";
        }
        &self.text[byte_start..byte_end]
    }
}

/// Length of a string in characters
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
