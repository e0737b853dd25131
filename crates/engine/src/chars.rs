//! Zero-copy views over character data owned by the token source.

use std::borrow::Cow;

use thiserror::Error;

use crate::whitespace::{self, WhitespaceMode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CharsError {
    #[error("view {offset}+{len} exceeds buffer of {buf_len} bytes")]
    OutOfBounds {
        offset: usize,
        len: usize,
        buf_len: usize,
    },
    #[error("byte {index} is not a character boundary")]
    NotCharBoundary { index: usize },
}

/// `offset`/`len` window into a caller-owned buffer.
///
/// The borrow ties a `Chars` to its backing buffer, so a view can neither
/// alias memory outside the buffer nor outlive it. A token source may attach a
/// pending whitespace mode; the validator reads text through
/// [`Chars::normalized`], so the mode applies before the type's own
/// whitespace facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chars<'a> {
    buf: &'a str,
    offset: usize,
    len: usize,
    pending: Option<WhitespaceMode>,
}

impl<'a> Chars<'a> {
    pub fn new(buf: &'a str, offset: usize, len: usize) -> Result<Self, CharsError> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= buf.len())
            .ok_or(CharsError::OutOfBounds {
                offset,
                len,
                buf_len: buf.len(),
            })?;
        if !buf.is_char_boundary(offset) {
            return Err(CharsError::NotCharBoundary { index: offset });
        }
        if !buf.is_char_boundary(end) {
            return Err(CharsError::NotCharBoundary { index: end });
        }
        Ok(Self {
            buf,
            offset,
            len,
            pending: None,
        })
    }

    /// View over an entire buffer.
    pub fn whole(buf: &'a str) -> Self {
        Self {
            buf,
            offset: 0,
            len: buf.len(),
            pending: None,
        }
    }

    #[must_use]
    pub fn with_pending(mut self, mode: WhitespaceMode) -> Self {
        self.pending = Some(mode);
        self
    }

    pub fn pending(&self) -> Option<WhitespaceMode> {
        self.pending
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_str(&self) -> &'a str {
        // bounds and boundaries are checked on construction
        self.buf
            .get(self.offset..self.offset + self.len)
            .unwrap_or_default()
    }

    /// Text with the pending mode applied (or as-is when none is pending).
    pub fn normalized(&self) -> Cow<'a, str> {
        self.normalize(self.pending.unwrap_or(WhitespaceMode::Preserve))
    }

    pub fn normalize(&self, mode: WhitespaceMode) -> Cow<'a, str> {
        whitespace::normalize(self.as_str(), mode)
    }

    pub fn is_whitespace(&self) -> bool {
        whitespace::is_all_whitespace(self.as_str())
    }
}
