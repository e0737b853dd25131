//! Whitespace facet handling (`preserve`, `replace`, `collapse`).
//!
//! All three transforms borrow from their input whenever the result is a
//! sub-slice of it; an owned string is only produced when interior characters
//! actually change.

use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WhitespaceMode {
    Preserve,
    Replace,
    Collapse,
}

impl WhitespaceMode {
    /// Parses the value of a `whiteSpace` facet.
    pub fn from_facet(value: &str) -> Option<Self> {
        match value {
            "preserve" => Some(Self::Preserve),
            "replace" => Some(Self::Replace),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preserve => "preserve",
            Self::Replace => "replace",
            Self::Collapse => "collapse",
        }
    }
}

impl fmt::Display for WhitespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// XML `S` production: space, tab, line feed, carriage return.
#[inline]
pub fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

#[inline]
fn is_replaced(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\r')
}

pub fn is_all_whitespace(text: &str) -> bool {
    text.chars().all(is_xml_whitespace)
}

pub fn normalize(text: &str, mode: WhitespaceMode) -> Cow<'_, str> {
    match mode {
        WhitespaceMode::Preserve => Cow::Borrowed(text),
        WhitespaceMode::Replace => replace(text),
        WhitespaceMode::Collapse => collapse(text),
    }
}

/// Maps tab, line feed and carriage return to a space. Length is unchanged.
pub fn replace(text: &str) -> Cow<'_, str> {
    if !text.contains(is_replaced) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|ch| if is_replaced(ch) { ' ' } else { ch })
            .collect(),
    )
}

/// `replace`, then folds runs of spaces into one and trims both ends.
pub fn collapse(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim_matches(is_xml_whitespace);
    let bytes = trimmed.as_bytes();
    let needs_rewrite = bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| matches!(b, b'\t' | b'\n' | b'\r') || (b == b' ' && bytes.get(i + 1) == Some(&b' ')));
    if !needs_rewrite {
        return Cow::Borrowed(trimmed);
    }
    let mut out = String::with_capacity(trimmed.len());
    for word in trimmed.split(is_xml_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    Cow::Owned(out)
}
