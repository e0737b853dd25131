use core::fmt;

use crate::consts::XS;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    /// Name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    pub fn ns(ns_uri: impl Into<String>, local: impl Into<String>) -> Self {
        let ns_uri = ns_uri.into();
        // the empty namespace name means "no namespace"
        let ns_uri = if ns_uri.is_empty() { None } else { Some(ns_uri) };
        Self::new(ns_uri, local)
    }

    /// Built-in schema type name, e.g. `ExpandedName::xs("int")`.
    pub fn xs(local: impl Into<String>) -> Self {
        Self::new(Some(XS.to_string()), local)
    }

    pub fn is_in(&self, ns_uri: &str) -> bool {
        self.ns_uri.as_deref() == Some(ns_uri)
    }
}

impl From<&str> for ExpandedName {
    fn from(local: &str) -> Self {
        Self::local(local)
    }
}

/// Clark notation: `{uri}local`, or just `local` when unqualified.
impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Source position supplied by the token source.
///
/// The engine never computes positions itself; it copies the bookmark of the
/// event that triggered a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
    /// Character offset into the source document, if the token source tracks it.
    pub offset: Option<usize>,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            offset: None,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_namespace_is_no_namespace() {
        assert_eq!(ExpandedName::ns("", "a"), ExpandedName::local("a"));
    }

    #[test]
    fn display_uses_clark_notation() {
        assert_eq!(ExpandedName::ns("urn:x", "a").to_string(), "{urn:x}a");
        assert_eq!(ExpandedName::local("a").to_string(), "a");
        assert_eq!(Location::new(3, 7).to_string(), "3:7");
    }
}
