use std::collections::HashMap;

use crate::consts::XML_URI;

/// In-scope prefix bindings, queried by the validator for `xsi:type` and for
/// QName-typed values.
///
/// The empty prefix denotes the default namespace. Implementations return
/// `None` for an unbound prefix and for an undeclared default namespace.
pub trait PrefixResolver {
    fn resolve_prefix(&self, prefix: &str) -> Option<&str>;
}

/// Resolver with nothing but the implicit `xml` binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl PrefixResolver for NoBindings {
    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        (prefix == "xml").then_some(XML_URI)
    }
}

impl PrefixResolver for HashMap<String, String> {
    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_URI);
        }
        self.get(prefix).map(String::as_str).filter(|uri| !uri.is_empty())
    }
}

/// Stack of namespace declarations mirroring element nesting.
///
/// ```
/// use xmlbind_engine::namespaces::{NamespaceScope, PrefixResolver};
///
/// let mut scope = NamespaceScope::new();
/// scope.push_scope();
/// scope.bind("p", "urn:outer");
/// scope.push_scope();
/// scope.bind("p", "urn:inner");
/// assert_eq!(scope.resolve_prefix("p"), Some("urn:inner"));
/// scope.pop_scope();
/// assert_eq!(scope.resolve_prefix("p"), Some("urn:outer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    bindings: Vec<(String, String)>,
    marks: Vec<usize>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_scope(&mut self) {
        self.marks.push(self.bindings.len());
    }

    /// Drops the bindings of the innermost scope. Popping an empty stack is a no-op.
    pub fn pop_scope(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.bindings.truncate(mark);
        }
    }

    /// Declares `prefix` in the innermost scope. An empty `uri` undeclares the
    /// default namespace.
    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.bindings.push((prefix.into(), uri.into()));
    }

    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
        self.marks.clear();
    }
}

impl PrefixResolver for NamespaceScope {
    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_URI);
        }
        self.bindings
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
            .filter(|uri| !uri.is_empty())
    }
}
