//! Events consumed by the validator.
//!
//! The token source owns names, text and namespace bindings; an [`Event`]
//! only borrows them for the duration of one `Validator::process` call.
//!
//! Sequence contract:
//! - the first event is a nameless `Begin` for the document itself, used
//!   only to carry document-level `xsi:*location` hints;
//! - every element is `Begin`, zero or more `Attr`, `EndAttrs`, then content
//!   (`Begin` / `Text`) and a matching `End`;
//! - the document is closed with a final `End`.

use core::fmt;

use crate::chars::Chars;
use crate::model::{ExpandedName, Location};
use crate::namespaces::{NoBindings, PrefixResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Begin,
    EndAttrs,
    Attr,
    Text,
    End,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Begin => "BEGIN",
            Self::EndAttrs => "ENDATTRS",
            Self::Attr => "ATTR",
            Self::Text => "TEXT",
            Self::End => "END",
        })
    }
}

/// Raw `xsi:*` attribute values found on a start tag. Not parsed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XsiAttributes<'a> {
    pub xsi_type: Option<Chars<'a>>,
    pub nil: Option<Chars<'a>>,
    pub schema_location: Option<Chars<'a>>,
    pub no_namespace_schema_location: Option<Chars<'a>>,
}

impl XsiAttributes<'_> {
    pub fn is_empty(&self) -> bool {
        self.xsi_type.is_none()
            && self.nil.is_none()
            && self.schema_location.is_none()
            && self.no_namespace_schema_location.is_none()
    }
}

static NO_BINDINGS: NoBindings = NoBindings;

#[derive(Clone, Copy)]
pub struct Event<'a> {
    kind: EventKind,
    name: Option<&'a ExpandedName>,
    text: Option<Chars<'a>>,
    location: Location,
    xsi: XsiAttributes<'a>,
    namespaces: &'a dyn PrefixResolver,
}

impl<'a> Event<'a> {
    fn new(kind: EventKind) -> Self {
        Self {
            kind,
            name: None,
            text: None,
            location: Location::default(),
            xsi: XsiAttributes::default(),
            namespaces: &NO_BINDINGS,
        }
    }

    /// Start of the document (`name == None`) or of an element.
    pub fn begin(name: Option<&'a ExpandedName>) -> Self {
        Self {
            name,
            ..Self::new(EventKind::Begin)
        }
    }

    pub fn attr(name: &'a ExpandedName, value: Chars<'a>) -> Self {
        Self {
            name: Some(name),
            text: Some(value),
            ..Self::new(EventKind::Attr)
        }
    }

    pub fn end_attrs() -> Self {
        Self::new(EventKind::EndAttrs)
    }

    pub fn text(text: Chars<'a>) -> Self {
        Self {
            text: Some(text),
            ..Self::new(EventKind::Text)
        }
    }

    pub fn end() -> Self {
        Self::new(EventKind::End)
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_xsi(mut self, xsi: XsiAttributes<'a>) -> Self {
        self.xsi = xsi;
        self
    }

    #[must_use]
    pub fn with_namespaces(mut self, namespaces: &'a dyn PrefixResolver) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn name(&self) -> Option<&'a ExpandedName> {
        self.name
    }

    pub fn chars(&self) -> Option<Chars<'a>> {
        self.text
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn xsi(&self) -> &XsiAttributes<'a> {
        &self.xsi
    }

    pub fn namespaces(&self) -> &'a dyn PrefixResolver {
        self.namespaces
    }

    /// True for TEXT/ATTR events whose text is entirely XML whitespace, and for
    /// events without text.
    pub fn text_is_whitespace(&self) -> bool {
        self.text.is_none_or(|c| c.is_whitespace())
    }
}

impl PrefixResolver for Event<'_> {
    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.resolve_prefix(prefix)
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("text", &self.text.map(|c| c.as_str()))
            .field("location", &self.location)
            .field("xsi", &self.xsi)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind_and_payload() {
        let name = ExpandedName::local("a");
        let ev = Event::attr(&name, Chars::whole("1")).at(Location::new(2, 4));
        assert_eq!(ev.kind(), EventKind::Attr);
        assert_eq!(ev.name(), Some(&name));
        assert_eq!(ev.chars().map(|c| c.as_str()), Some("1"));
        assert_eq!(ev.location(), Location::new(2, 4));
        assert!(Event::begin(None).xsi().is_empty());
    }

    #[test]
    fn whitespace_detection() {
        assert!(Event::text(Chars::whole(" \n\t")).text_is_whitespace());
        assert!(!Event::text(Chars::whole(" x ")).text_is_whitespace());
        assert!(Event::end().text_is_whitespace());
    }

    #[test]
    fn default_resolver_knows_only_xml() {
        let ev = Event::end();
        assert!(ev.resolve_prefix("xml").is_some());
        assert!(ev.resolve_prefix("p").is_none());
    }
}
