//! In-memory token source.
//!
//! A [`RecordedDocument`] owns one text buffer plus a list of tokens that
//! index into it, and replays them as [`Event`]s. Well-formed documents are
//! easiest to write with the tree helpers:
//!
//! ```
//! use std::sync::Arc;
//! use xmlbind_engine::recorded::{doc, elem};
//! use xmlbind_engine::schema::{ElementDecl, SchemaSet};
//! use xmlbind_engine::model::ExpandedName;
//! use xmlbind_engine::validator::Validator;
//!
//! let schema = SchemaSet::builder()
//!     .element(ElementDecl::new("n", ExpandedName::xs("int")))
//!     .build()
//!     .unwrap();
//! let document = doc().child(elem("n").text(" 42 ")).build();
//! let mut validator = Validator::new(Arc::new(schema));
//! document.replay(&mut validator);
//! assert!(validator.is_valid());
//! assert_eq!(validator.values()[0].value.to_string(), "42");
//! ```
//!
//! Arbitrary, possibly malformed, sequences are written token by token with
//! [`TokenBuilder`].

use core::ops::Range;

use crate::chars::Chars;
use crate::event::{Event, XsiAttributes};
use crate::model::{ExpandedName, Location};
use crate::namespaces::NamespaceScope;
use crate::validator::Validator;

#[derive(Debug, Clone, Default)]
struct XsiRanges {
    xsi_type: Option<Range<usize>>,
    nil: Option<Range<usize>>,
    schema_location: Option<Range<usize>>,
    no_namespace_schema_location: Option<Range<usize>>,
}

#[derive(Debug, Clone)]
enum Token {
    Begin {
        name: Option<ExpandedName>,
        xsi: XsiRanges,
        bindings: Vec<(String, String)>,
    },
    Attr {
        name: ExpandedName,
        value: Range<usize>,
    },
    EndAttrs,
    Text(Range<usize>),
    End,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedDocument {
    buf: String,
    tokens: Vec<Token>,
}

impl RecordedDocument {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn chars(&self, range: &Range<usize>) -> Option<Chars<'_>> {
        Chars::new(&self.buf, range.start, range.end - range.start).ok()
    }

    /// Feeds every token to `sink` as an event, keeping namespace scopes in
    /// step with element nesting. Token `i` is reported at line `i + 1`;
    /// ATTR and TEXT events also carry the byte offset of their text in the
    /// recorded buffer.
    pub fn for_each_event(&self, mut sink: impl FnMut(&Event<'_>)) {
        let mut scope = NamespaceScope::new();
        for (index, token) in self.tokens.iter().enumerate() {
            let line = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let location = Location::new(line, 1);
            match token {
                Token::Begin {
                    name,
                    xsi,
                    bindings,
                } => {
                    scope.push_scope();
                    for (prefix, uri) in bindings {
                        scope.bind(prefix.as_str(), uri.as_str());
                    }
                    let attrs = XsiAttributes {
                        xsi_type: xsi.xsi_type.as_ref().and_then(|r| self.chars(r)),
                        nil: xsi.nil.as_ref().and_then(|r| self.chars(r)),
                        schema_location: xsi.schema_location.as_ref().and_then(|r| self.chars(r)),
                        no_namespace_schema_location: xsi
                            .no_namespace_schema_location
                            .as_ref()
                            .and_then(|r| self.chars(r)),
                    };
                    let event = Event::begin(name.as_ref())
                        .with_xsi(attrs)
                        .with_namespaces(&scope)
                        .at(location);
                    sink(&event);
                }
                Token::Attr { name, value } => {
                    if let Some(value) = self.chars(value) {
                        let location = location.with_offset(value.offset());
                        sink(&Event::attr(name, value).with_namespaces(&scope).at(location));
                    }
                }
                Token::EndAttrs => sink(&Event::end_attrs().with_namespaces(&scope).at(location)),
                Token::Text(range) => {
                    if let Some(text) = self.chars(range) {
                        let location = location.with_offset(text.offset());
                        sink(&Event::text(text).with_namespaces(&scope).at(location));
                    }
                }
                Token::End => {
                    sink(&Event::end().with_namespaces(&scope).at(location));
                    scope.pop_scope();
                }
            }
        }
    }

    /// Replays all events into `validator` and signals end of input.
    pub fn replay(&self, validator: &mut Validator) {
        self.for_each_event(|event| validator.process(event));
        validator.finish();
    }
}

/// Token-level builder. Nothing is implied: the caller emits every BEGIN,
/// ENDATTRS and END, including the nameless document BEGIN.
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    doc: RecordedDocument,
    open_begin: Option<usize>,
}

impl TokenBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_text(&mut self, text: &str) -> Range<usize> {
        let start = self.doc.buf.len();
        self.doc.buf.push_str(text);
        start..self.doc.buf.len()
    }

    fn begin_xsi(&mut self) -> Option<&mut XsiRanges> {
        match self.doc.tokens.get_mut(self.open_begin?) {
            Some(Token::Begin { xsi, .. }) => Some(xsi),
            _ => None,
        }
    }

    /// The nameless BEGIN that opens a document.
    #[must_use]
    pub fn start_document(mut self) -> Self {
        self.doc.tokens.push(Token::Begin {
            name: None,
            xsi: XsiRanges::default(),
            bindings: Vec::new(),
        });
        self.open_begin = Some(self.doc.tokens.len() - 1);
        self
    }

    #[must_use]
    pub fn begin(mut self, name: impl Into<ExpandedName>) -> Self {
        self.doc.tokens.push(Token::Begin {
            name: Some(name.into()),
            xsi: XsiRanges::default(),
            bindings: Vec::new(),
        });
        self.open_begin = Some(self.doc.tokens.len() - 1);
        self
    }

    /// Declares a namespace on the most recent BEGIN.
    #[must_use]
    pub fn ns(mut self, prefix: &str, uri: &str) -> Self {
        if let Some(Token::Begin { bindings, .. }) =
            self.open_begin.and_then(|i| self.doc.tokens.get_mut(i))
        {
            bindings.push((prefix.to_owned(), uri.to_owned()));
        }
        self
    }

    #[must_use]
    pub fn xsi_type(mut self, value: &str) -> Self {
        let range = self.push_text(value);
        if let Some(xsi) = self.begin_xsi() {
            xsi.xsi_type = Some(range);
        }
        self
    }

    #[must_use]
    pub fn xsi_nil(mut self, value: &str) -> Self {
        let range = self.push_text(value);
        if let Some(xsi) = self.begin_xsi() {
            xsi.nil = Some(range);
        }
        self
    }

    #[must_use]
    pub fn schema_location(mut self, value: &str) -> Self {
        let range = self.push_text(value);
        if let Some(xsi) = self.begin_xsi() {
            xsi.schema_location = Some(range);
        }
        self
    }

    #[must_use]
    pub fn no_namespace_schema_location(mut self, value: &str) -> Self {
        let range = self.push_text(value);
        if let Some(xsi) = self.begin_xsi() {
            xsi.no_namespace_schema_location = Some(range);
        }
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<ExpandedName>, value: &str) -> Self {
        let value = self.push_text(value);
        self.doc.tokens.push(Token::Attr {
            name: name.into(),
            value,
        });
        self
    }

    #[must_use]
    pub fn end_attrs(mut self) -> Self {
        self.doc.tokens.push(Token::EndAttrs);
        self.open_begin = None;
        self
    }

    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        let range = self.push_text(text);
        self.doc.tokens.push(Token::Text(range));
        self
    }

    #[must_use]
    pub fn end(mut self) -> Self {
        self.doc.tokens.push(Token::End);
        self.open_begin = None;
        self
    }

    pub fn build(self) -> RecordedDocument {
        self.doc
    }
}

#[derive(Debug, Clone)]
enum Node {
    Element(ElementBuilder),
    Text(String),
}

/// Well-formed element subtree.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    name: ExpandedName,
    bindings: Vec<(String, String)>,
    xsi_type: Option<String>,
    nil: Option<String>,
    schema_location: Option<String>,
    no_namespace_schema_location: Option<String>,
    attrs: Vec<(ExpandedName, String)>,
    children: Vec<Node>,
}

pub fn elem(name: impl Into<ExpandedName>) -> ElementBuilder {
    ElementBuilder {
        name: name.into(),
        bindings: Vec::new(),
        xsi_type: None,
        nil: None,
        schema_location: None,
        no_namespace_schema_location: None,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

impl ElementBuilder {
    #[must_use]
    pub fn ns(mut self, prefix: &str, uri: &str) -> Self {
        self.bindings.push((prefix.to_owned(), uri.to_owned()));
        self
    }

    #[must_use]
    pub fn xsi_type(mut self, value: &str) -> Self {
        self.xsi_type = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn xsi_nil(mut self, value: &str) -> Self {
        self.nil = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn schema_location(mut self, value: &str) -> Self {
        self.schema_location = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<ExpandedName>, value: &str) -> Self {
        self.attrs.push((name.into(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends a TEXT event. Consecutive calls produce separate events.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_owned()));
        self
    }

    fn emit(self, mut out: TokenBuilder) -> TokenBuilder {
        out = out.begin(self.name);
        for (prefix, uri) in &self.bindings {
            out = out.ns(prefix, uri);
        }
        if let Some(v) = &self.xsi_type {
            out = out.xsi_type(v);
        }
        if let Some(v) = &self.nil {
            out = out.xsi_nil(v);
        }
        if let Some(v) = &self.schema_location {
            out = out.schema_location(v);
        }
        if let Some(v) = &self.no_namespace_schema_location {
            out = out.no_namespace_schema_location(v);
        }
        for (name, value) in self.attrs {
            out = out.attr(name, &value);
        }
        out = out.end_attrs();
        for child in self.children {
            out = match child {
                Node::Element(e) => e.emit(out),
                Node::Text(t) => out.text(&t),
            };
        }
        out.end()
    }
}

/// Document with document-level location hints and a single root.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    schema_location: Option<String>,
    no_namespace_schema_location: Option<String>,
    children: Vec<Node>,
}

pub fn doc() -> DocumentBuilder {
    DocumentBuilder::default()
}

impl DocumentBuilder {
    #[must_use]
    pub fn schema_location(mut self, value: &str) -> Self {
        self.schema_location = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn no_namespace_schema_location(mut self, value: &str) -> Self {
        self.no_namespace_schema_location = Some(value.to_owned());
        self
    }

    #[must_use]
    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Character data at document level (outside the root).
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_owned()));
        self
    }

    pub fn build(self) -> RecordedDocument {
        let mut out = TokenBuilder::new().start_document();
        if let Some(v) = &self.schema_location {
            out = out.schema_location(v);
        }
        if let Some(v) = &self.no_namespace_schema_location {
            out = out.no_namespace_schema_location(v);
        }
        for child in self.children {
            out = match child {
                Node::Element(e) => e.emit(out),
                Node::Text(t) => out.text(&t),
            };
        }
        out.end().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::namespaces::PrefixResolver;

    #[test]
    fn tree_flattens_into_event_order() {
        let document = doc()
            .child(elem("a").attr("x", "1").child(elem("b").text("t")))
            .build();
        let mut kinds = Vec::new();
        document.for_each_event(|e| kinds.push(e.kind()));
        use EventKind::*;
        assert_eq!(
            kinds,
            [Begin, Begin, Attr, EndAttrs, Begin, EndAttrs, Text, End, End, End]
        );
    }

    #[test]
    fn bindings_are_scoped_to_their_element() {
        let document = doc()
            .child(elem("a").ns("p", "urn:p").child(elem("b")))
            .text(" ")
            .build();
        let mut seen = Vec::new();
        document.for_each_event(|e| {
            seen.push((e.kind(), e.resolve_prefix("p").map(str::to_owned)));
        });
        // inside b
        assert_eq!(seen[4], (EventKind::EndAttrs, Some("urn:p".to_owned())));
        // document-level text after a closed
        assert_eq!(seen[7], (EventKind::Text, None));
    }

    #[test]
    fn locations_follow_token_index() {
        let document = TokenBuilder::new().start_document().end().build();
        let mut lines = Vec::new();
        document.for_each_event(|e| lines.push(e.location().line));
        assert_eq!(lines, [1, 2]);
    }

    #[test]
    fn text_events_carry_buffer_offsets() {
        let document = TokenBuilder::new()
            .start_document()
            .begin("a")
            .attr("x", "12")
            .end_attrs()
            .text("hello")
            .end()
            .end()
            .build();
        let mut offsets = Vec::new();
        document.for_each_event(|e| offsets.push(e.location().offset));
        assert_eq!(offsets, [None, None, Some(0), None, Some(2), None, None]);
    }
}
