//! Push-based validation state machine.
//!
//! A [`Validator`] consumes [`Event`]s in document order, checks them against
//! a [`SchemaSet`] and converts simple values through a
//! [`ConverterRegistry`]. Schema violations never surface as `Err`; they are
//! collected as [`Diagnostic`]s and the traversal continues wherever local
//! recovery is possible.

mod frame;
mod xsi;

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use self::frame::{Frame, FrameKind, Phase};
pub use self::xsi::SchemaLocationHint;
use crate::consts::{XMLNS_URI, XSI, xsi as xsi_names};
use crate::convert::{ConverterRegistry, ValueSource};
use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::event::{Event, EventKind, XsiAttributes};
use crate::model::{ExpandedName, Location};
use crate::namespaces::PrefixResolver;
use crate::schema::builtins::any_simple_type;
use crate::schema::content::{Particle, ProcessContents};
use crate::schema::{ContentType, ElementDecl, SchemaSet, TypeDef};
use crate::value::XmlValue;
use crate::whitespace;

/// A converted value handed to the binding layer.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// Element or attribute name.
    pub name: ExpandedName,
    pub source: ValueSource,
    pub type_name: ExpandedName,
    pub value: XmlValue,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Diagnostics beyond this count are dropped and counted.
    pub max_diagnostics: Option<usize>,
    /// Record converted values as [`BoundValue`]s.
    pub collect_values: bool,
    /// Warn about `xsi:*` attributes the validator does not know.
    pub xsi_warnings: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_diagnostics: None,
            collect_values: true,
            xsi_warnings: true,
        }
    }
}

pub struct ValidatorBuilder {
    schema: Arc<SchemaSet>,
    registry: Option<Arc<ConverterRegistry>>,
    options: ValidatorOptions,
}

impl ValidatorBuilder {
    pub fn new(schema: Arc<SchemaSet>) -> Self {
        Self {
            schema,
            registry: None,
            options: ValidatorOptions::default(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: Arc<ConverterRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.options.max_diagnostics = Some(max);
        self
    }

    #[must_use]
    pub fn with_value_collection(mut self, enabled: bool) -> Self {
        self.options.collect_values = enabled;
        self
    }

    #[must_use]
    pub fn with_xsi_warnings(mut self, enabled: bool) -> Self {
        self.options.xsi_warnings = enabled;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Validator {
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ConverterRegistry::with_builtins()));
        Validator {
            sink: DiagnosticSink::new(self.options.max_diagnostics),
            schema: self.schema,
            registry,
            options: self.options,
            state: DocState::AwaitingDocument,
            stack: Vec::new(),
            values: Vec::new(),
            hints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocState {
    AwaitingDocument,
    Active,
    Finished,
    Aborted,
}

/// Outcome of matching a child BEGIN against its parent frame.
enum Child {
    Validate(ElementDecl),
    Skip,
    Reject(DiagnosticKind, String),
}

pub struct Validator {
    schema: Arc<SchemaSet>,
    registry: Arc<ConverterRegistry>,
    options: ValidatorOptions,
    state: DocState,
    stack: Vec<Frame>,
    sink: DiagnosticSink,
    values: Vec<BoundValue>,
    hints: Vec<SchemaLocationHint>,
}

impl Validator {
    /// Validator with the built-in converters and default options.
    pub fn new(schema: Arc<SchemaSet>) -> Self {
        ValidatorBuilder::new(schema).build()
    }

    pub fn builder(schema: Arc<SchemaSet>) -> ValidatorBuilder {
        ValidatorBuilder::new(schema)
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.sink.entries()
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    pub fn values(&self) -> &[BoundValue] {
        &self.values
    }

    pub fn schema_locations(&self) -> &[SchemaLocationHint] {
        &self.hints
    }

    /// No errors so far and nothing dropped by the diagnostic cap.
    pub fn is_valid(&self) -> bool {
        self.sink.error_count() == 0 && !self.sink.limit_reached()
    }

    pub fn is_aborted(&self) -> bool {
        self.state == DocState::Aborted
    }

    pub fn is_finished(&self) -> bool {
        self.state == DocState::Finished
    }

    /// Number of open elements, not counting the document itself.
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Prepares for the next document. Buffers keep their capacity.
    pub fn reset(&mut self) {
        debug!(frames = self.stack.len(), "validator reset");
        self.stack.clear();
        self.sink.clear();
        self.values.clear();
        self.hints.clear();
        self.state = DocState::AwaitingDocument;
    }

    pub fn process(&mut self, event: &Event<'_>) {
        match self.state {
            DocState::Aborted => return,
            DocState::Finished => {
                self.fatal("event after the end of the document", event.location());
                return;
            }
            DocState::AwaitingDocument => {
                self.start_document(event);
                return;
            }
            DocState::Active => {}
        }
        trace!(kind = %event.kind(), depth = self.depth(), "dispatch");
        match event.kind() {
            EventKind::Begin => self.on_begin(event),
            EventKind::Attr => self.on_attr(event),
            EventKind::EndAttrs => self.on_end_attrs(event),
            EventKind::Text => self.on_text(event),
            EventKind::End => self.on_end(event),
        }
    }

    /// Signals the end of the event stream.
    pub fn finish(&mut self) {
        if self.state == DocState::Active {
            let open = self.depth();
            let location = self.stack.last().map(|f| f.location).unwrap_or_default();
            self.fatal(
                format!("input ended with {open} open element(s) and an unterminated document"),
                location,
            );
        }
    }

    // ===== diagnostics =====

    fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>, location: Location) {
        let diagnostic = Diagnostic::new(kind, message, location);
        debug!(kind = kind.as_str(), %location, message = %diagnostic.message, "diagnostic");
        self.sink.push(diagnostic);
    }

    fn fatal(&mut self, message: impl Into<String>, location: Location) {
        let message = message.into();
        warn!(%location, %message, "validation aborted");
        self.report(DiagnosticKind::Structural, message, location);
        self.state = DocState::Aborted;
    }

    // ===== document =====

    fn start_document(&mut self, event: &Event<'_>) {
        if event.kind() != EventKind::Begin || event.name().is_some() {
            self.fatal(
                format!("document must start with a nameless BEGIN, got {}", event.kind()),
                event.location(),
            );
            return;
        }
        debug!("document start");
        let attrs = event.xsi();
        if attrs.xsi_type.is_some() {
            self.report(
                DiagnosticKind::Compatibility,
                "xsi:type is ignored at document level",
                event.location(),
            );
        }
        if attrs.nil.is_some() {
            self.report(
                DiagnosticKind::Compatibility,
                "xsi:nil is ignored at document level",
                event.location(),
            );
        }
        self.record_location_hints(attrs, event.location());
        self.stack.push(Frame::document(event.location()));
        self.state = DocState::Active;
    }

    fn record_location_hints(&mut self, attrs: &XsiAttributes<'_>, location: Location) {
        if let Some(raw) = attrs.schema_location {
            let (hints, odd) = xsi::parse_schema_location(raw);
            if odd {
                self.report(
                    DiagnosticKind::Compatibility,
                    "xsi:schemaLocation has an odd number of tokens; the last one is ignored",
                    location,
                );
            }
            self.hints.extend(hints);
        }
        if let Some(hint) = attrs
            .no_namespace_schema_location
            .and_then(xsi::parse_no_namespace_location)
        {
            self.hints.push(hint);
        }
    }

    // ===== attributes phase =====

    /// Ends the attribute phase of the top frame if the token source skipped
    /// ENDATTRS. The document frame needs no ENDATTRS.
    fn implicit_end_attrs(&mut self, event: &Event<'_>) {
        let Some(top) = self.stack.last() else {
            return;
        };
        if top.phase != Phase::AwaitingAttrs {
            return;
        }
        if top.kind == FrameKind::Element {
            let label = top.label();
            self.report(
                DiagnosticKind::Structural,
                format!("missing ENDATTRS for {label} before {}", event.kind()),
                event.location(),
            );
        }
        self.close_attrs(event.location());
    }

    fn close_attrs(&mut self, location: Location) {
        let schema = Arc::clone(&self.schema);
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        top.phase = Phase::ValidatingContent;
        if top.kind != FrameKind::Element {
            return;
        }
        let Some(TypeDef::Complex(def)) = schema.get_type(&top.type_name) else {
            return;
        };
        let label = top.label();
        let missing: Vec<String> = def
            .attributes
            .iter()
            .filter(|a| a.required && !top.seen_attrs.contains(&a.name))
            .map(|a| a.name.to_string())
            .collect();
        for name in missing {
            self.report(
                DiagnosticKind::Attribute,
                format!("{label} is missing required attribute '{name}'"),
                location,
            );
        }
    }

    fn on_end_attrs(&mut self, event: &Event<'_>) {
        let Some(top) = self.stack.last() else {
            return;
        };
        match (top.kind, top.phase) {
            (FrameKind::Skipped, _) => {}
            (_, Phase::AwaitingAttrs) => self.close_attrs(event.location()),
            (_, Phase::ValidatingContent) => {
                let label = top.label();
                self.report(
                    DiagnosticKind::Structural,
                    format!("unexpected ENDATTRS in the content of {label}"),
                    event.location(),
                );
            }
        }
    }

    fn on_attr(&mut self, event: &Event<'_>) {
        let location = event.location();
        let Some(top) = self.stack.last() else {
            return;
        };
        if top.kind == FrameKind::Skipped {
            return;
        }
        let Some(name) = event.name() else {
            self.report(DiagnosticKind::Structural, "attribute without a name", location);
            return;
        };
        if top.phase != Phase::AwaitingAttrs {
            let label = top.label();
            self.report(
                DiagnosticKind::Structural,
                format!("attribute '{name}' arrived after the attributes of {label} ended"),
                location,
            );
            return;
        }
        if name.is_in(XSI) {
            let known = [
                xsi_names::TYPE,
                xsi_names::NIL,
                xsi_names::SCHEMA_LOCATION,
                xsi_names::NO_NAMESPACE_SCHEMA_LOCATION,
            ];
            if !known.contains(&name.local.as_str()) && self.options.xsi_warnings {
                self.report(
                    DiagnosticKind::Compatibility,
                    format!("unrecognized xsi attribute '{}' ignored", name.local),
                    location,
                );
            }
            return;
        }
        if name.is_in(XMLNS_URI) {
            return;
        }
        if top.kind == FrameKind::Document {
            self.report(
                DiagnosticKind::Structural,
                format!("attribute '{name}' outside of any element"),
                location,
            );
            return;
        }

        let label = top.label();
        if top.seen_attrs.contains(name) {
            self.report(
                DiagnosticKind::Attribute,
                format!("duplicate attribute '{name}' on {label}"),
                location,
            );
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            top.seen_attrs.push(name.clone());
        }

        let Some((type_name, fixed)) = self.attribute_type(name, &label, location) else {
            return;
        };
        let raw = event.chars().map(|c| c.normalized()).unwrap_or_default();
        let value = self.convert(name, &type_name, &raw, ValueSource::Attribute, event.namespaces(), location);
        if let Some(fixed) = fixed
            && !value.is_invalid()
        {
            let actual = self.normalized(&type_name, &raw);
            let expected = self.normalized(&type_name, &fixed);
            if actual != expected {
                self.report(
                    DiagnosticKind::Attribute,
                    format!("attribute '{name}' must have the fixed value '{expected}', found '{actual}'"),
                    location,
                );
            }
        }
    }

    /// Type and fixed value of attribute `name` on the top frame, or `None`
    /// when it is not allowed there (reported) or skipped by a wildcard.
    fn attribute_type(
        &mut self,
        name: &ExpandedName,
        label: &str,
        location: Location,
    ) -> Option<(ExpandedName, Option<String>)> {
        let schema = Arc::clone(&self.schema);
        let top = self.stack.last()?;
        let def = match schema.get_type(&top.type_name) {
            Some(TypeDef::Complex(def)) => def,
            _ => {
                self.report(
                    DiagnosticKind::Attribute,
                    format!("attribute '{name}' is not allowed on simple-typed {label}"),
                    location,
                );
                return None;
            }
        };
        if let Some(attr) = def.attribute(name) {
            return Some((attr.type_name.clone(), attr.fixed.clone()));
        }
        let wildcard = def.attribute_wildcard.as_ref().filter(|w| w.allows(name));
        let Some(wildcard) = wildcard else {
            self.report(
                DiagnosticKind::Attribute,
                format!("attribute '{name}' is not allowed on {label}"),
                location,
            );
            return None;
        };
        let global = schema.attribute(name).map(|d| d.type_name.clone());
        let type_name = match wildcard.process {
            ProcessContents::Skip => None,
            ProcessContents::Lax => Some(global.unwrap_or_else(any_simple_type)),
            ProcessContents::Strict => {
                if global.is_none() {
                    self.report(
                        DiagnosticKind::Attribute,
                        format!("no global declaration for attribute '{name}' matched by a strict wildcard"),
                        location,
                    );
                }
                global
            }
        };
        type_name.map(|t| (t, None))
    }

    // ===== values =====

    fn normalized<'t>(&self, type_name: &ExpandedName, raw: &'t str) -> Cow<'t, str> {
        let mode = self
            .registry
            .resolve(&self.schema, type_name)
            .whitespace()
            .resolve(self.schema.whitespace_facet(type_name));
        whitespace::normalize(raw, mode)
    }

    /// Converts and records a value. Failures are reported and recorded as
    /// [`XmlValue::Invalid`].
    fn convert(
        &mut self,
        name: &ExpandedName,
        type_name: &ExpandedName,
        raw: &str,
        source: ValueSource,
        namespaces: &dyn PrefixResolver,
        location: Location,
    ) -> XmlValue {
        let value = match self.registry.convert(&self.schema, type_name, raw, source, namespaces) {
            Ok(value) => value,
            Err(err) => {
                self.report(err.kind(), err.to_string(), location);
                XmlValue::Invalid(err.lexical().to_owned())
            }
        };
        if self.options.collect_values {
            self.values.push(BoundValue {
                name: name.clone(),
                source,
                type_name: type_name.clone(),
                value: value.clone(),
                location,
            });
        }
        value
    }

    // ===== content phase =====

    fn on_begin(&mut self, event: &Event<'_>) {
        self.implicit_end_attrs(event);
        let location = event.location();
        let Some(name) = event.name() else {
            self.report(DiagnosticKind::Structural, "element BEGIN without a name", location);
            self.stack.push(Frame::skipped(location));
            return;
        };

        match self.match_child(name) {
            Child::Validate(decl) => self.enter_element(decl, name, event),
            Child::Skip => {
                trace!(element = %name, "skipping subtree");
                self.stack.push(Frame::skipped(location));
            }
            Child::Reject(kind, message) => {
                self.report(kind, message, location);
                self.stack.push(Frame::skipped(location));
            }
        }
    }

    /// Decides what to do with child `name` of the top frame, advancing the
    /// parent's automaton on a match.
    fn match_child(&mut self, name: &ExpandedName) -> Child {
        let schema = Arc::clone(&self.schema);
        let Some(parent) = self.stack.last_mut() else {
            return Child::Skip;
        };
        match parent.kind {
            FrameKind::Skipped => return Child::Skip,
            FrameKind::Document => {
                if parent.root_seen {
                    return Child::Reject(
                        DiagnosticKind::ContentModel,
                        format!("second root element '{name}'"),
                    );
                }
                parent.root_seen = true;
                return match schema.element(name) {
                    Some(decl) => Child::Validate(decl.clone()),
                    None => Child::Reject(
                        DiagnosticKind::ContentModel,
                        format!("no global declaration for root element '{name}'"),
                    ),
                };
            }
            FrameKind::Element => {}
        }

        let label = parent.label();
        if parent.nilled {
            if parent.reported {
                return Child::Skip;
            }
            parent.reported = true;
            return Child::Reject(
                DiagnosticKind::ContentModel,
                format!("{label} is nil and must be empty, found child '{name}'"),
            );
        }
        let model = match &parent.content {
            ContentType::Any => {
                return match schema.element(name) {
                    Some(decl) => Child::Validate(decl.clone()),
                    None => Child::Skip,
                };
            }
            ContentType::Empty => {
                return Child::Reject(
                    DiagnosticKind::ContentModel,
                    format!("{label} has empty content, found child '{name}'"),
                );
            }
            ContentType::Simple(_) => {
                return Child::Reject(
                    DiagnosticKind::ContentModel,
                    format!("{label} has simple content, found child '{name}'"),
                );
            }
            ContentType::ElementOnly(model) | ContentType::Mixed(model) => Arc::clone(model),
        };

        let Some(transition) = model.step(parent.state, name) else {
            let expected = model.expected_names(parent.state);
            let message = if expected.is_empty() {
                format!("unexpected element '{name}' in {label}; no more elements are allowed")
            } else {
                format!("unexpected element '{name}' in {label}; expected {expected}")
            };
            return Child::Reject(DiagnosticKind::ContentModel, message);
        };
        parent.state = transition.target;
        match &transition.particle {
            Particle::Element(decl) => Child::Validate(decl.clone()),
            Particle::Wildcard(w) => match (w.process, schema.element(name)) {
                (ProcessContents::Skip, _) | (ProcessContents::Lax, None) => Child::Skip,
                (_, Some(decl)) => Child::Validate(decl.clone()),
                (ProcessContents::Strict, None) => Child::Reject(
                    DiagnosticKind::ContentModel,
                    format!("no global declaration for element '{name}' matched by a strict wildcard"),
                ),
            },
        }
    }

    fn enter_element(&mut self, decl: ElementDecl, name: &ExpandedName, event: &Event<'_>) {
        let location = event.location();
        let attrs = event.xsi();
        let mut type_name = decl.type_name;

        if let Some(raw) = attrs.xsi_type {
            match xsi::parse_type(raw, event.namespaces()) {
                Ok(requested) if self.schema.get_type(&requested).is_none() => self.report(
                    DiagnosticKind::TypeResolution,
                    format!("xsi:type '{requested}' on '{name}' is not a known type"),
                    location,
                ),
                Ok(requested) if !self.schema.is_derived_from(&requested, &type_name) => self.report(
                    DiagnosticKind::TypeResolution,
                    format!("xsi:type '{requested}' is not derived from '{type_name}', the declared type of '{name}'"),
                    location,
                ),
                Ok(requested) => {
                    debug!(element = %name, declared = %type_name, effective = %requested, "xsi:type applied");
                    type_name = requested;
                }
                Err(err) => self.report(DiagnosticKind::TypeResolution, err.to_string(), location),
            }
        }

        let mut nilled = false;
        if let Some(raw) = attrs.nil {
            match xsi::parse_nil(raw) {
                Ok(true) => {
                    if !decl.nillable {
                        self.report(
                            DiagnosticKind::Attribute,
                            format!("xsi:nil on '{name}', which is not nillable"),
                            location,
                        );
                    }
                    nilled = true;
                }
                Ok(false) => {}
                Err(err) => self.report(DiagnosticKind::Conversion, err.to_string(), location),
            }
        }
        self.record_location_hints(attrs, location);

        let content = match self.schema.get_type(&type_name) {
            Some(TypeDef::Complex(def)) => def.content.clone(),
            Some(TypeDef::Simple(_)) => ContentType::Simple(type_name.clone()),
            None => ContentType::Any,
        };
        debug!(element = %name, ty = %type_name, nilled, depth = self.stack.len(), "push frame");
        self.stack
            .push(Frame::element(name.clone(), type_name, content, nilled, location));
    }

    fn on_text(&mut self, event: &Event<'_>) {
        self.implicit_end_attrs(event);
        let location = event.location();
        let Some(text) = event.chars() else {
            return;
        };
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        let blank = text.is_whitespace();
        let problem = match top.kind {
            FrameKind::Skipped => None,
            FrameKind::Document => {
                (!blank).then(|| "character data outside the root element".to_owned())
            }
            FrameKind::Element if top.nilled => (!blank && !top.reported).then(|| {
                top.reported = true;
                format!("{} is nil and must be empty, found character data", top.label())
            }),
            FrameKind::Element => match &top.content {
                ContentType::Simple(_) => {
                    top.text.push_str(&text.normalized());
                    None
                }
                ContentType::Mixed(_) | ContentType::Any => None,
                ContentType::Empty | ContentType::ElementOnly(_) => {
                    (!blank && !top.reported).then(|| {
                        top.reported = true;
                        format!("{} does not allow character data", top.label())
                    })
                }
            },
        };
        if let Some(message) = problem {
            self.report(DiagnosticKind::ContentModel, message, location);
        }
    }

    fn on_end(&mut self, event: &Event<'_>) {
        self.implicit_end_attrs(event);
        let location = event.location();
        let Some(frame) = self.stack.pop() else {
            self.fatal("END without a matching BEGIN", location);
            return;
        };
        match frame.kind {
            FrameKind::Skipped => {}
            FrameKind::Document => {
                if !frame.root_seen {
                    self.report(DiagnosticKind::ContentModel, "document has no root element", location);
                }
                debug!("document end");
                self.state = DocState::Finished;
            }
            FrameKind::Element => {
                debug!(element = ?frame.name, depth = self.stack.len(), "pop frame");
                if !frame.nilled {
                    self.close_element(frame, event);
                }
            }
        }
    }

    fn close_element(&mut self, mut frame: Frame, event: &Event<'_>) {
        let location = event.location();
        match &frame.content {
            ContentType::ElementOnly(model) | ContentType::Mixed(model) => {
                if !model.is_accepting(frame.state) {
                    let expected = model.expected_names(frame.state);
                    let label = frame.label();
                    self.report(
                        DiagnosticKind::ContentModel,
                        format!("{label} is missing required content; expected {expected}"),
                        location,
                    );
                }
            }
            ContentType::Simple(simple) => {
                let text = std::mem::take(&mut frame.text);
                if let Some(name) = &frame.name {
                    self.convert(name, simple, &text, ValueSource::Content, event.namespaces(), location);
                }
            }
            ContentType::Empty | ContentType::Any => {}
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("state", &self.state)
            .field("depth", &self.depth())
            .field("diagnostics", &self.sink.entries().len())
            .field("values", &self.values.len())
            .finish_non_exhaustive()
    }
}
