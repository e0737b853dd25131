//! Lexical text to [`XmlValue`] conversion.
//!
//! A [`TypeConverter`] owns its whitespace policy. Fixed policies win over
//! whatever `whiteSpace` facet a schema declares for the type.

pub mod builtin;
pub mod registry;

use std::borrow::Cow;
use std::fmt;

use thiserror::Error;

pub use self::builtin::Builtin;
pub use self::registry::ConverterRegistry;
use crate::diagnostics::DiagnosticKind;
use crate::lexical::LexicalError;
use crate::model::ExpandedName;
use crate::namespaces::PrefixResolver;
use crate::value::XmlValue;
use crate::whitespace::{self, WhitespaceMode};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("'{value}' is not a valid value of type {type_name}")]
    Lexical {
        type_name: ExpandedName,
        value: String,
    },
    #[error("'{value}' is out of range for type {type_name}")]
    Overflow {
        type_name: ExpandedName,
        value: String,
    },
    #[error("prefix '{prefix}' of '{value}' is not bound to a namespace")]
    UnboundPrefix { prefix: String, value: String },
}

impl ConversionError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Self::UnboundPrefix { .. } => DiagnosticKind::TypeResolution,
            Self::Lexical { .. } | Self::Overflow { .. } => DiagnosticKind::Conversion,
        }
    }

    /// The normalized text that failed to convert.
    pub fn lexical(&self) -> &str {
        match self {
            Self::Lexical { value, .. }
            | Self::Overflow { value, .. }
            | Self::UnboundPrefix { value, .. } => value,
        }
    }
}

/// Where the text being converted came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    Attribute,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitespacePolicy {
    /// Always this mode, regardless of the declared facet.
    Fixed(WhitespaceMode),
    /// The declared facet, or the given default when none is declared.
    Facet(WhitespaceMode),
}

impl WhitespacePolicy {
    pub fn resolve(self, declared: Option<WhitespaceMode>) -> WhitespaceMode {
        match self {
            Self::Fixed(mode) => mode,
            Self::Facet(default) => declared.unwrap_or(default),
        }
    }
}

/// Everything a converter may consult while converting one value.
#[derive(Clone, Copy)]
pub struct UnmarshalContext<'a> {
    raw: &'a str,
    source: ValueSource,
    type_name: &'a ExpandedName,
    declared_facet: Option<WhitespaceMode>,
    namespaces: &'a dyn PrefixResolver,
}

impl<'a> UnmarshalContext<'a> {
    pub fn new(
        raw: &'a str,
        source: ValueSource,
        type_name: &'a ExpandedName,
        namespaces: &'a dyn PrefixResolver,
    ) -> Self {
        Self {
            raw,
            source,
            type_name,
            declared_facet: None,
            namespaces,
        }
    }

    #[must_use]
    pub fn with_declared_facet(mut self, facet: Option<WhitespaceMode>) -> Self {
        self.declared_facet = facet;
        self
    }

    /// Unnormalized text as delivered by the token source.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn source(&self) -> ValueSource {
        self.source
    }

    /// Effective type the value is converted for.
    pub fn type_name(&self) -> &'a ExpandedName {
        self.type_name
    }

    pub fn declared_facet(&self) -> Option<WhitespaceMode> {
        self.declared_facet
    }

    pub fn namespaces(&self) -> &'a dyn PrefixResolver {
        self.namespaces
    }

    pub fn normalized(&self, policy: WhitespacePolicy) -> Cow<'a, str> {
        whitespace::normalize(self.raw, policy.resolve(self.declared_facet))
    }

    /// Maps a lexical failure on `value` to a [`ConversionError`] for this type.
    pub fn error(&self, err: LexicalError, value: &str) -> ConversionError {
        let type_name = self.type_name.clone();
        let value = value.to_owned();
        match err {
            LexicalError::Invalid => ConversionError::Lexical { type_name, value },
            LexicalError::Overflow => ConversionError::Overflow { type_name, value },
        }
    }
}

impl fmt::Debug for UnmarshalContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnmarshalContext")
            .field("raw", &self.raw)
            .field("source", &self.source)
            .field("type_name", &self.type_name)
            .field("declared_facet", &self.declared_facet)
            .finish_non_exhaustive()
    }
}

/// Converts the lexical form of one simple type.
///
/// Implementations only have to provide [`whitespace`](Self::whitespace) and
/// [`convert`](Self::convert); the two unmarshal entry points normalize the
/// raw text first and may be overridden when attribute and element content
/// need different treatment.
pub trait TypeConverter: Send + Sync + fmt::Debug {
    fn whitespace(&self) -> WhitespacePolicy;

    /// Converts already-normalized text.
    fn convert(&self, lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError>;

    fn unmarshal_attribute(&self, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError> {
        let text = ctx.normalized(self.whitespace());
        self.convert(&text, ctx)
    }

    fn unmarshal_content(&self, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError> {
        let text = ctx.normalized(self.whitespace());
        self.convert(&text, ctx)
    }
}
