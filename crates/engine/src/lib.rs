//! Streaming XML Schema validation and lexical-to-typed value conversion.
//!
//! A token source pushes [`Event`]s into a [`Validator`], which checks them
//! against a compiled [`SchemaSet`] and converts simple values through a
//! [`ConverterRegistry`]. Problems are collected as [`Diagnostic`]s; only
//! structural corruption of the event stream stops validation.

pub mod chars;
pub mod consts;
pub mod convert;
pub mod decimal;
pub mod diagnostics;
pub mod event;
pub mod lexical;
pub mod model;
pub mod namespaces;
pub mod recorded;
pub mod schema;
pub mod temporal;
pub mod validator;
pub mod value;
pub mod whitespace;

pub use chars::{Chars, CharsError};
pub use convert::{
    Builtin, ConversionError, ConverterRegistry, TypeConverter, UnmarshalContext, ValueSource,
    WhitespacePolicy,
};
pub use decimal::XsDecimal;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity};
pub use event::{Event, EventKind, XsiAttributes};
pub use model::{ExpandedName, Location};
pub use namespaces::{NamespaceScope, NoBindings, PrefixResolver};
pub use recorded::{RecordedDocument, TokenBuilder, doc, elem};
pub use schema::{SchemaBuilder, SchemaError, SchemaSet};
pub use validator::{BoundValue, Validator, ValidatorBuilder, ValidatorOptions};
pub use value::XmlValue;
pub use whitespace::WhitespaceMode;
