//! Parsing of `xsi:*` attribute values.

use thiserror::Error;

use crate::chars::Chars;
use crate::lexical::{self, parse_qname_lexical};
use crate::model::ExpandedName;
use crate::namespaces::PrefixResolver;
use crate::whitespace::{WhitespaceMode, is_xml_whitespace};

/// A `(namespace, location)` pair from `xsi:schemaLocation`, or
/// `(None, location)` from `xsi:noNamespaceSchemaLocation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaLocationHint {
    pub namespace: Option<String>,
    pub location: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum XsiError {
    #[error("xsi:type value '{0}' is not a valid QName")]
    BadQName(String),
    #[error("prefix '{prefix}' of xsi:type '{value}' is not bound to a namespace")]
    UnboundPrefix { prefix: String, value: String },
    #[error("xsi:nil value '{0}' is not a valid boolean")]
    BadNil(String),
}

pub(crate) fn parse_type(raw: Chars<'_>, ns: &dyn PrefixResolver) -> Result<ExpandedName, XsiError> {
    let text = raw.normalize(WhitespaceMode::Collapse);
    let (prefix, local) =
        parse_qname_lexical(&text).map_err(|_| XsiError::BadQName(text.to_string()))?;
    let uri = match prefix {
        Some(p) => ns.resolve_prefix(p).ok_or_else(|| XsiError::UnboundPrefix {
            prefix: p.to_owned(),
            value: text.to_string(),
        })?,
        None => ns.resolve_prefix("").unwrap_or_default(),
    };
    Ok(ExpandedName::ns(uri, local))
}

pub(crate) fn parse_nil(raw: Chars<'_>) -> Result<bool, XsiError> {
    let text = raw.normalize(WhitespaceMode::Collapse);
    lexical::parse_boolean(&text).map_err(|_| XsiError::BadNil(text.into_owned()))
}

/// Splits `xsi:schemaLocation` into hints. The flag is set when the token
/// count is odd; the dangling namespace is dropped.
pub(crate) fn parse_schema_location(raw: Chars<'_>) -> (Vec<SchemaLocationHint>, bool) {
    let tokens: Vec<&str> = raw
        .as_str()
        .split(is_xml_whitespace)
        .filter(|t| !t.is_empty())
        .collect();
    let hints = tokens
        .chunks_exact(2)
        .map(|pair| SchemaLocationHint {
            namespace: Some(pair[0].to_owned()),
            location: pair[1].to_owned(),
        })
        .collect();
    (hints, tokens.len() % 2 != 0)
}

pub(crate) fn parse_no_namespace_location(raw: Chars<'_>) -> Option<SchemaLocationHint> {
    let text = raw.normalize(WhitespaceMode::Collapse);
    (!text.is_empty()).then(|| SchemaLocationHint {
        namespace: None,
        location: text.into_owned(),
    })
}
