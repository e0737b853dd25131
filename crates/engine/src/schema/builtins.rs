//! Built-in XSD type hierarchy.

use super::content::{ProcessContents, Wildcard};
use super::{ComplexTypeDef, ContentType, SimpleTypeDef, TypeDef};
use crate::model::ExpandedName;
use crate::whitespace::WhitespaceMode::{self, Collapse, Preserve, Replace};

pub fn any_type() -> ExpandedName {
    ExpandedName::xs("anyType")
}

pub fn any_simple_type() -> ExpandedName {
    ExpandedName::xs("anySimpleType")
}

/// `(local name, base local name, whiteSpace)`
const SIMPLE: &[(&str, &str, WhitespaceMode)] = &[
    ("string", "anySimpleType", Preserve),
    ("normalizedString", "string", Replace),
    ("token", "normalizedString", Collapse),
    ("language", "token", Collapse),
    ("Name", "token", Collapse),
    ("NCName", "Name", Collapse),
    ("ID", "NCName", Collapse),
    ("IDREF", "NCName", Collapse),
    ("ENTITY", "NCName", Collapse),
    ("NMTOKEN", "token", Collapse),
    ("boolean", "anySimpleType", Collapse),
    ("decimal", "anySimpleType", Collapse),
    ("integer", "decimal", Collapse),
    ("nonPositiveInteger", "integer", Collapse),
    ("negativeInteger", "nonPositiveInteger", Collapse),
    ("long", "integer", Collapse),
    ("int", "long", Collapse),
    ("short", "int", Collapse),
    ("byte", "short", Collapse),
    ("nonNegativeInteger", "integer", Collapse),
    ("unsignedLong", "nonNegativeInteger", Collapse),
    ("unsignedInt", "unsignedLong", Collapse),
    ("unsignedShort", "unsignedInt", Collapse),
    ("unsignedByte", "unsignedShort", Collapse),
    ("positiveInteger", "nonNegativeInteger", Collapse),
    ("float", "anySimpleType", Collapse),
    ("double", "anySimpleType", Collapse),
    ("base64Binary", "anySimpleType", Collapse),
    ("hexBinary", "anySimpleType", Collapse),
    ("anyURI", "anySimpleType", Collapse),
    ("QName", "anySimpleType", Collapse),
    ("dateTime", "anySimpleType", Collapse),
    ("date", "anySimpleType", Collapse),
    ("time", "anySimpleType", Collapse),
    ("gYearMonth", "anySimpleType", Collapse),
    ("gYear", "anySimpleType", Collapse),
    ("gMonthDay", "anySimpleType", Collapse),
    ("gDay", "anySimpleType", Collapse),
    ("gMonth", "anySimpleType", Collapse),
    ("duration", "anySimpleType", Collapse),
];

pub fn types() -> Vec<TypeDef> {
    let mut out = Vec::with_capacity(SIMPLE.len() + 2);
    out.push(TypeDef::Complex(ComplexTypeDef {
        name: any_type(),
        base: None,
        attributes: Vec::new(),
        attribute_wildcard: Some(Wildcard::any(ProcessContents::Lax)),
        content: ContentType::Any,
    }));
    out.push(TypeDef::Simple(SimpleTypeDef {
        name: any_simple_type(),
        base: Some(any_type()),
        whitespace: None,
    }));
    out.extend(SIMPLE.iter().map(|&(local, base, ws)| {
        TypeDef::Simple(SimpleTypeDef {
            name: ExpandedName::xs(local),
            base: Some(ExpandedName::xs(base)),
            whitespace: Some(ws),
        })
    }));
    out
}
