//! Converters for the built-in XSD simple types.

use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use num_bigint::{BigInt, Sign};

use super::{ConversionError, TypeConverter, UnmarshalContext, WhitespacePolicy};
use crate::lexical::{self, LexicalError};
use crate::model::ExpandedName;
use crate::temporal;
use crate::value::XmlValue;
use crate::whitespace::{WhitespaceMode, is_xml_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `xs:anySimpleType` and the fallback for unregistered types.
    Untyped,
    String,
    NormalizedString,
    Token,
    Language,
    Name,
    NCName,
    NmToken,
    Id,
    IdRef,
    Entity,
    Boolean,
    Decimal,
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Float,
    Double,
    Base64Binary,
    HexBinary,
    AnyUri,
    QName,
    DateTime,
    Date,
    Time,
    GYearMonth,
    GYear,
    GMonthDay,
    GDay,
    GMonth,
    Duration,
}

impl Builtin {
    pub const ALL: &'static [Self] = &[
        Self::Untyped,
        Self::String,
        Self::NormalizedString,
        Self::Token,
        Self::Language,
        Self::Name,
        Self::NCName,
        Self::NmToken,
        Self::Id,
        Self::IdRef,
        Self::Entity,
        Self::Boolean,
        Self::Decimal,
        Self::Integer,
        Self::NonPositiveInteger,
        Self::NegativeInteger,
        Self::NonNegativeInteger,
        Self::PositiveInteger,
        Self::Long,
        Self::Int,
        Self::Short,
        Self::Byte,
        Self::UnsignedLong,
        Self::UnsignedInt,
        Self::UnsignedShort,
        Self::UnsignedByte,
        Self::Float,
        Self::Double,
        Self::Base64Binary,
        Self::HexBinary,
        Self::AnyUri,
        Self::QName,
        Self::DateTime,
        Self::Date,
        Self::Time,
        Self::GYearMonth,
        Self::GYear,
        Self::GMonthDay,
        Self::GDay,
        Self::GMonth,
        Self::Duration,
    ];

    /// Local name of the XSD type this converter is registered for.
    pub fn local_name(self) -> &'static str {
        match self {
            Self::Untyped => "anySimpleType",
            Self::String => "string",
            Self::NormalizedString => "normalizedString",
            Self::Token => "token",
            Self::Language => "language",
            Self::Name => "Name",
            Self::NCName => "NCName",
            Self::NmToken => "NMTOKEN",
            Self::Id => "ID",
            Self::IdRef => "IDREF",
            Self::Entity => "ENTITY",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::NonPositiveInteger => "nonPositiveInteger",
            Self::NegativeInteger => "negativeInteger",
            Self::NonNegativeInteger => "nonNegativeInteger",
            Self::PositiveInteger => "positiveInteger",
            Self::Long => "long",
            Self::Int => "int",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::UnsignedLong => "unsignedLong",
            Self::UnsignedInt => "unsignedInt",
            Self::UnsignedShort => "unsignedShort",
            Self::UnsignedByte => "unsignedByte",
            Self::Float => "float",
            Self::Double => "double",
            Self::Base64Binary => "base64Binary",
            Self::HexBinary => "hexBinary",
            Self::AnyUri => "anyURI",
            Self::QName => "QName",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::Time => "time",
            Self::GYearMonth => "gYearMonth",
            Self::GYear => "gYear",
            Self::GMonthDay => "gMonthDay",
            Self::GDay => "gDay",
            Self::GMonth => "gMonth",
            Self::Duration => "duration",
        }
    }

    pub fn type_name(self) -> ExpandedName {
        ExpandedName::xs(self.local_name())
    }

    pub fn from_local_name(local: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.local_name() == local)
    }
}

fn parse_integer(lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<BigInt, ConversionError> {
    if !lexical::is_integer_lexical(lexical) {
        return Err(ctx.error(LexicalError::Invalid, lexical));
    }
    BigInt::from_str(lexical).map_err(|_| ctx.error(LexicalError::Invalid, lexical))
}

/// Parses an integer and narrows it to `T`, reporting overflow on failure.
fn parse_fixed<T>(lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<T, ConversionError>
where
    T: for<'b> TryFrom<&'b BigInt>,
{
    let big = parse_integer(lexical, ctx)?;
    T::try_from(&big).map_err(|_| ctx.error(LexicalError::Overflow, lexical))
}

fn check(valid: bool, lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError> {
    if valid {
        Ok(XmlValue::String(lexical.to_owned()))
    } else {
        Err(ctx.error(LexicalError::Invalid, lexical))
    }
}

fn convert_qname(lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError> {
    let (prefix, local) =
        lexical::parse_qname_lexical(lexical).map_err(|e| ctx.error(e, lexical))?;
    let ns = match prefix {
        Some(p) => Some(ctx.namespaces().resolve_prefix(p).ok_or_else(|| {
            ConversionError::UnboundPrefix {
                prefix: p.to_owned(),
                value: lexical.to_owned(),
            }
        })?),
        None => ctx.namespaces().resolve_prefix(""),
    };
    Ok(XmlValue::QName {
        prefix: prefix.map(str::to_owned),
        name: ExpandedName::ns(ns.unwrap_or_default(), local),
    })
}

fn decode_base64(lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<Vec<u8>, ConversionError> {
    let compact: String = lexical.chars().filter(|c| !is_xml_whitespace(*c)).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| ctx.error(LexicalError::Invalid, lexical))
}

impl TypeConverter for Builtin {
    fn whitespace(&self) -> WhitespacePolicy {
        match self {
            Self::Untyped => WhitespacePolicy::Facet(WhitespaceMode::Preserve),
            Self::String => WhitespacePolicy::Fixed(WhitespaceMode::Preserve),
            Self::NormalizedString => WhitespacePolicy::Fixed(WhitespaceMode::Replace),
            _ => WhitespacePolicy::Fixed(WhitespaceMode::Collapse),
        }
    }

    fn convert(&self, lexical: &str, ctx: &UnmarshalContext<'_>) -> Result<XmlValue, ConversionError> {
        let err = |e: LexicalError| ctx.error(e, lexical);
        Ok(match self {
            Self::Untyped => XmlValue::Untyped(lexical.to_owned()),
            Self::String | Self::NormalizedString | Self::Token => {
                XmlValue::String(lexical.to_owned())
            }
            Self::Language => return check(lexical::is_valid_language(lexical), lexical, ctx),
            Self::Name => return check(lexical::is_valid_name(lexical), lexical, ctx),
            Self::NCName | Self::Id | Self::IdRef | Self::Entity => {
                return check(lexical::is_valid_ncname(lexical), lexical, ctx);
            }
            Self::NmToken => return check(lexical::is_valid_nmtoken(lexical), lexical, ctx),
            Self::Boolean => XmlValue::Boolean(lexical::parse_boolean(lexical).map_err(err)?),
            Self::Decimal => XmlValue::Decimal(lexical.parse().map_err(err)?),
            Self::Integer => XmlValue::Integer(parse_integer(lexical, ctx)?),
            Self::NonPositiveInteger => {
                let n = parse_integer(lexical, ctx)?;
                if n.sign() == Sign::Plus {
                    return Err(err(LexicalError::Invalid));
                }
                XmlValue::Integer(n)
            }
            Self::NegativeInteger => {
                let n = parse_integer(lexical, ctx)?;
                if n.sign() != Sign::Minus {
                    return Err(err(LexicalError::Invalid));
                }
                XmlValue::Integer(n)
            }
            Self::NonNegativeInteger => {
                let n = parse_integer(lexical, ctx)?;
                if n.sign() == Sign::Minus {
                    return Err(err(LexicalError::Invalid));
                }
                XmlValue::Integer(n)
            }
            Self::PositiveInteger => {
                let n = parse_integer(lexical, ctx)?;
                if n.sign() != Sign::Plus {
                    return Err(err(LexicalError::Invalid));
                }
                XmlValue::Integer(n)
            }
            Self::Long => XmlValue::Long(parse_fixed(lexical, ctx)?),
            Self::Int => XmlValue::Int(parse_fixed(lexical, ctx)?),
            Self::Short => XmlValue::Short(parse_fixed(lexical, ctx)?),
            Self::Byte => XmlValue::Byte(parse_fixed(lexical, ctx)?),
            Self::UnsignedLong => XmlValue::UnsignedLong(parse_fixed(lexical, ctx)?),
            Self::UnsignedInt => XmlValue::UnsignedInt(parse_fixed(lexical, ctx)?),
            Self::UnsignedShort => XmlValue::UnsignedShort(parse_fixed(lexical, ctx)?),
            Self::UnsignedByte => XmlValue::UnsignedByte(parse_fixed(lexical, ctx)?),
            Self::Float => XmlValue::Float(lexical::parse_float(lexical).map_err(err)?),
            Self::Double => XmlValue::Double(lexical::parse_double(lexical).map_err(err)?),
            Self::Base64Binary => XmlValue::Base64Binary(decode_base64(lexical, ctx)?),
            Self::HexBinary => XmlValue::HexBinary(lexical::decode_hex(lexical).map_err(err)?),
            Self::AnyUri => {
                if !lexical::is_valid_any_uri(lexical) {
                    return Err(err(LexicalError::Invalid));
                }
                XmlValue::AnyUri(lexical.to_owned())
            }
            Self::QName => return convert_qname(lexical, ctx),
            Self::DateTime => XmlValue::DateTime(temporal::parse_date_time(lexical).map_err(err)?),
            Self::Date => XmlValue::Date(temporal::parse_date(lexical).map_err(err)?),
            Self::Time => XmlValue::Time(temporal::parse_time(lexical).map_err(err)?),
            Self::GYearMonth => {
                XmlValue::GYearMonth(temporal::parse_g_year_month(lexical).map_err(err)?)
            }
            Self::GYear => XmlValue::GYear(temporal::parse_g_year(lexical).map_err(err)?),
            Self::GMonthDay => {
                XmlValue::GMonthDay(temporal::parse_g_month_day(lexical).map_err(err)?)
            }
            Self::GDay => XmlValue::GDay(temporal::parse_g_day(lexical).map_err(err)?),
            Self::GMonth => XmlValue::GMonth(temporal::parse_g_month(lexical).map_err(err)?),
            Self::Duration => XmlValue::Duration(temporal::parse_duration(lexical).map_err(err)?),
        })
    }
}
