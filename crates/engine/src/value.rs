use core::fmt;
use core::num::FpCategory;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigInt;

use crate::decimal::XsDecimal;
use crate::lexical::encode_hex;
use crate::model::ExpandedName;
use crate::temporal::{
    GDay, GMonth, GMonthDay, GYear, GYearMonth, XsDate, XsDateTime, XsDuration, XsTime,
};

/// A typed value produced by a [`TypeConverter`](crate::convert::TypeConverter).
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    /// Text of an element or attribute with no more specific type.
    Untyped(String),
    String(String),
    Boolean(bool),
    Decimal(XsDecimal),
    Integer(BigInt),
    Long(i64),
    Int(i32),
    Short(i16),
    Byte(i8),
    UnsignedLong(u64),
    UnsignedInt(u32),
    UnsignedShort(u16),
    UnsignedByte(u8),
    Float(f32),
    Double(f64),
    Base64Binary(Vec<u8>),
    HexBinary(Vec<u8>),
    AnyUri(String),
    QName {
        prefix: Option<String>,
        name: ExpandedName,
    },
    DateTime(XsDateTime),
    Date(XsDate),
    Time(XsTime),
    GYearMonth(GYearMonth),
    GYear(GYear),
    GMonthDay(GMonthDay),
    GDay(GDay),
    GMonth(GMonth),
    Duration(XsDuration),
    /// Placeholder recorded after a failed conversion, holding the
    /// normalized lexical text that was rejected.
    Invalid(String),
}

impl XmlValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// Text payload of the string-like variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Untyped(s) | Self::String(s) | Self::AnyUri(s) | Self::Invalid(s) => Some(s),
            _ => None,
        }
    }

    /// Representation identity: `NaN` is identical to `NaN`, while `0.0` and
    /// `-0.0` differ. Everything else compares with `==`.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Self::Double(a), Self::Double(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            _ => self == other,
        }
    }
}

fn fmt_special(f: &mut fmt::Formatter<'_>, v: f64) -> Option<fmt::Result> {
    if v.is_nan() {
        Some(f.write_str("NaN"))
    } else if v.is_infinite() {
        Some(f.write_str(if v > 0.0 { "INF" } else { "-INF" }))
    } else {
        None
    }
}

/// Plain notation for magnitudes in `[1e-6, 1e6)` and for zero, mantissa and
/// exponent (`1.0E300`) outside that range.
fn fmt_finite<T: fmt::Display + fmt::UpperExp>(
    f: &mut fmt::Formatter<'_>,
    v: T,
    as_f64: f64,
) -> fmt::Result {
    let magnitude = as_f64.abs();
    if as_f64.classify() == FpCategory::Zero || (1e-6..1e6).contains(&magnitude) {
        return write!(f, "{v}");
    }
    let sci = format!("{v:E}");
    match sci.split_once('E') {
        Some((mantissa, exp)) if !mantissa.contains('.') => write!(f, "{mantissa}.0E{exp}"),
        _ => f.write_str(&sci),
    }
}

/// Canonical lexical form.
impl fmt::Display for XmlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Untyped(s) | Self::String(s) | Self::AnyUri(s) | Self::Invalid(s) => {
                f.write_str(s)
            }
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Decimal(d) => d.fmt(f),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::UnsignedLong(v) => write!(f, "{v}"),
            Self::UnsignedInt(v) => write!(f, "{v}"),
            Self::UnsignedShort(v) => write!(f, "{v}"),
            Self::UnsignedByte(v) => write!(f, "{v}"),
            Self::Float(v) => {
                fmt_special(f, f64::from(*v)).unwrap_or_else(|| fmt_finite(f, *v, f64::from(*v)))
            }
            Self::Double(v) => fmt_special(f, *v).unwrap_or_else(|| fmt_finite(f, *v, *v)),
            Self::Base64Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::HexBinary(bytes) => f.write_str(&encode_hex(bytes)),
            Self::QName { prefix, name } => match prefix {
                Some(p) => write!(f, "{p}:{}", name.local),
                None => f.write_str(&name.local),
            },
            Self::DateTime(v) => v.fmt(f),
            Self::Date(v) => v.fmt(f),
            Self::Time(v) => v.fmt(f),
            Self::GYearMonth(v) => v.fmt(f),
            Self::GYear(v) => v.fmt(f),
            Self::GMonthDay(v) => v.fmt(f),
            Self::GDay(v) => v.fmt(f),
            Self::GMonth(v) => v.fmt(f),
            Self::Duration(v) => v.fmt(f),
        }
    }
}
