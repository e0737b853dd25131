//! Lexical-space checks shared by the built-in converters.
//!
//! All functions expect already-normalized input; none of them trims.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexicalError {
    #[error("not in the lexical space")]
    Invalid,
    #[error("value out of range")]
    Overflow,
}

/// Splits a lexical QName into `(prefix, local)`.
pub fn parse_qname_lexical(s: &str) -> Result<(Option<&str>, &str), LexicalError> {
    match s.split_once(':') {
        Some((prefix, local)) => {
            if is_valid_ncname(prefix) && is_valid_ncname(local) {
                Ok((Some(prefix), local))
            } else {
                Err(LexicalError::Invalid)
            }
        }
        None if is_valid_ncname(s) => Ok((None, s)),
        None => Err(LexicalError::Invalid),
    }
}

fn is_name_start_char(ch: char) -> bool {
    matches!(ch,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch)
        || matches!(ch,
            '-' | '.' | '0'..='9'
            | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// XML 1.0 (fifth edition) `Name`.
pub fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

/// `Name` without colons.
pub fn is_valid_ncname(s: &str) -> bool {
    !s.contains(':') && is_valid_name(s)
}

pub fn is_valid_nmtoken(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_name_char)
}

/// `[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*`
pub fn is_valid_language(s: &str) -> bool {
    let mut parts = s.split('-');
    let Some(first) = parts.next() else {
        return false;
    };
    if !(1..=8).contains(&first.len()) || !first.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    parts.all(|p| (1..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub fn parse_boolean(s: &str) -> Result<bool, LexicalError> {
    match s {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(LexicalError::Invalid),
    }
}

fn strip_sign(s: &str) -> &str {
    s.strip_prefix(['+', '-']).unwrap_or(s)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]?(\d+(\.\d*)?|\.\d+)`
pub fn is_decimal_lexical(s: &str) -> bool {
    let body = strip_sign(s);
    match body.split_once('.') {
        Some((int, frac)) => {
            all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty())
        }
        None => !body.is_empty() && all_digits(body),
    }
}

/// `[+-]?\d+`
pub fn is_integer_lexical(s: &str) -> bool {
    let body = strip_sign(s);
    !body.is_empty() && all_digits(body)
}

/// Strict XSD float/double lexical form. Only `INF`, `+INF`, `-INF` and `NaN`
/// spell the special values.
pub fn parse_double(s: &str) -> Result<f64, LexicalError> {
    match s {
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        "NaN" => return Ok(f64::NAN),
        _ => {}
    }
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };
    if !is_decimal_lexical(mantissa) || exponent.is_some_and(|e| !is_integer_lexical(e)) {
        return Err(LexicalError::Invalid);
    }
    s.parse::<f64>().map_err(|_| LexicalError::Invalid)
}

pub fn parse_float(s: &str) -> Result<f32, LexicalError> {
    match s {
        "INF" | "+INF" => return Ok(f32::INFINITY),
        "-INF" => return Ok(f32::NEG_INFINITY),
        "NaN" => return Ok(f32::NAN),
        _ => {}
    }
    parse_double(s)?;
    s.parse::<f32>().map_err(|_| LexicalError::Invalid)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

pub fn decode_hex(s: &str) -> Result<Vec<u8>, LexicalError> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return Err(LexicalError::Invalid);
    }
    bytes
        .chunks_exact(2)
        .map(|pair| match (hex_digit(pair[0]), hex_digit(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(LexicalError::Invalid),
        })
        .collect()
}

pub fn encode_hex(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}

/// Loose anyURI check: rejects only characters no URI reference can carry
/// even after escaping.
pub fn is_valid_any_uri(s: &str) -> bool {
    !s.chars().any(|c| c.is_control() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '\\' | '^' | '`'))
        && s.matches('#').count() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qname_split() {
        assert_eq!(parse_qname_lexical("pre_uri:local1"), Ok((Some("pre_uri"), "local1")));
        assert_eq!(parse_qname_lexical("local3"), Ok((None, "local3")));
        assert!(parse_qname_lexical("a:b:c").is_err());
        assert!(parse_qname_lexical(":a").is_err());
        assert!(parse_qname_lexical("1a").is_err());
    }

    #[test]
    fn names() {
        assert!(is_valid_ncname("élément"));
        assert!(is_valid_name("a:b"));
        assert!(!is_valid_ncname("a:b"));
        assert!(is_valid_nmtoken("1-2"));
        assert!(!is_valid_nmtoken(""));
        assert!(is_valid_language("en-US"));
        assert!(!is_valid_language("toolonglang"));
    }

    #[test]
    fn decimals() {
        for ok in ["1", "+1.", "-.5", "1.001", "007"] {
            assert!(is_decimal_lexical(ok), "{ok}");
        }
        for bad in ["", ".", "+", "1e3", "1.2.3", " 1"] {
            assert!(!is_decimal_lexical(bad), "{bad}");
        }
    }

    #[test]
    fn doubles_are_strict() {
        assert_eq!(parse_double("-2.007"), Ok(-2.007));
        assert_eq!(parse_double("1E3"), Ok(1000.0));
        assert_eq!(parse_double("-INF"), Ok(f64::NEG_INFINITY));
        assert!(parse_double("NaN").is_ok_and(f64::is_nan));
        for bad in ["inf", "infinity", "nan", "Infinity", "1e", "e3", ""] {
            assert_eq!(parse_double(bad), Err(LexicalError::Invalid), "{bad}");
        }
    }

    #[test]
    fn hex_round_trip() {
        let bytes = decode_hex("6865784269").unwrap();
        assert_eq!(bytes, b"hexBi");
        assert_eq!(encode_hex(&bytes), "6865784269");
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }
}
