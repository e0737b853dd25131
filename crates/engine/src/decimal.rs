//! Arbitrary-precision `xs:decimal`.

use core::fmt;
use core::str::FromStr;

use num_bigint::{BigInt, Sign};

use crate::lexical::{self, LexicalError};

/// Exact decimal number `unscaled × 10^-scale`.
///
/// Kept normalized: the fraction has no trailing zeros and zero has scale 0,
/// so equal numbers compare and hash equal regardless of how they were
/// written (`1.50` and `+01.5` are the same value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct XsDecimal {
    unscaled: BigInt,
    scale: u32,
}

impl XsDecimal {
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
        .normalized()
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// Number of fraction digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    fn normalized(mut self) -> Self {
        let ten = BigInt::from(10u8);
        while self.scale > 0 && (&self.unscaled % &ten).sign() == Sign::NoSign {
            self.unscaled /= &ten;
            self.scale -= 1;
        }
        self
    }
}

impl From<BigInt> for XsDecimal {
    fn from(value: BigInt) -> Self {
        Self::new(value, 0)
    }
}

impl From<i64> for XsDecimal {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

/// `[+-]?(\d+(\.\d*)?|\.\d+)`, parsed without any loss of digits.
impl FromStr for XsDecimal {
    type Err = LexicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !lexical::is_decimal_lexical(s) {
            return Err(LexicalError::Invalid);
        }
        let (negative, body) = match s.strip_prefix('-') {
            Some(b) => (true, b),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int, frac) = body.split_once('.').unwrap_or((body, ""));
        let frac = frac.trim_end_matches('0');
        let scale = u32::try_from(frac.len()).map_err(|_| LexicalError::Overflow)?;

        let mut digits = String::with_capacity(int.len() + frac.len());
        digits.push_str(int);
        digits.push_str(frac);
        let magnitude = if digits.is_empty() {
            BigInt::default()
        } else {
            BigInt::parse_bytes(digits.as_bytes(), 10).ok_or(LexicalError::Invalid)?
        };
        let unscaled = if negative { -magnitude } else { magnitude };
        Ok(Self { unscaled, scale }.normalized())
    }
}

/// Canonical form: no `+`, no leading zeros beyond a single `0` before the
/// point, no trailing fraction zeros, no point for integral values.
impl fmt::Display for XsDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        if self.is_negative() {
            f.write_str("-")?;
        }
        let scale = self.scale as usize;
        if scale == 0 {
            f.write_str(&digits)
        } else if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}
