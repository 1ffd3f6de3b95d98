//! Fixed-point quantity.
//!
//! Quantities are stored as signed milli-units (`i64`), so every value is
//! rounded to exactly 3 fractional digits the moment it enters the system.
//! Rounding is half away from zero and happens in exactly two places:
//! [`Quantity::parse`] for decimal text and [`Quantity::from_f64`] for JSON
//! numbers read back from disk. All arithmetic afterwards is exact integer
//! arithmetic, so sums and deltas never drift.
//!
//! ## Range
//!
//! A single quantity is limited to [`MAX_MILLI`] in magnitude (one trillion
//! units). Below that bound every milli value survives the trip through a
//! JSON float unchanged, and the row ingestor additionally caps the sum of
//! magnitudes per file at [`MAX_TOTAL_MILLI`], so totals and deltas of two
//! files stay inside `i64`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Number of milli-units in one unit.
pub const SCALE: i64 = 1000;

/// Number of fractional digits kept.
pub const FRACTION_DIGITS: u32 = 3;

/// Largest accepted magnitude of a single quantity, in milli-units.
pub const MAX_MILLI: i64 = 1_000_000_000_000_000;

/// Largest accepted sum of quantity magnitudes in one file, in milli-units.
pub const MAX_TOTAL_MILLI: i64 = 4_000_000_000_000_000_000;

// Digits of MAX_MILLI
const MAX_MILLI_DIGITS: usize = 16;

/// Why a quantity string was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("quantity is empty")]
    Empty,
    #[error("quantity {0:?} is not finite")]
    NonFinite(String),
    #[error("quantity {0:?} is not a number")]
    Invalid(String),
    #[error("quantity {0:?} is out of range")]
    OutOfRange(String),
}

/// A decimal quantity with 3 fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    pub const fn from_milli(milli: i64) -> Self {
        Self(milli)
    }

    pub const fn from_units(units: i64) -> Self {
        Self(units * SCALE)
    }

    /// Milli value, or `None` when its magnitude exceeds [`MAX_MILLI`].
    pub fn from_milli_checked(milli: i64) -> Option<Self> {
        (milli.checked_abs()? <= MAX_MILLI).then_some(Self(milli))
    }

    pub const fn milli(self) -> i64 {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_add(rhs.0).map(Quantity)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Round a binary float to the nearest milli-unit.
    ///
    /// Returns `None` for non-finite values and values beyond [`MAX_MILLI`].
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = (value * SCALE as f64).round();
        if scaled.abs() > MAX_MILLI as f64 {
            return None;
        }
        Self::from_milli_checked(scaled as i64)
    }

    /// Parse a decimal string such as `"1,234.5678"`, `"-3"`, or `"2.5e3"`.
    ///
    /// Grouping separators (`,`, `_`, whitespace) are stripped first. The
    /// decimal digits are converted exactly, then rounded half away from
    /// zero to 3 fractional digits. Any number of digits is accepted as long
    /// as the rounded magnitude is at most [`MAX_MILLI`].
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
            .collect();
        if cleaned.is_empty() {
            return Err(QuantityError::Empty);
        }

        let lowered = cleaned.to_ascii_lowercase();
        let unsigned = lowered.trim_start_matches(['+', '-']);
        if matches!(unsigned, "inf" | "infinity" | "nan") {
            return Err(QuantityError::NonFinite(text.to_string()));
        }
        if !is_decimal_shape(&cleaned) {
            return Err(QuantityError::Invalid(text.to_string()));
        }

        parse_decimal(&cleaned).ok_or_else(|| QuantityError::OutOfRange(text.to_string()))
    }
}

/// Convert a string of shape `[+-]digits[.digits][(e|E)[+-]digits]` to
/// milli-units, or `None` when the result is out of range.
fn parse_decimal(s: &str) -> Option<Quantity> {
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, "0"),
    };

    let (int_part, frac_part) = match mantissa.find('.') {
        Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
        None => (mantissa, ""),
    };

    let digits: String = int_part.chars().chain(frac_part.chars()).collect();
    let significant = digits.trim_start_matches('0');
    let trimmed = significant.trim_end_matches('0');
    if trimmed.is_empty() {
        return Some(Quantity::ZERO);
    }
    let trailing_zeros = (significant.len() - trimmed.len()) as i64;

    // value = trimmed * 10^shift milli-units
    let shift = exponent
        .parse::<i64>()
        .ok()?
        .checked_sub(frac_part.len() as i64)?
        .checked_add(trailing_zeros)?
        .checked_add(FRACTION_DIGITS as i64)?;

    // Digits left of the milli point; the next one is the rounding guard
    let kept = (trimmed.len() as i64).checked_add(shift)?;
    if kept > MAX_MILLI_DIGITS as i64 {
        return None;
    }

    let magnitude: i64 = if kept <= 0 {
        let guard = if kept == 0 { trimmed.as_bytes()[0] } else { b'0' };
        i64::from(guard >= b'5')
    } else if shift >= 0 {
        let value: i64 = trimmed.parse().ok()?;
        value.checked_mul(10_i64.checked_pow(u32::try_from(shift).ok()?)?)?
    } else {
        let split = kept as usize;
        let value: i64 = trimmed[..split].parse().ok()?;
        let guard = trimmed.as_bytes()[split];
        value.checked_add(i64::from(guard >= b'5'))?
    };

    let signed = if negative { -magnitude } else { magnitude };
    Quantity::from_milli_checked(signed)
}

fn is_decimal_shape(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };

    let mut seen_dot = false;
    let mut seen_digit = false;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    if !seen_digit {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp_digits.is_empty() && exp_digits.chars().all(|c| c.is_ascii_digit())
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 - rhs.0)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Quantity {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Quantity> for Quantity {
    fn sum<I: Iterator<Item = &'a Quantity>>(iter: I) -> Quantity {
        iter.copied().sum()
    }
}

impl fmt::Display for Quantity {
    /// Shortest exact decimal form: `5`, `13.92`, `-0.005`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / SCALE as u64;
        let frac = abs % SCALE as u64;
        if frac == 0 {
            write!(f, "{}{}", sign, units)
        } else {
            let frac = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, units, frac.trim_end_matches('0'))
        }
    }
}

impl Serialize for Quantity {
    /// Whole quantities serialize as JSON integers, others as the shortest
    /// float. Within [`MAX_MILLI`] that float reads back to the same milli
    /// value.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % SCALE == 0 {
            serializer.serialize_i64(self.0 / SCALE)
        } else {
            serializer.serialize_f64(self.to_f64())
        }
    }
}

struct QuantityVisitor;

impl<'de> Visitor<'de> for QuantityVisitor {
    type Value = Quantity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a finite number or decimal string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Quantity, E> {
        v.checked_mul(SCALE)
            .and_then(Quantity::from_milli_checked)
            .ok_or_else(|| E::custom(format!("quantity {} is out of range", v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Quantity, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(SCALE))
            .and_then(Quantity::from_milli_checked)
            .ok_or_else(|| E::custom(format!("quantity {} is out of range", v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Quantity, E> {
        Quantity::from_f64(v)
            .ok_or_else(|| E::custom(format!("quantity {} is not finite or out of range", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Quantity, E> {
        Quantity::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuantityVisitor)
    }
}
