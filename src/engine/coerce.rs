//! Field coercion with documented fallbacks.
//!
//! Coercion never fails. When a value cannot be read it is replaced with its
//! default and the substitution is reported as [`Coerced::Degraded`], so a
//! zero price caused by bad input can be told apart from a real zero.

use super::record::{RawCell, SENTINEL};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "value")]
pub enum DegradeReason {
    /// The cell was blank.
    Missing,
    /// The source table has no column for this field.
    ColumnAbsent,
    /// Text that is not a number.
    NotNumeric(String),
    /// Text without a single digit in it.
    NoDigits(String),
    /// Digits that do not fit the target integer.
    Overflow(String),
    /// Negative reference price.
    Negative(String),
    /// A boolean cell where a number was expected.
    NonText,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Missing => write!(f, "blank cell"),
            DegradeReason::ColumnAbsent => write!(f, "column not present in source"),
            DegradeReason::NotNumeric(v) => write!(f, "'{}' is not a number", v),
            DegradeReason::NoDigits(v) => write!(f, "'{}' contains no digits", v),
            DegradeReason::Overflow(v) => write!(f, "'{}' is too large", v),
            DegradeReason::Negative(v) => write!(f, "'{}' is negative", v),
            DegradeReason::NonText => write!(f, "boolean cell"),
        }
    }
}

/// Result of coercing one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    Ok(T),
    Degraded { value: T, reason: DegradeReason },
}

impl<T> Coerced<T> {
    fn degraded(value: T, reason: DegradeReason) -> Self {
        Coerced::Degraded { value, reason }
    }

    #[cfg(test)]
    pub fn value(self) -> T {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (T, Option<DegradeReason>) {
        match self {
            Coerced::Ok(value) => (value, None),
            Coerced::Degraded { value, reason } => (value, Some(reason)),
        }
    }

    #[cfg(test)]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Coerced::Degraded { .. })
    }
}

/// Reference price: plain or scientific decimal notation, otherwise 0.
pub fn price(cell: &RawCell) -> Coerced<Decimal> {
    let parsed = match cell {
        RawCell::Empty => return Coerced::degraded(Decimal::ZERO, DegradeReason::Missing),
        RawCell::Bool(_) => return Coerced::degraded(Decimal::ZERO, DegradeReason::NonText),
        RawCell::Number(n) => Decimal::from_f64(*n),
        RawCell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Coerced::degraded(Decimal::ZERO, DegradeReason::Missing);
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
    };

    match parsed {
        Some(value) if value.is_sign_negative() && !value.is_zero() => Coerced::degraded(
            Decimal::ZERO,
            DegradeReason::Negative(cell.to_string()),
        ),
        Some(value) => Coerced::Ok(value.normalize()),
        None => Coerced::degraded(
            Decimal::ZERO,
            DegradeReason::NotNumeric(cell.to_string().trim().to_string()),
        ),
    }
}

/// Engine displacement: keep only the digits of the cell's text, otherwise 0.
///
/// A zero fraction (`"1800.0"`) is dropped first, so text exported from a
/// spreadsheet reads the same as the numeric cell it came from.
pub fn displacement(cell: &RawCell) -> Coerced<u64> {
    if let RawCell::Bool(_) = cell {
        return Coerced::degraded(0, DegradeReason::NonText);
    }
    if cell.is_blank() {
        return Coerced::degraded(0, DegradeReason::Missing);
    }

    let text = cell.to_string();
    let text = strip_zero_fraction(text.trim());
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Coerced::degraded(0, DegradeReason::NoDigits(text.trim().to_string()));
    }
    match digits.parse::<u64>() {
        Ok(cc) => Coerced::Ok(cc),
        Err(_) => Coerced::degraded(0, DegradeReason::Overflow(digits)),
    }
}

fn strip_zero_fraction(text: &str) -> &str {
    match text.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && !fraction.is_empty()
                && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => text,
    }
}

/// Upper-case and trim a categorical value; blank, `NAN` and `NONE` become
/// the sentinel.
pub fn categorical(cell: &RawCell) -> String {
    let value = cell.to_string().trim().to_uppercase();
    match value.as_str() {
        "" | "NAN" | "NONE" => SENTINEL.to_string(),
        _ => value,
    }
}
