//! Lossless currency amount backed by rust_decimal.
//!
//! Balances and rewards are stored in SQLite as canonical strings and
//! summed in Rust; SQLite's REAL aggregates would drift for fractional
//! bonus amounts (the grand-referrer share is a quarter of the direct
//! bonus).

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// In-game currency amount.
///
/// Serializes to a JSON number, matching the number-typed balance fields
/// the original client exchanged.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Amount {
    /// Parse an Amount from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Amount)
    }

    /// Format as a canonical string (no exponent notation, no trailing zeros).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Amount(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(RustDecimal::from(value))
    }
}

impl From<RustDecimal> for Amount {
    fn from(value: RustDecimal) -> Self {
        Amount(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Amount {
    type Output = Amount;

    fn mul(self, rhs: Amount) -> Amount {
        Amount(self.0 * rhs.0)
    }
}

impl std::ops::Div for Amount {
    type Output = Amount;

    fn div(self, rhs: Amount) -> Amount {
        Amount(self.0 / rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parse_roundtrip() {
        let test_cases = vec!["123.456", "0.25", "1000000", "0", "30"];

        for s in test_cases {
            let amount = Amount::from_str_canonical(s).expect("parse failed");
            let formatted = amount.to_canonical_string();
            let reparsed = Amount::from_str_canonical(&formatted).expect("reparse failed");
            assert_eq!(amount, reparsed, "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn test_amount_canonical_no_exponent() {
        let amount = Amount::from_str_canonical("123").expect("parse failed");
        let formatted = amount.to_canonical_string();
        assert!(!formatted.contains('e'));
        assert_eq!(formatted, "123");
    }

    #[test]
    fn test_amount_canonical_trims_trailing_zeros() {
        let amount = Amount::from_str_canonical("25.00").unwrap();
        assert_eq!(amount.to_canonical_string(), "25");
    }

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::from_str_canonical("100").unwrap();
        let b = Amount::from_str_canonical("0.25").unwrap();

        assert_eq!((a + b).to_canonical_string(), "100.25");
        assert_eq!((a - b).to_canonical_string(), "99.75");
        assert_eq!((a * b).to_canonical_string(), "25");
        assert_eq!((a / Amount::from(4)).to_canonical_string(), "25");
    }

    #[test]
    fn test_amount_from_i64() {
        let amount = Amount::from(42);
        assert_eq!(amount.to_canonical_string(), "42");
    }

    #[test]
    fn test_amount_json_is_number() {
        let amount = Amount::from_str_canonical("12.5").unwrap();
        let json = serde_json::to_value(amount).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "12.5");
    }

    #[test]
    fn test_amount_sign_checks() {
        assert!(Amount::from(5).is_positive());
        assert!((Amount::zero() - Amount::from(5)).is_negative());
        assert!(Amount::zero().is_zero());
    }
}
