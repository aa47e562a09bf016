//! Decimal amounts carried as text.
//!
//! Chain amounts arrive as decimal strings in the asset's native unit and stay
//! that way; they are never parsed into binary floating point. Conversion to
//! integer base units is exact or fails.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypeError;

/// Field name reported when a decimal is parsed without one.
const UNNAMED: &str = "decimal";

/// A lexically valid, non-negative decimal number: `digits[.digits]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecimalAmount(String);

impl DecimalAmount {
    /// Validate `value` as a decimal amount for the named field.
    pub fn parse(field: &'static str, value: &str) -> Result<Self, TypeError> {
        if is_decimal(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(TypeError::InvalidDecimal {
                field,
                value: value.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.bytes().all(|b| b == b'0' || b == b'.')
    }

    /// Scale to integer base units with `decimals` fractional places.
    ///
    /// Returns `None` when the amount has more fractional digits than
    /// `decimals` allows (after trimming trailing zeros) or overflows `u128`.
    pub fn to_base_units(&self, decimals: u8) -> Option<u128> {
        let (whole, frac) = match self.0.split_once('.') {
            Some((w, f)) => (w, f.trim_end_matches('0')),
            None => (self.0.as_str(), ""),
        };
        let decimals = usize::from(decimals);
        if frac.len() > decimals {
            return None;
        }

        let mut units: u128 = 0;
        let padding = std::iter::repeat(b'0').take(decimals - frac.len());
        for digit in whole.bytes().chain(frac.bytes()).chain(padding) {
            units = units
                .checked_mul(10)?
                .checked_add(u128::from(digit - b'0'))?;
        }
        Some(units)
    }
}

fn is_decimal(value: &str) -> bool {
    let (whole, frac) = match value.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (value, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && frac.map_or(true, digits)
}

impl TryFrom<String> for DecimalAmount {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_decimal(&value) {
            Ok(Self(value))
        } else {
            Err(TypeError::InvalidDecimal {
                field: UNNAMED,
                value,
            })
        }
    }
}

impl From<DecimalAmount> for String {
    fn from(amount: DecimalAmount) -> String {
        amount.0
    }
}

impl FromStr for DecimalAmount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(UNNAMED, s)
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_integers_and_fractions() {
        assert!(DecimalAmount::parse("amount", "0").is_ok());
        assert!(DecimalAmount::parse("amount", "1234567890123456789012345").is_ok());
        assert!(DecimalAmount::parse("amount", "0.00000001").is_ok());
    }

    #[test]
    fn rejects_non_decimal_text() {
        for bad in ["", "-1", "1.", ".5", "1e8", "1.2.3", " 1", "NaN", "0x10"] {
            assert!(
                DecimalAmount::parse("fee", bad).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn error_names_the_field() {
        let err = DecimalAmount::parse("fee", "abc").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidDecimal {
                field: "fee",
                value: "abc".into()
            }
        );
    }

    #[test]
    fn base_units_are_exact() {
        let amount = DecimalAmount::parse("amount", "1.5").unwrap();
        assert_eq!(amount.to_base_units(8), Some(150_000_000));

        let wei = DecimalAmount::parse("amount", "0.000000000000000001").unwrap();
        assert_eq!(wei.to_base_units(18), Some(1));

        let trailing = DecimalAmount::parse("amount", "2.500").unwrap();
        assert_eq!(trailing.to_base_units(1), Some(25));
    }

    #[test]
    fn base_units_reject_excess_precision() {
        let amount = DecimalAmount::parse("amount", "0.123").unwrap();
        assert_eq!(amount.to_base_units(2), None);
    }

    #[test]
    fn zero_detection() {
        assert!(DecimalAmount::parse("amount", "0.000").unwrap().is_zero());
        assert!(!DecimalAmount::parse("amount", "0.001").unwrap().is_zero());
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let ok: DecimalAmount = serde_json::from_str("\"42.1\"").unwrap();
        assert_eq!(ok.as_str(), "42.1");
        assert!(serde_json::from_str::<DecimalAmount>("\"4,2\"").is_err());
    }

    #[test]
    fn unnamed_conversions_do_not_claim_a_field() {
        let err = DecimalAmount::try_from("4,2".to_string()).unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidDecimal {
                field: "decimal",
                value: "4,2".into()
            }
        );
        assert_eq!(
            "x".parse::<DecimalAmount>().unwrap_err(),
            TypeError::InvalidDecimal {
                field: "decimal",
                value: "x".into()
            }
        );
    }
}
