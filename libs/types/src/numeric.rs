//! Fixed-point decimal types for prices and quantities
//!
//! Thin newtypes over `rust_decimal::Decimal` so the engine can never
//! confuse a price with a quantity, and so positivity is checked once at
//! the boundary instead of everywhere downstream. Quantities support
//! fractional shares.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Execution or quote price. Always strictly positive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Try to create a price; None unless strictly positive.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        s.parse::<Decimal>().ok().and_then(Self::try_new)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order or trade quantity. Never negative; zero only as a result of
/// subtraction (a resting order always has positive remaining quantity).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Try to create a quantity; None if negative.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_str(s: &str) -> Option<Self> {
        s.parse::<Decimal>().ok().and_then(Self::try_new)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Saturating-at-zero subtraction; None if `other` exceeds `self`.
    pub fn checked_sub(&self, other: Quantity) -> Option<Quantity> {
        Quantity::try_new(self.0 - other.0)
    }

    pub fn min(self, other: Quantity) -> Quantity {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_must_be_positive() {
        assert!(Price::try_new(Decimal::from(100)).is_some());
        assert!(Price::try_new(Decimal::ZERO).is_none());
        assert!(Price::try_new(Decimal::from(-1)).is_none());
    }

    #[test]
    fn test_price_parsing() {
        let price = Price::from_str("3000.50").unwrap();
        assert_eq!(price.as_decimal(), Decimal::from_str_exact("3000.50").unwrap());
        assert!(Price::from_str("-5").is_none());
        assert!(Price::from_str("not a number").is_none());
    }

    #[test]
    fn test_quantity_default_is_zero() {
        assert_eq!(Quantity::default(), Quantity::zero());
    }

    #[test]
    fn test_quantity_allows_fractional_shares() {
        let qty = Quantity::from_str("0.0001").unwrap();
        assert!(!qty.is_zero());
        assert!(Quantity::from_str("-0.5").is_none());
    }

    #[test]
    fn test_quantity_checked_sub() {
        let a = Quantity::from_str("1.5").unwrap();
        let b = Quantity::from_str("0.5").unwrap();
        assert_eq!(a.checked_sub(b), Quantity::from_str("1.0"));
        assert_eq!(b.checked_sub(a), None);
    }

    #[test]
    fn test_quantity_min() {
        let a = Quantity::from_str("2.0").unwrap();
        let b = Quantity::from_str("3.0").unwrap();
        assert_eq!(a.min(b), a);
        assert_eq!(b.min(a), a);
    }

    #[test]
    fn test_price_ordering() {
        assert!(Price::from_u64(100) < Price::from_u64(101));
    }

    #[test]
    fn test_serialization_round_trip() {
        let price = Price::from_str("123.45").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(price, back);
    }

    proptest::proptest! {
        #[test]
        fn prop_checked_sub_agrees_with_ordering(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let a = Quantity::from_u64(a);
            let b = Quantity::from_u64(b);
            proptest::prop_assert_eq!(a.checked_sub(b).is_some(), a >= b);
            proptest::prop_assert_eq!((a + b).checked_sub(b), Some(a));
        }
    }
}
