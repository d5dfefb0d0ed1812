//! Crossing detection
//!
//! A buy crosses an ask level if it is a market order or its limit price
//! is at or above the level price; a sell crosses a bid level
//! symmetrically.

use tokex_types::numeric::Price;
use tokex_types::order::Side;

/// Whether a taker at `taker_price` (None for market) crosses a resting
/// level at `level_price`.
pub fn crosses(taker_side: Side, taker_price: Option<Price>, level_price: Price) -> bool {
    match (taker_side, taker_price) {
        (_, None) => true,
        (Side::Buy, Some(price)) => price >= level_price,
        (Side::Sell, Some(price)) => price <= level_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_buy_crosses_at_or_above() {
        let level = Price::from_u64(100);
        assert!(crosses(Side::Buy, Some(Price::from_u64(101)), level));
        assert!(crosses(Side::Buy, Some(Price::from_u64(100)), level));
        assert!(!crosses(Side::Buy, Some(Price::from_u64(99)), level));
    }

    #[test]
    fn test_limit_sell_crosses_at_or_below() {
        let level = Price::from_u64(100);
        assert!(crosses(Side::Sell, Some(Price::from_u64(99)), level));
        assert!(crosses(Side::Sell, Some(Price::from_u64(100)), level));
        assert!(!crosses(Side::Sell, Some(Price::from_u64(101)), level));
    }

    #[test]
    fn test_market_crosses_anything() {
        let level = Price::from_u64(100);
        assert!(crosses(Side::Buy, None, level));
        assert!(crosses(Side::Sell, None, level));
    }
}
