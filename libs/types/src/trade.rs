//! Executed trade record
//!
//! A trade is created once by the matching engine and never mutated or
//! deleted afterwards.

use crate::ids::{OrderId, Symbol, TradeId, UserId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An atomic exchange between one maker and one taker order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    /// Monotonic per symbol, assigned at append
    pub sequence: u64,
    pub symbol: Symbol,

    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    pub taker_user_id: UserId,
    pub maker_user_id: UserId,

    /// Side of the incoming (taker) order
    pub taker_side: Side,
    /// Execution price; always the maker's resting price
    pub price: Price,
    pub quantity: Quantity,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        taker_order_id: OrderId,
        maker_order_id: OrderId,
        taker_user_id: UserId,
        maker_user_id: UserId,
        taker_side: Side,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        Self {
            id: TradeId::new(),
            sequence,
            symbol,
            taker_order_id,
            maker_order_id,
            taker_user_id,
            maker_user_id,
            taker_side,
            price,
            quantity,
            executed_at,
        }
    }

    /// Notional value (price × quantity)
    pub fn value(&self) -> Decimal {
        self.price.as_decimal() * self.quantity.as_decimal()
    }

    /// Whether the given user was on either side of this trade
    pub fn involves(&self, user_id: &UserId) -> bool {
        &self.taker_user_id == user_id || &self.maker_user_id == user_id
    }

    /// The user who bought in this trade
    pub fn buyer(&self) -> UserId {
        match self.taker_side {
            Side::Buy => self.taker_user_id,
            Side::Sell => self.maker_user_id,
        }
    }

    /// The user who sold in this trade
    pub fn seller(&self) -> UserId {
        match self.taker_side {
            Side::Buy => self.maker_user_id,
            Side::Sell => self.taker_user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(taker_side: Side) -> Trade {
        Trade::new(
            7,
            Symbol::try_new("AAPL/USD").unwrap(),
            OrderId::new(),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            taker_side,
            Price::from_u64(100),
            Quantity::from_str("0.5").unwrap(),
            1708123456789000000,
        )
    }

    #[test]
    fn test_trade_value() {
        let trade = sample_trade(Side::Buy);
        assert_eq!(trade.value(), Decimal::from(50));
    }

    #[test]
    fn test_buyer_seller_by_taker_side() {
        let trade = sample_trade(Side::Buy);
        assert_eq!(trade.buyer(), trade.taker_user_id);
        assert_eq!(trade.seller(), trade.maker_user_id);

        let trade = sample_trade(Side::Sell);
        assert_eq!(trade.buyer(), trade.maker_user_id);
        assert_eq!(trade.seller(), trade.taker_user_id);
    }

    #[test]
    fn test_involves() {
        let trade = sample_trade(Side::Buy);
        assert!(trade.involves(&trade.taker_user_id));
        assert!(trade.involves(&trade.maker_user_id));
        assert!(!trade.involves(&UserId::new()));
    }

    #[test]
    fn test_serialization_round_trip() {
        let trade = sample_trade(Side::Sell);
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
