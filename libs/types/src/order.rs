//! Order lifecycle types

use crate::errors::EngineError;
use crate::ids::{OrderId, Symbol, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type: priced or take-whatever-is-there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Executes at the given price or better
    Limit,
    /// Executes immediately at the best available prices; never rests
    Market,
}

/// Why an order was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    UserRequested,
    /// Market order remainder with no liquidity left to take
    UnfilledMarketRemainder,
    /// Modify replaced this order with a re-sequenced one
    Replaced,
    AdminCancel,
}

/// Why an order was rejected without ever entering the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    /// Market order with an empty opposing book
    NoLiquidity,
    /// Funds-reservation hook declined the order
    FundsUnavailable,
    /// Would have matched the user's own resting order
    SelfTrade,
}

/// Order status
///
/// Open → PartiallyFilled → Filled (terminal);
/// {Open, PartiallyFilled} → Cancelled (terminal);
/// validation/funds failure → Rejected (terminal, never entered book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum OrderStatus {
    #[serde(rename = "OPEN")]
    Open,

    #[serde(rename = "PARTIALLY_FILLED")]
    PartiallyFilled,

    #[serde(rename = "FILLED")]
    Filled,

    #[serde(rename = "CANCELLED")]
    Cancelled(CancelReason),

    #[serde(rename = "REJECTED")]
    Rejected(RejectReason),
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled(_) | OrderStatus::Rejected(_)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Open => write!(f, "OPEN"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Cancelled(_) => write!(f, "CANCELLED"),
            OrderStatus::Rejected(_) => write!(f, "REJECTED"),
        }
    }
}

/// A single order, mutated only by fills and cancel/modify until terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    /// None iff market order
    pub price: Option<Price>,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
    /// Monotonic per symbol, assigned at acceptance; sole tie-break at
    /// equal price
    pub sequence: u64,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        price: Option<Price>,
        quantity: Quantity,
        sequence: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            symbol,
            side,
            order_type,
            price,
            quantity,
            filled_quantity: Quantity::zero(),
            status: OrderStatus::Open,
            sequence,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Unfilled quantity; 0 ≤ filled ≤ quantity holds at all times
    pub fn remaining(&self) -> Quantity {
        self.quantity
            .checked_sub(self.filled_quantity)
            .unwrap_or(Quantity::zero())
    }

    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Apply a fill and adjust status.
    ///
    /// Fails with an invariant error instead of panicking if the fill
    /// would exceed the order quantity or the order is terminal.
    pub fn fill(&mut self, fill_quantity: Quantity, timestamp: i64) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::invariant(format!(
                "fill applied to terminal order {}",
                self.id
            )));
        }

        let new_filled = self.filled_quantity + fill_quantity;
        if self.quantity.checked_sub(new_filled).is_none() {
            return Err(EngineError::invariant(format!(
                "fill of {} would exceed quantity {} on order {}",
                fill_quantity, self.quantity, self.id
            )));
        }

        self.filled_quantity = new_filled;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;
        Ok(())
    }

    /// Cancel a non-terminal order
    pub fn cancel(&mut self, reason: CancelReason, timestamp: i64) -> Result<(), EngineError> {
        if self.status.is_terminal() {
            return Err(EngineError::AlreadyTerminal {
                status: self.status.to_string(),
            });
        }
        self.status = OrderStatus::Cancelled(reason);
        self.updated_at = timestamp;
        Ok(())
    }

    /// Mark a never-booked order as rejected
    pub fn reject(&mut self, reason: RejectReason, timestamp: i64) {
        self.status = OrderStatus::Rejected(reason);
        self.updated_at = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit_buy(qty: &str) -> Order {
        Order::new(
            UserId::new(),
            Symbol::try_new("AAPL/USD").unwrap(),
            Side::Buy,
            OrderType::Limit,
            Some(Price::from_u64(100)),
            Quantity::from_str(qty).unwrap(),
            1,
            1708123456789000000,
        )
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_new_order_is_open() {
        let order = limit_buy("1.0");
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining(), Quantity::from_str("1.0").unwrap());
        assert!(!order.has_fills());
    }

    #[test]
    fn test_partial_then_full_fill() {
        let mut order = limit_buy("1.0");

        order
            .fill(Quantity::from_str("0.3").unwrap(), 1708123456790000000)
            .unwrap();
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), Quantity::from_str("0.7").unwrap());

        order
            .fill(Quantity::from_str("0.7").unwrap(), 1708123456791000000)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.remaining().is_zero());
    }

    #[test]
    fn test_overfill_is_an_invariant_error() {
        let mut order = limit_buy("1.0");
        let err = order
            .fill(Quantity::from_str("1.5").unwrap(), 1708123456790000000)
            .unwrap_err();
        assert!(matches!(err, EngineError::Invariant { .. }));
        // No partial mutation
        assert!(!order.has_fills());
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn test_cancel_terminal_is_conflict() {
        let mut order = limit_buy("1.0");
        order
            .fill(Quantity::from_str("1.0").unwrap(), 1708123456790000000)
            .unwrap();

        let err = order
            .cancel(CancelReason::UserRequested, 1708123456791000000)
            .unwrap_err();
        assert!(matches!(err, EngineError::AlreadyTerminal { .. }));
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn test_status_serialization_tags() {
        let status = OrderStatus::Cancelled(CancelReason::UserRequested);
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("CANCELLED"));
        assert!(json.contains("USER_REQUESTED"));

        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, back);
    }

    #[test]
    fn test_order_serialization_round_trip() {
        let order = limit_buy("2.5");
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
