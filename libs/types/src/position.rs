//! Derived position model
//!
//! A position is a read model over the trade stream: signed net holdings
//! per (user, symbol) plus cost basis and realized PnL. The update rules
//! live in the market-data crate behind a cost-basis strategy.

use crate::ids::{Symbol, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_id: UserId,
    pub symbol: Symbol,
    /// Signed net quantity: positive long, negative short
    pub net_qty: Decimal,
    /// Cost basis of the open quantity; zero when flat
    pub avg_entry_price: Decimal,
    pub realized_pnl: Decimal,
    pub updated_at: i64, // Unix nanos
}

impl Position {
    pub fn new(user_id: UserId, symbol: Symbol, timestamp: i64) -> Self {
        Self {
            user_id,
            symbol,
            net_qty: Decimal::ZERO,
            avg_entry_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            updated_at: timestamp,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.net_qty.is_zero()
    }

    /// Notional value of the open quantity at cost
    pub fn cost_value(&self) -> Decimal {
        self.net_qty.abs() * self.avg_entry_price
    }
}
