//! Trade construction
//!
//! Owns the per-symbol trade sequence counter and stamps each executed
//! fill into an immutable `Trade`. The execution price is always the
//! maker's resting price.

use tokex_types::ids::{OrderId, Symbol, UserId};
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::Order;
use tokex_types::trade::Trade;

pub struct MatchExecutor {
    next_sequence: u64,
}

impl MatchExecutor {
    /// Create an executor whose first trade gets `starting_sequence`
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            next_sequence: starting_sequence,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Build the trade for one planned fill
    pub fn execute_trade(
        &mut self,
        symbol: Symbol,
        taker: &Order,
        maker_order_id: OrderId,
        maker_user_id: UserId,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        Trade::new(
            self.next_sequence(),
            symbol,
            taker.id,
            maker_order_id,
            taker.user_id,
            maker_user_id,
            taker.side,
            price,
            quantity,
            timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::order::{OrderType, Side};

    fn taker() -> Order {
        Order::new(
            UserId::new(),
            Symbol::try_new("AAPL/USD").unwrap(),
            Side::Buy,
            OrderType::Limit,
            Some(Price::from_u64(100)),
            Quantity::from_str("1.0").unwrap(),
            5,
            1708123456789000000,
        )
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut executor = MatchExecutor::new(10);
        let taker = taker();

        let first = executor.execute_trade(
            taker.symbol.clone(),
            &taker,
            OrderId::new(),
            UserId::new(),
            Price::from_u64(100),
            Quantity::from_str("0.5").unwrap(),
            1,
        );
        let second = executor.execute_trade(
            taker.symbol.clone(),
            &taker,
            OrderId::new(),
            UserId::new(),
            Price::from_u64(100),
            Quantity::from_str("0.5").unwrap(),
            2,
        );

        assert_eq!(first.sequence, 10);
        assert_eq!(second.sequence, 11);
    }

    #[test]
    fn test_trade_carries_taker_side_and_price() {
        let mut executor = MatchExecutor::new(1);
        let taker = taker();

        let trade = executor.execute_trade(
            taker.symbol.clone(),
            &taker,
            OrderId::new(),
            UserId::new(),
            Price::from_u64(99),
            Quantity::from_str("0.25").unwrap(),
            1,
        );

        assert_eq!(trade.taker_side, Side::Buy);
        assert_eq!(trade.taker_order_id, taker.id);
        assert_eq!(trade.price, Price::from_u64(99));
    }
}
