//! Trade ledger
//!
//! Append-only, sequenced record of executed trades for one symbol. The
//! engine is the only writer; once appended, a trade is never reordered
//! or removed.

use tokex_types::errors::EngineError;
use tokex_types::ids::{Symbol, UserId};
use tokex_types::trade::Trade;

#[derive(Debug)]
pub struct TradeLedger {
    symbol: Symbol,
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            trades: Vec::new(),
        }
    }

    /// Append a trade; sequences must be strictly increasing and the
    /// symbol must match.
    pub fn append(&mut self, trade: Trade) -> Result<(), EngineError> {
        if trade.symbol != self.symbol {
            return Err(EngineError::invariant(format!(
                "trade for {} appended to {} ledger",
                trade.symbol, self.symbol
            )));
        }
        if let Some(last) = self.trades.last() {
            if trade.sequence <= last.sequence {
                return Err(EngineError::invariant(format!(
                    "trade sequence {} not after {}",
                    trade.sequence, last.sequence
                )));
            }
        }
        self.trades.push(trade);
        Ok(())
    }

    /// Most recent trades, newest first
    pub fn recent(&self, limit: usize) -> Vec<Trade> {
        self.trades.iter().rev().take(limit).cloned().collect()
    }

    /// Trades where the user was taker or maker, newest first, with
    /// offset/limit pagination
    pub fn by_user(&self, user_id: &UserId, limit: usize, offset: usize) -> Vec<Trade> {
        self.trades
            .iter()
            .rev()
            .filter(|trade| trade.involves(user_id))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<&Trade> {
        self.trades.last()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::ids::OrderId;
    use tokex_types::numeric::{Price, Quantity};
    use tokex_types::order::Side;

    fn symbol() -> Symbol {
        Symbol::try_new("AAPL/USD").unwrap()
    }

    fn trade(sequence: u64, taker: UserId, maker: UserId) -> Trade {
        Trade::new(
            sequence,
            symbol(),
            OrderId::new(),
            OrderId::new(),
            taker,
            maker,
            Side::Buy,
            Price::from_u64(100),
            Quantity::from_str("1.0").unwrap(),
            1708123456789000000 + sequence as i64,
        )
    }

    #[test]
    fn test_append_and_recent_ordering() {
        let mut ledger = TradeLedger::new(symbol());
        let user = UserId::new();
        for sequence in 1..=3 {
            ledger.append(trade(sequence, user, UserId::new())).unwrap();
        }

        let recent = ledger.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sequence, 3);
        assert_eq!(recent[1].sequence, 2);
    }

    #[test]
    fn test_sequence_must_increase() {
        let mut ledger = TradeLedger::new(symbol());
        ledger
            .append(trade(5, UserId::new(), UserId::new()))
            .unwrap();

        let err = ledger
            .append(trade(5, UserId::new(), UserId::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::Invariant { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_symbol_mismatch_rejected() {
        let mut ledger = TradeLedger::new(Symbol::try_new("TSLA/USD").unwrap());
        let err = ledger
            .append(trade(1, UserId::new(), UserId::new()))
            .unwrap_err();
        assert!(matches!(err, EngineError::Invariant { .. }));
    }

    #[test]
    fn test_by_user_filters_and_paginates() {
        let mut ledger = TradeLedger::new(symbol());
        let alice = UserId::new();
        let bob = UserId::new();

        ledger.append(trade(1, alice, bob)).unwrap();
        ledger.append(trade(2, bob, UserId::new())).unwrap();
        ledger.append(trade(3, UserId::new(), alice)).unwrap();
        ledger.append(trade(4, alice, UserId::new())).unwrap();

        let all = ledger.by_user(&alice, 10, 0);
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].sequence, 4);
        assert_eq!(all[2].sequence, 1);

        let page = ledger.by_user(&alice, 1, 1);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].sequence, 3);
    }
}
