//! Matching engine core
//!
//! Turns one incoming order into zero or more trades plus a final order
//! state, in two phases:
//!
//! 1. *Plan*: walk the opposite side of the book read-only, collecting
//!    fills oldest-first at each crossing level.
//! 2. *Commit*: apply the plan — fill makers, append trades, fill the
//!    taker, then rest or discard the remainder.
//!
//! The plan is computed from the same book state the commit runs
//! against (the caller holds the symbol's writer lock) and is verified
//! against the order store and the taker before anything mutates;
//! ledger appends are buffered until every fill has applied. A failed
//! check aborts the whole operation with an invariant error and no
//! visible mutation.

use tracing::error;

use tokex_types::errors::EngineError;
use tokex_types::ids::{OrderId, UserId};
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::{CancelReason, Order, OrderType, RejectReason};
use tokex_types::trade::Trade;

use crate::book::SymbolBook;
use crate::ledger::TradeLedger;
use crate::lifecycle::OrderStore;
use crate::matching::{crossing, MatchExecutor};

/// One fill the planning pass decided on
#[derive(Debug, Clone, PartialEq)]
struct PlannedFill {
    maker_order_id: OrderId,
    maker_user_id: UserId,
    price: Price,
    quantity: Quantity,
}

pub struct MatchingEngine {
    executor: MatchExecutor,
}

impl MatchingEngine {
    pub fn new(starting_trade_sequence: u64) -> Self {
        Self {
            executor: MatchExecutor::new(starting_trade_sequence),
        }
    }

    /// Match `taker` against the book, mutating the book, the maker
    /// orders in `orders`, the ledger and the taker itself.
    ///
    /// On success the taker has its final status: `Filled`, resting
    /// `Open`/`PartiallyFilled` (limit remainder), or terminal
    /// `Cancelled`/`Rejected` (market remainder — market orders never
    /// rest).
    pub fn execute(
        &mut self,
        book: &mut SymbolBook,
        orders: &mut OrderStore,
        ledger: &mut TradeLedger,
        taker: &mut Order,
        timestamp: i64,
    ) -> Result<Vec<Trade>, EngineError> {
        let plan = Self::plan(book, taker)?;

        let trades = self.commit(book, orders, ledger, taker, plan, timestamp)?;

        if !taker.is_filled() {
            match taker.order_type {
                OrderType::Limit => book.insert(taker)?,
                OrderType::Market => {
                    if trades.is_empty() {
                        taker.reject(RejectReason::NoLiquidity, timestamp);
                    } else {
                        taker.cancel(CancelReason::UnfilledMarketRemainder, timestamp)?;
                    }
                }
            }
        }

        if book.is_crossed() {
            error!(symbol = %book.symbol(), taker = %taker.id, "book crossed after match");
            return Err(EngineError::invariant("book crossed after match"));
        }

        Ok(trades)
    }

    /// Read-only pass deciding which makers fill and by how much
    fn plan(book: &SymbolBook, taker: &Order) -> Result<Vec<PlannedFill>, EngineError> {
        let mut remaining = taker.remaining();
        let mut fills = Vec::new();

        'levels: for (level_price, level) in book.opposite_levels(taker.side) {
            if remaining.is_zero() || !crossing::crosses(taker.side, taker.price, level_price) {
                break;
            }
            for entry in level.iter() {
                if remaining.is_zero() {
                    break 'levels;
                }
                if entry.user_id == taker.user_id {
                    return Err(EngineError::SelfTrade {
                        order_id: entry.order_id.to_string(),
                    });
                }
                let quantity = remaining.min(entry.remaining);
                fills.push(PlannedFill {
                    maker_order_id: entry.order_id,
                    maker_user_id: entry.user_id,
                    price: level_price,
                    quantity,
                });
                remaining = remaining
                    .checked_sub(quantity)
                    .ok_or_else(|| EngineError::invariant("planned fill exceeds taker remaining"))?;
            }
        }

        Ok(fills)
    }

    fn commit(
        &mut self,
        book: &mut SymbolBook,
        orders: &mut OrderStore,
        ledger: &mut TradeLedger,
        taker: &mut Order,
        plan: Vec<PlannedFill>,
        timestamp: i64,
    ) -> Result<Vec<Trade>, EngineError> {
        Self::verify_plan(orders, taker, &plan)?;

        let mut trades = Vec::with_capacity(plan.len());
        for fill in plan {
            book.fill_resting(
                taker.side.opposite(),
                fill.price,
                fill.maker_order_id,
                fill.quantity,
            )?;

            let maker = orders.get_mut(&fill.maker_order_id).ok_or_else(|| {
                EngineError::invariant(format!(
                    "orphaned match: maker {} not in order store",
                    fill.maker_order_id
                ))
            })?;
            maker.fill(fill.quantity, timestamp)?;
            taker.fill(fill.quantity, timestamp)?;

            trades.push(self.executor.execute_trade(
                book.symbol().clone(),
                taker,
                fill.maker_order_id,
                fill.maker_user_id,
                fill.price,
                fill.quantity,
                timestamp,
            ));
        }

        // Sequences come from the executor's monotonic counter and the
        // symbol is the book's own, so these appends cannot fail once
        // the fills are applied
        for trade in &trades {
            ledger.append(trade.clone())?;
        }

        Ok(trades)
    }

    /// Check the whole plan against the order store and the taker
    /// before any mutation, so the apply loop cannot fail halfway
    /// through.
    fn verify_plan(
        orders: &OrderStore,
        taker: &Order,
        plan: &[PlannedFill],
    ) -> Result<(), EngineError> {
        let mut total = Quantity::zero();
        for fill in plan {
            let maker = orders.get(&fill.maker_order_id).ok_or_else(|| {
                EngineError::invariant(format!(
                    "orphaned match: maker {} not in order store",
                    fill.maker_order_id
                ))
            })?;
            if maker.status.is_terminal() {
                return Err(EngineError::invariant(format!(
                    "planned maker {} is terminal",
                    maker.id
                )));
            }
            if maker.remaining().checked_sub(fill.quantity).is_none() {
                return Err(EngineError::invariant(format!(
                    "planned fill exceeds remaining on maker {}",
                    maker.id
                )));
            }
            total = total + fill.quantity;
        }
        if taker.remaining().checked_sub(total).is_none() {
            return Err(EngineError::invariant("planned fills exceed taker remaining"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::ids::{Symbol, UserId};
    use tokex_types::order::{OrderStatus, Side};

    fn symbol() -> Symbol {
        Symbol::try_new("AAPL/USD").unwrap()
    }

    fn limit(side: Side, price: u64, qty: &str, sequence: u64) -> Order {
        Order::new(
            UserId::new(),
            symbol(),
            side,
            OrderType::Limit,
            Some(Price::from_u64(price)),
            Quantity::from_str(qty).unwrap(),
            sequence,
            0,
        )
    }

    #[test]
    fn test_store_mismatch_aborts_without_mutation() {
        let mut book = SymbolBook::new(symbol());
        let mut orders = OrderStore::new();
        let mut ledger = TradeLedger::new(symbol());
        let mut engine = MatchingEngine::new(1);

        let first = limit(Side::Sell, 100, "1", 1);
        let second = limit(Side::Sell, 101, "1", 2);
        book.insert(&first).unwrap();
        book.insert(&second).unwrap();
        orders.insert(first.clone());
        // second never made it into the store

        let mut taker = limit(Side::Buy, 101, "2", 3);
        let err = engine
            .execute(&mut book, &mut orders, &mut ledger, &mut taker, 10)
            .unwrap_err();

        assert!(matches!(err, EngineError::Invariant { .. }));
        // Nothing was applied: no trades, no fills, both makers resting
        assert!(ledger.is_empty());
        assert!(!taker.has_fills());
        assert_eq!(taker.status, OrderStatus::Open);
        assert!(book.contains(&first.id));
        assert!(book.contains(&second.id));
        assert!(!orders.get(&first.id).unwrap().has_fills());
    }

    #[test]
    fn test_terminal_maker_aborts_without_mutation() {
        let mut book = SymbolBook::new(symbol());
        let mut orders = OrderStore::new();
        let mut ledger = TradeLedger::new(symbol());
        let mut engine = MatchingEngine::new(1);

        let mut maker = limit(Side::Sell, 100, "1", 1);
        book.insert(&maker).unwrap();
        maker
            .cancel(CancelReason::UserRequested, 5)
            .unwrap();
        orders.insert(maker.clone());

        let mut taker = limit(Side::Buy, 100, "1", 2);
        let err = engine
            .execute(&mut book, &mut orders, &mut ledger, &mut taker, 10)
            .unwrap_err();

        assert!(matches!(err, EngineError::Invariant { .. }));
        assert!(ledger.is_empty());
        assert!(!taker.has_fills());
        assert!(book.contains(&maker.id));
    }
}
