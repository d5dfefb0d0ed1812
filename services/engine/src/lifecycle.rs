//! Order lifecycle management
//!
//! One `OrderLifecycle` per symbol: validates intents, assigns
//! acceptance sequences, owns the order store, and drives the matching
//! engine, the book and the trade ledger through place / cancel /
//! modify / query operations. The caller serializes access per symbol;
//! everything here assumes it is the only writer.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use tokex_types::errors::{EngineError, ValidationError};
use tokex_types::ids::{OrderId, Symbol, UserId};
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::{CancelReason, Order, OrderType, RejectReason, Side};
use tokex_types::trade::Trade;

use crate::book::{Depth, SymbolBook};
use crate::engine::MatchingEngine;
use crate::ledger::TradeLedger;

/// A request to place an order, before identity and sequence are
/// assigned
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<Price>,
    pub quantity: Quantity,
}

/// Funds-reservation failure from the external wallet collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundsError {
    #[error("funds unavailable: {0}")]
    Unavailable(String),
}

/// External funds collaborator seam.
///
/// `reserve` must approve an intent before it is accepted into the
/// book; `settle` is invoked once per executed trade after the commit.
/// Neither is ever called inside the matching loop.
pub trait FundsGate: Send + Sync {
    fn reserve(&self, _intent: &OrderIntent) -> Result<(), FundsError> {
        Ok(())
    }

    fn settle(&self, _trade: &Trade) {}
}

/// Default gate: custody is out of scope, everything is approved
pub struct NoopFundsGate;

impl FundsGate for NoopFundsGate {}

/// What a modify does to time priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifyPolicy {
    /// Any change cancels and reinserts with a fresh sequence — always
    /// loses time priority
    #[default]
    CancelReinsert,
    /// A pure quantity decrease shrinks the resting order in place and
    /// keeps its queue position; everything else cancels and reinserts
    PreservePriorityOnDecrease,
}

/// All orders ever seen by this symbol, keyed by id
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: HashMap<OrderId, Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
        }
    }

    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.id, order);
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn get_mut(&mut self, order_id: &OrderId) -> Option<&mut Order> {
        self.orders.get_mut(order_id)
    }

    pub fn values(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Result of a place or modify
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOutcome {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Filter for cancel-all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelFilter {
    pub side: Option<Side>,
}

pub struct OrderLifecycle {
    symbol: Symbol,
    book: SymbolBook,
    orders: OrderStore,
    ledger: TradeLedger,
    engine: MatchingEngine,
    funds: Arc<dyn FundsGate>,
    modify_policy: ModifyPolicy,
    next_sequence: u64,
}

impl OrderLifecycle {
    pub fn new(symbol: Symbol, funds: Arc<dyn FundsGate>, modify_policy: ModifyPolicy) -> Self {
        Self {
            book: SymbolBook::new(symbol.clone()),
            orders: OrderStore::new(),
            ledger: TradeLedger::new(symbol.clone()),
            engine: MatchingEngine::new(1),
            funds,
            modify_policy,
            next_sequence: 1,
            symbol,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn validate(&self, intent: &OrderIntent) -> Result<(), ValidationError> {
        if intent.symbol != self.symbol {
            return Err(ValidationError::UnknownSymbol(intent.symbol.to_string()));
        }
        if intent.quantity.is_zero() {
            return Err(ValidationError::NonPositiveQuantity);
        }
        match (intent.order_type, intent.price) {
            (OrderType::Limit, None) => Err(ValidationError::MissingPrice),
            (OrderType::Market, Some(_)) => Err(ValidationError::UnexpectedPrice),
            _ => Ok(()),
        }
    }

    /// Place an order: validate, reserve funds, match, rest or discard
    /// the remainder.
    ///
    /// Validation failures are returned as errors before any order
    /// record exists; funds and self-trade rejections produce a stored
    /// order in `Rejected` state with no book mutation.
    pub fn place(&mut self, intent: OrderIntent, timestamp: i64) -> Result<PlaceOutcome, EngineError> {
        self.validate(&intent)?;

        let sequence = self.next_sequence();
        let mut order = Order::new(
            intent.user_id,
            intent.symbol.clone(),
            intent.side,
            intent.order_type,
            intent.price,
            intent.quantity,
            sequence,
            timestamp,
        );

        if let Err(err) = self.funds.reserve(&intent) {
            debug!(order = %order.id, %err, "funds reservation declined");
            order.reject(RejectReason::FundsUnavailable, timestamp);
            self.orders.insert(order.clone());
            return Ok(PlaceOutcome {
                order,
                trades: Vec::new(),
            });
        }

        let trades = match self.engine.execute(
            &mut self.book,
            &mut self.orders,
            &mut self.ledger,
            &mut order,
            timestamp,
        ) {
            Ok(trades) => trades,
            Err(EngineError::SelfTrade { .. }) => {
                // Detected during planning: nothing was mutated
                order.reject(RejectReason::SelfTrade, timestamp);
                self.orders.insert(order.clone());
                return Ok(PlaceOutcome {
                    order,
                    trades: Vec::new(),
                });
            }
            Err(err) => {
                error!(symbol = %self.symbol, order = %order.id, %err, "matching aborted");
                return Err(err);
            }
        };

        for trade in &trades {
            self.funds.settle(trade);
        }

        info!(
            symbol = %self.symbol,
            order = %order.id,
            status = %order.status,
            trades = trades.len(),
            "order placed"
        );
        self.orders.insert(order.clone());
        Ok(PlaceOutcome { order, trades })
    }

    /// Cancel a caller-owned, non-terminal order. O(1) book removal via
    /// the location index.
    pub fn cancel(
        &mut self,
        order_id: &OrderId,
        caller: &UserId,
        reason: CancelReason,
        timestamp: i64,
    ) -> Result<Order, EngineError> {
        let order = self.owned_order(order_id, caller)?;
        if order.status.is_terminal() {
            return Err(EngineError::AlreadyTerminal {
                status: order.status.to_string(),
            });
        }

        if self.book.remove(order_id).is_none() {
            error!(symbol = %self.symbol, order = %order_id, "open order missing from book");
            return Err(EngineError::invariant(format!(
                "open order {order_id} missing from book"
            )));
        }

        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| EngineError::invariant(format!("order {order_id} vanished")))?;
        order.cancel(reason, timestamp)?;
        info!(symbol = %self.symbol, order = %order_id, "order cancelled");
        Ok(order.clone())
    }

    /// Cancel every non-terminal order of the caller matching the
    /// filter; returns the cancelled orders. Fails fast if a cancel
    /// hits an internal inconsistency.
    pub fn cancel_all(
        &mut self,
        caller: &UserId,
        filter: CancelFilter,
        timestamp: i64,
    ) -> Result<Vec<Order>, EngineError> {
        let targets: Vec<OrderId> = self
            .orders
            .values()
            .filter(|order| {
                &order.user_id == caller
                    && !order.status.is_terminal()
                    && filter.side.is_none_or(|side| order.side == side)
            })
            .map(|order| order.id)
            .collect();

        let mut cancelled = Vec::with_capacity(targets.len());
        for order_id in targets {
            cancelled.push(self.cancel(&order_id, caller, CancelReason::UserRequested, timestamp)?);
        }
        Ok(cancelled)
    }

    /// Modify price and/or quantity of a caller-owned open order.
    ///
    /// Under `CancelReinsert` (and for any price change) the old order
    /// is cancelled as `Replaced` and a new order with a fresh sequence
    /// is placed — it loses time priority and may immediately match.
    /// Under `PreservePriorityOnDecrease` a pure quantity decrease
    /// shrinks the resting order in place.
    pub fn modify(
        &mut self,
        order_id: &OrderId,
        caller: &UserId,
        new_price: Option<Price>,
        new_quantity: Option<Quantity>,
        timestamp: i64,
    ) -> Result<PlaceOutcome, EngineError> {
        let order = self.owned_order(order_id, caller)?.clone();
        if order.status.is_terminal() {
            return Err(EngineError::AlreadyTerminal {
                status: order.status.to_string(),
            });
        }

        let target_price = new_price.or(order.price);
        let target_quantity = new_quantity.unwrap_or(order.quantity);
        if target_quantity.is_zero() {
            return Err(ValidationError::NonPositiveQuantity.into());
        }

        let price_changed = target_price != order.price;
        let decrease_only = !price_changed && target_quantity < order.quantity;
        let new_remaining = target_quantity.checked_sub(order.filled_quantity);

        if self.modify_policy == ModifyPolicy::PreservePriorityOnDecrease && decrease_only {
            // In-place shrink, but only while something would remain
            // resting; otherwise fall through to cancel-and-reinsert
            // semantics below.
            if let Some(remaining) = new_remaining.filter(|r| !r.is_zero()) {
                self.book.reduce_resting(order_id, remaining)?;
                let order = self
                    .orders
                    .get_mut(order_id)
                    .ok_or_else(|| EngineError::invariant(format!("order {order_id} vanished")))?;
                order.quantity = target_quantity;
                order.updated_at = timestamp;
                return Ok(PlaceOutcome {
                    order: order.clone(),
                    trades: Vec::new(),
                });
            }
        }

        self.cancel(order_id, caller, CancelReason::Replaced, timestamp)?;
        self.place(
            OrderIntent {
                user_id: order.user_id,
                symbol: order.symbol.clone(),
                side: order.side,
                order_type: order.order_type,
                price: target_price,
                quantity: target_quantity,
            },
            timestamp,
        )
    }

    fn owned_order(&self, order_id: &OrderId, caller: &UserId) -> Result<&Order, EngineError> {
        // Unknown id and someone else's order are indistinguishable to
        // the caller
        self.orders
            .get(order_id)
            .filter(|order| &order.user_id == caller)
            .ok_or_else(|| EngineError::OrderNotFound {
                order_id: order_id.to_string(),
            })
    }

    // ---- read side ----

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// A user's orders, newest first; optionally only non-terminal ones
    pub fn orders_for_user(&self, user_id: &UserId, open_only: bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|order| &order.user_id == user_id)
            .filter(|order| !open_only || !order.status.is_terminal())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        orders
    }

    pub fn open_order_count(&self) -> usize {
        self.orders
            .values()
            .filter(|order| !order.status.is_terminal())
            .count()
    }

    pub fn depth(&self, levels: usize) -> Depth {
        self.book.depth(levels)
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.book.best_ask()
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn book(&self) -> &SymbolBook {
        &self.book
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}
