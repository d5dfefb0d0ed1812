//! Per-symbol order book
//!
//! Two sorted sides plus an order-id location index, so cancel-by-id
//! never scans levels. The index maps each resting order to its side and
//! price; the FIFO position inside the level is found by id.

mod ask_book;
mod bid_book;
mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::{LevelEntry, PriceLevel};

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tokex_types::errors::EngineError;
use tokex_types::ids::{OrderId, Symbol};
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::{Order, Side};

/// One aggregated price level in a depth snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
}

/// Bounded top-of-book snapshot, safe to hand out to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    pub symbol: Symbol,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

/// The resting-order state for a single symbol
#[derive(Debug)]
pub struct SymbolBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// order id → (side, price) for O(1) location on cancel
    locations: HashMap<OrderId, (Side, Price)>,
}

impl SymbolBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            locations: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Rest an order's remainder in the book.
    ///
    /// The order must be priced; market orders never rest.
    pub fn insert(&mut self, order: &Order) -> Result<(), EngineError> {
        let price = order
            .price
            .ok_or_else(|| EngineError::invariant(format!("unpriced order {} rested", order.id)))?;
        let remaining = order.remaining();
        if remaining.is_zero() {
            return Err(EngineError::invariant(format!(
                "filled order {} rested",
                order.id
            )));
        }

        let entry = LevelEntry {
            order_id: order.id,
            user_id: order.user_id,
            sequence: order.sequence,
            remaining,
        };
        match order.side {
            Side::Buy => self.bids.insert(price, entry),
            Side::Sell => self.asks.insert(price, entry),
        }
        self.locations.insert(order.id, (order.side, price));
        Ok(())
    }

    /// Remove a resting order via the location index
    pub fn remove(&mut self, order_id: &OrderId) -> Option<LevelEntry> {
        let (side, price) = self.locations.remove(order_id)?;
        match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.locations.contains_key(order_id)
    }

    pub fn best_bid(&self) -> Option<(Price, Quantity)> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.asks.best()
    }

    /// bestBid < bestAsk must hold whenever both sides are non-empty
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best(), self.asks.best()) {
            (Some((bid, _)), Some((ask, _))) => bid >= ask,
            _ => false,
        }
    }

    /// Top-N levels per side; a bounded copy
    pub fn depth(&self, levels: usize) -> Depth {
        let to_levels = |pairs: Vec<(Price, Quantity)>| {
            pairs
                .into_iter()
                .map(|(price, quantity)| DepthLevel { price, quantity })
                .collect()
        };
        Depth {
            symbol: self.symbol.clone(),
            bids: to_levels(self.bids.depth_snapshot(levels)),
            asks: to_levels(self.asks.depth_snapshot(levels)),
        }
    }

    /// Levels the given taker side would match against, best-first
    pub fn opposite_levels<'a>(
        &'a self,
        taker_side: Side,
    ) -> Box<dyn Iterator<Item = (Price, &'a PriceLevel)> + 'a> {
        match taker_side {
            Side::Buy => Box::new(self.asks.levels_best_first()),
            Side::Sell => Box::new(self.bids.levels_best_first()),
        }
    }

    /// Apply a planned fill to a resting maker.
    ///
    /// Verifies the maker is still at the head of its level before
    /// touching anything; a mismatch means the plan and the book
    /// diverged, which is fatal.
    pub fn fill_resting(
        &mut self,
        maker_side: Side,
        price: Price,
        order_id: OrderId,
        quantity: Quantity,
    ) -> Result<(), EngineError> {
        let level = match maker_side {
            Side::Buy => self.bids.level_mut(price),
            Side::Sell => self.asks.level_mut(price),
        }
        .ok_or_else(|| EngineError::invariant(format!("fill at missing level {price}")))?;

        let front_id = level
            .front()
            .map(|entry| entry.order_id)
            .ok_or_else(|| EngineError::invariant(format!("fill at empty level {price}")))?;
        if front_id != order_id {
            return Err(EngineError::invariant(format!(
                "orphaned match: planned maker {order_id}, found {front_id}"
            )));
        }

        let exhausted = level.fill_front(quantity)?;
        if exhausted {
            self.locations.remove(&order_id);
            match maker_side {
                Side::Buy => self.bids.prune_empty(price),
                Side::Sell => self.asks.prune_empty(price),
            }
        }
        Ok(())
    }

    /// Shrink a resting order in place (priority-preserving modify)
    pub fn reduce_resting(
        &mut self,
        order_id: &OrderId,
        new_remaining: Quantity,
    ) -> Result<(), EngineError> {
        let (side, price) = *self
            .locations
            .get(order_id)
            .ok_or_else(|| EngineError::invariant(format!("reduce of unbooked order {order_id}")))?;
        let level = match side {
            Side::Buy => self.bids.level_mut(price),
            Side::Sell => self.asks.level_mut(price),
        }
        .ok_or_else(|| EngineError::invariant(format!("location index stale for {order_id}")))?;
        level.reduce(order_id, new_remaining)
    }

    pub fn bid_level_count(&self) -> usize {
        self.bids.level_count()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.level_count()
    }
}
