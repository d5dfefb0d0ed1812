//! Position tracking
//!
//! Folds the trade stream into signed net holdings per (user, symbol).
//! The buyer of a trade gains quantity at the trade price, the seller
//! loses it. How cost basis and realized PnL respond to a fill is a
//! strategy: weighted average is the default, FIFO lots the alternative.

use std::collections::{HashMap, VecDeque};

use rust_decimal::prelude::Signed;
use rust_decimal::Decimal;
use tracing::debug;

use tokex_types::ids::{Symbol, UserId};
use tokex_types::position::Position;
use tokex_types::trade::Trade;

/// Cost-basis strategy seam.
///
/// `apply` folds one signed fill (positive buy, negative sell) into the
/// position, updating net quantity, average entry price and realized
/// PnL. Implementations may keep per-position state keyed by
/// (user, symbol).
pub trait CostBasis: Send + Sync {
    fn apply(&mut self, position: &mut Position, signed_qty: Decimal, price: Decimal);
}

/// Quantity-weighted average entry price.
///
/// Increasing (or opening) a position re-averages the entry price;
/// reducing realizes PnL on the closed portion at the old average;
/// flipping through flat re-bases the remainder at the trade price.
#[derive(Debug, Default)]
pub struct WeightedAverage;

impl CostBasis for WeightedAverage {
    fn apply(&mut self, position: &mut Position, signed_qty: Decimal, price: Decimal) {
        let old_qty = position.net_qty;
        let new_qty = old_qty + signed_qty;

        if old_qty.is_zero() || old_qty.signum() == signed_qty.signum() {
            let old_abs = old_qty.abs();
            let add_abs = signed_qty.abs();
            position.avg_entry_price =
                (old_abs * position.avg_entry_price + add_abs * price) / (old_abs + add_abs);
            position.net_qty = new_qty;
            return;
        }

        let closed = old_qty.abs().min(signed_qty.abs());
        position.realized_pnl += closed * (price - position.avg_entry_price) * old_qty.signum();

        if new_qty.is_zero() {
            position.avg_entry_price = Decimal::ZERO;
        } else if new_qty.signum() != old_qty.signum() {
            // Flipped through flat: the remainder opened at this trade
            position.avg_entry_price = price;
        }
        position.net_qty = new_qty;
    }
}

#[derive(Debug, Clone, Copy)]
struct Lot {
    qty: Decimal, // always positive
    price: Decimal,
}

/// First-in-first-out lot matching.
///
/// Keeps open lots per position; a reducing fill consumes the oldest
/// lots first and realizes PnL lot by lot. The position's
/// `avg_entry_price` is kept as the lot-weighted average of what remains
/// open.
#[derive(Debug, Default)]
pub struct FifoLots {
    lots: HashMap<(UserId, Symbol), VecDeque<Lot>>,
}

impl FifoLots {
    fn recompute_average(position: &mut Position, lots: &VecDeque<Lot>) {
        let total: Decimal = lots.iter().map(|lot| lot.qty).sum();
        position.avg_entry_price = if total.is_zero() {
            Decimal::ZERO
        } else {
            lots.iter().map(|lot| lot.qty * lot.price).sum::<Decimal>() / total
        };
    }
}

impl CostBasis for FifoLots {
    fn apply(&mut self, position: &mut Position, signed_qty: Decimal, price: Decimal) {
        let key = (position.user_id, position.symbol.clone());
        let lots = self.lots.entry(key).or_default();
        let old_qty = position.net_qty;
        let direction = old_qty.signum();

        let mut incoming = signed_qty;
        if !old_qty.is_zero() && direction != signed_qty.signum() {
            // Reduce: consume oldest lots until the fill or the lots run out
            let mut to_close = signed_qty.abs();
            while to_close > Decimal::ZERO {
                let Some(front) = lots.front_mut() else { break };
                let closed = front.qty.min(to_close);
                position.realized_pnl += closed * (price - front.price) * direction;
                front.qty -= closed;
                to_close -= closed;
                if front.qty.is_zero() {
                    lots.pop_front();
                }
            }
            // Whatever could not be matched flips the position
            incoming = signed_qty.signum() * to_close;
        }

        if !incoming.is_zero() {
            lots.push_back(Lot {
                qty: incoming.abs(),
                price,
            });
        }

        position.net_qty = old_qty + signed_qty;
        Self::recompute_average(position, lots);
    }
}

/// All positions across users and symbols, behind one cost-basis
/// strategy
pub struct PositionTracker {
    positions: HashMap<(UserId, Symbol), Position>,
    basis: Box<dyn CostBasis>,
}

impl PositionTracker {
    pub fn new(basis: Box<dyn CostBasis>) -> Self {
        Self {
            positions: HashMap::new(),
            basis,
        }
    }

    pub fn weighted_average() -> Self {
        Self::new(Box::new(WeightedAverage))
    }

    /// Fold one committed trade into both sides' positions
    pub fn apply_trade(&mut self, trade: &Trade) {
        let qty = trade.quantity.as_decimal();
        let price = trade.price.as_decimal();

        self.apply_fill(trade.buyer(), &trade.symbol, qty, price, trade.executed_at);
        self.apply_fill(trade.seller(), &trade.symbol, -qty, price, trade.executed_at);
        debug!(trade = %trade.id, symbol = %trade.symbol, "positions updated");
    }

    fn apply_fill(
        &mut self,
        user_id: UserId,
        symbol: &Symbol,
        signed_qty: Decimal,
        price: Decimal,
        timestamp: i64,
    ) {
        let position = self
            .positions
            .entry((user_id, symbol.clone()))
            .or_insert_with(|| Position::new(user_id, symbol.clone(), timestamp));
        self.basis.apply(position, signed_qty, price);
        position.updated_at = timestamp;
    }

    pub fn get(&self, user_id: &UserId, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(&(*user_id, symbol.clone()))
    }

    /// All of a user's positions, flat ones included
    pub fn positions_for(&self, user_id: &UserId) -> Vec<Position> {
        let mut positions: Vec<Position> = self
            .positions
            .values()
            .filter(|position| &position.user_id == user_id)
            .cloned()
            .collect();
        positions.sort_by(|a, b| a.symbol.as_str().cmp(b.symbol.as_str()));
        positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
