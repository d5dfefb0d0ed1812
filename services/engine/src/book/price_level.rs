//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price point. Entries
//! are kept in arrival order; since sequences are assigned monotonically
//! under the symbol lock, FIFO order is sequence order, which is the
//! sole tie-break at equal price.

use std::collections::VecDeque;
use tokex_types::errors::EngineError;
use tokex_types::ids::{OrderId, UserId};
use tokex_types::numeric::Quantity;

/// One resting order's footprint in the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub sequence: u64,
    pub remaining: Quantity,
}

/// FIFO queue of resting orders at a single price
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    entries: VecDeque<LevelEntry>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Append an entry at the back of the queue (lowest time priority)
    pub fn push_back(&mut self, entry: LevelEntry) {
        self.total_quantity = self.total_quantity + entry.remaining;
        self.entries.push_back(entry);
    }

    /// Remove an entry by order id regardless of queue position
    pub fn remove(&mut self, order_id: &OrderId) -> Option<LevelEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| &entry.order_id == order_id)?;
        let entry = self.entries.remove(position)?;
        self.total_quantity = self
            .total_quantity
            .checked_sub(entry.remaining)
            .unwrap_or(Quantity::zero());
        Some(entry)
    }

    /// The oldest entry (highest time priority)
    pub fn front(&self) -> Option<&LevelEntry> {
        self.entries.front()
    }

    /// Fill the front entry by `quantity`.
    ///
    /// Returns true if the entry was exhausted and removed. Fails with an
    /// invariant error if the level is empty or the fill exceeds the
    /// front's remaining quantity.
    pub fn fill_front(&mut self, quantity: Quantity) -> Result<bool, EngineError> {
        let front = self
            .entries
            .front_mut()
            .ok_or_else(|| EngineError::invariant("fill against empty price level"))?;

        let new_remaining = front.remaining.checked_sub(quantity).ok_or_else(|| {
            EngineError::invariant(format!(
                "fill of {} exceeds resting remaining {} on order {}",
                quantity, front.remaining, front.order_id
            ))
        })?;

        self.total_quantity = self
            .total_quantity
            .checked_sub(quantity)
            .unwrap_or(Quantity::zero());

        if new_remaining.is_zero() {
            self.entries.pop_front();
            Ok(true)
        } else {
            front.remaining = new_remaining;
            Ok(false)
        }
    }

    /// Shrink an entry in place, keeping its queue position.
    ///
    /// Used by the priority-preserving modify policy.
    pub fn reduce(
        &mut self,
        order_id: &OrderId,
        new_remaining: Quantity,
    ) -> Result<(), EngineError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| &entry.order_id == order_id)
            .ok_or_else(|| EngineError::invariant(format!("reduce of absent order {order_id}")))?;

        let delta = entry.remaining.checked_sub(new_remaining).ok_or_else(|| {
            EngineError::invariant(format!(
                "reduce would grow order {} from {} to {}",
                order_id, entry.remaining, new_remaining
            ))
        })?;

        entry.remaining = new_remaining;
        self.total_quantity = self
            .total_quantity
            .checked_sub(delta)
            .unwrap_or(Quantity::zero());
        Ok(())
    }

    /// Entries oldest-first
    pub fn iter(&self) -> impl Iterator<Item = &LevelEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.entries.len()
    }
}
