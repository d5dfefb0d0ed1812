//! Bid (buy-side) book
//!
//! Buy orders keyed by price in a BTreeMap; the best bid is the highest
//! key. BTreeMap keeps iteration deterministic and best-price
//! maintenance O(log n).

use std::collections::BTreeMap;
use tokex_types::ids::OrderId;
use tokex_types::numeric::{Price, Quantity};

use super::price_level::{LevelEntry, PriceLevel};

#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, price: Price, entry: LevelEntry) {
        self.levels.entry(price).or_default().push_back(entry);
    }

    /// Remove a specific order; empty levels are pruned
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<LevelEntry> {
        let level = self.levels.get_mut(&price)?;
        let entry = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(entry)
    }

    /// Best bid: highest price with its aggregate quantity
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next_back()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    pub fn level_mut(&mut self, price: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Drop a level if a fill emptied it
    pub fn prune_empty(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(|l| l.is_empty()) {
            self.levels.remove(&price);
        }
    }

    /// Levels best-first (highest price first)
    pub fn levels_best_first(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().rev().map(|(price, level)| (*price, level))
    }

    /// Top N price levels with aggregate quantities, best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokex_types::ids::UserId;

    fn entry(sequence: u64, qty: &str) -> LevelEntry {
        LevelEntry {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            sequence,
            remaining: Quantity::from_str(qty).unwrap(),
        }
    }

    #[test]
    fn test_best_is_highest_price() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), entry(1, "1.0"));
        book.insert(Price::from_u64(102), entry(2, "2.0"));
        book.insert(Price::from_u64(99), entry(3, "1.5"));

        let (best_price, best_qty) = book.best().unwrap();
        assert_eq!(best_price, Price::from_u64(102));
        assert_eq!(best_qty, Quantity::from_str("2.0").unwrap());
    }

    #[test]
    fn test_depth_snapshot_best_first() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), entry(1, "1.0"));
        book.insert(Price::from_u64(102), entry(2, "2.0"));
        book.insert(Price::from_u64(99), entry(3, "1.5"));
        book.insert(Price::from_u64(101), entry(4, "0.5"));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0, Price::from_u64(102));
        assert_eq!(depth[1].0, Price::from_u64(101));
    }

    #[test]
    fn test_remove_prunes_empty_level() {
        let mut book = BidBook::new();
        let e = entry(1, "1.0");
        let id = e.order_id;
        book.insert(Price::from_u64(100), e);

        assert!(book.remove(&id, Price::from_u64(100)).is_some());
        assert!(book.is_empty());
    }

    #[test]
    fn test_same_price_aggregates() {
        let mut book = BidBook::new();
        book.insert(Price::from_u64(100), entry(1, "1.0"));
        book.insert(Price::from_u64(100), entry(2, "2.0"));

        assert_eq!(book.level_count(), 1);
        let (_, qty) = book.best().unwrap();
        assert_eq!(qty, Quantity::from_str("3.0").unwrap());
    }
}
