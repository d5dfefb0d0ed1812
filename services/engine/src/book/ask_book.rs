//! Ask (sell-side) book
//!
//! Sell orders keyed by price in a BTreeMap; the best ask is the lowest
//! key. Mirror of the bid book with inverted price priority.

use std::collections::BTreeMap;
use tokex_types::ids::OrderId;
use tokex_types::numeric::{Price, Quantity};

use super::price_level::{LevelEntry, PriceLevel};

#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
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

    /// Best ask: lowest price with its aggregate quantity
    pub fn best(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
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

    /// Levels best-first (lowest price first)
    pub fn levels_best_first(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(price, level)| (*price, level))
    }

    /// Top N price levels with aggregate quantities, best first
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
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
    fn test_best_is_lowest_price() {
        let mut book = AskBook::new();
        book.insert(Price::from_u64(100), entry(1, "1.0"));
        book.insert(Price::from_u64(102), entry(2, "2.0"));
        book.insert(Price::from_u64(101), entry(3, "1.5"));

        let (best_price, _) = book.best().unwrap();
        assert_eq!(best_price, Price::from_u64(100));
    }

    #[test]
    fn test_depth_snapshot_best_first() {
        let mut book = AskBook::new();
        book.insert(Price::from_u64(102), entry(1, "1.0"));
        book.insert(Price::from_u64(100), entry(2, "2.0"));
        book.insert(Price::from_u64(101), entry(3, "1.5"));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth[0].0, Price::from_u64(100));
        assert_eq!(depth[1].0, Price::from_u64(101));
    }

    #[test]
    fn test_levels_best_first_ascending() {
        let mut book = AskBook::new();
        book.insert(Price::from_u64(105), entry(1, "1.0"));
        book.insert(Price::from_u64(101), entry(2, "1.0"));

        let prices: Vec<Price> = book.levels_best_first().map(|(p, _)| p).collect();
        assert_eq!(prices, vec![Price::from_u64(101), Price::from_u64(105)]);
    }
}
