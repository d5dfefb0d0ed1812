//! OHLCV candle aggregation
//!
//! Builds rolling OHLCV buckets from the trade stream, one builder per
//! (symbol, interval). Bucket boundaries are aligned to the epoch, so a
//! 1m candle always opens on a minute boundary. The current bucket is
//! mutable; a bucket seals when a trade lands in a later bucket or on an
//! explicit flush, and sealed candles are never touched again.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tokex_types::ids::Symbol;
use tokex_types::numeric::{Price, Quantity};
use tokex_types::trade::Trade;

/// Supported candle intervals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown interval: {0}")]
pub struct ParseIntervalError(String);

impl Interval {
    pub fn duration_nanos(&self) -> i64 {
        match self {
            Interval::M1 => 60 * 1_000_000_000,
            Interval::M5 => 5 * 60 * 1_000_000_000,
            Interval::M15 => 15 * 60 * 1_000_000_000,
            Interval::H1 => 3600 * 1_000_000_000,
            Interval::H4 => 4 * 3600 * 1_000_000_000,
            Interval::D1 => 86_400 * 1_000_000_000_i64,
        }
    }

    /// Floor a timestamp to this interval's bucket start
    pub fn bucket_start(&self, timestamp_nanos: i64) -> i64 {
        let duration = self.duration_nanos();
        (timestamp_nanos / duration) * duration
    }

    pub fn all() -> &'static [Interval] {
        &[
            Interval::M1,
            Interval::M5,
            Interval::M15,
            Interval::H1,
            Interval::H4,
            Interval::D1,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
        }
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::M1),
            "5m" => Ok(Interval::M5),
            "15m" => Ok(Interval::M15),
            "1h" => Ok(Interval::H1),
            "4h" => Ok(Interval::H4),
            "1d" => Ok(Interval::D1),
            other => Err(ParseIntervalError(other.to_string())),
        }
    }
}

/// One OHLCV bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: Symbol,
    pub interval: Interval,
    pub bucket_start: i64,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Quantity,
    pub trade_count: u64,
}

impl Candle {
    fn open_with(symbol: Symbol, interval: Interval, bucket_start: i64, trade: &Trade) -> Self {
        Self {
            symbol,
            interval,
            bucket_start,
            open: trade.price,
            high: trade.price,
            low: trade.price,
            close: trade.price,
            volume: trade.quantity,
            trade_count: 1,
        }
    }

    fn update(&mut self, trade: &Trade) {
        if trade.price > self.high {
            self.high = trade.price;
        }
        if trade.price < self.low {
            self.low = trade.price;
        }
        self.close = trade.price;
        self.volume = self.volume + trade.quantity;
        self.trade_count += 1;
    }

    /// high ≥ {open, low, close} and low ≤ {open, close}
    pub fn is_well_formed(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
            && self.volume.as_decimal() >= Decimal::ZERO
    }
}

/// Candle builder for one (symbol, interval)
pub struct CandleBuilder {
    symbol: Symbol,
    interval: Interval,
    current: Option<Candle>,
    /// Sealed buckets by bucket_start, oldest first
    sealed: BTreeMap<i64, Candle>,
    max_history: usize,
}

impl CandleBuilder {
    pub fn new(symbol: Symbol, interval: Interval, max_history: usize) -> Self {
        Self {
            symbol,
            interval,
            current: None,
            sealed: BTreeMap::new(),
            max_history,
        }
    }

    /// Fold one trade into the current bucket, sealing it first if the
    /// trade belongs to a later bucket.
    pub fn record_trade(&mut self, trade: &Trade) {
        let bucket = self.interval.bucket_start(trade.executed_at);

        if let Some(current) = &self.current {
            if bucket > current.bucket_start {
                self.flush();
            }
        }

        match &mut self.current {
            Some(current) => current.update(trade),
            None => {
                self.current = Some(Candle::open_with(
                    self.symbol.clone(),
                    self.interval,
                    bucket,
                    trade,
                ));
            }
        }
    }

    /// Seal the current bucket, if any
    pub fn flush(&mut self) -> Option<Candle> {
        let candle = self.current.take()?;
        self.sealed.insert(candle.bucket_start, candle.clone());
        while self.sealed.len() > self.max_history {
            self.sealed.pop_first();
        }
        Some(candle)
    }

    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    /// Most recent `limit` sealed candles plus the current open bucket,
    /// oldest first.
    pub fn ohlcv(&self, limit: usize) -> Vec<Candle> {
        let mut candles: Vec<Candle> = self
            .sealed
            .values()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        candles.reverse();
        candles.extend(self.current.iter().cloned());
        candles
    }

    pub fn sealed_count(&self) -> usize {
        self.sealed.len()
    }
}

/// All interval builders for one symbol
pub struct SymbolCandles {
    symbol: Symbol,
    builders: BTreeMap<Interval, CandleBuilder>,
}

impl SymbolCandles {
    pub fn new(symbol: Symbol, intervals: &[Interval], max_history: usize) -> Self {
        let builders = intervals
            .iter()
            .map(|&interval| {
                (
                    interval,
                    CandleBuilder::new(symbol.clone(), interval, max_history),
                )
            })
            .collect();
        Self { symbol, builders }
    }

    pub fn record_trade(&mut self, trade: &Trade) {
        for builder in self.builders.values_mut() {
            builder.record_trade(trade);
        }
    }

    /// OHLCV series for one interval; empty if the interval is not
    /// configured.
    pub fn ohlcv(&self, interval: Interval, limit: usize) -> Vec<Candle> {
        self.builders
            .get(&interval)
            .map(|builder| builder.ohlcv(limit))
            .unwrap_or_default()
    }

    pub fn current(&self, interval: Interval) -> Option<&Candle> {
        self.builders
            .get(&interval)
            .and_then(|builder| builder.current())
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}
