//! Read models derived from the trade stream.
//!
//! Two independent derivations, both fed one trade at a time after the
//! engine commits it:
//!
//! - [`candles`]: rolling OHLCV buckets per (symbol, interval),
//! - [`positions`]: signed net holdings with cost basis and realized PnL
//!   per (user, symbol).
//!
//! Neither feeds back into matching; losing and rebuilding them from the
//! ledger is always safe.

pub mod candles;
pub mod positions;

pub use candles::{Candle, CandleBuilder, Interval, SymbolCandles};
pub use positions::{CostBasis, FifoLots, PositionTracker, WeightedAverage};
