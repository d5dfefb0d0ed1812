//! Matching core for the tokenized-asset exchange.
//!
//! One `OrderLifecycle` per symbol owns the book, the order store, the
//! matching loop and the trade ledger. All mutation for a symbol flows
//! through it, so the caller only has to serialize access per symbol to
//! get the ordering invariants:
//!
//! - the book never crosses,
//! - fills never exceed an order's quantity,
//! - sequence numbers strictly increase and are the sole tie-break at
//!   equal price,
//! - every trade references a live maker and taker.

pub mod book;
pub mod engine;
pub mod ledger;
pub mod lifecycle;
pub mod matching;

pub use book::{Depth, DepthLevel, SymbolBook};
pub use engine::MatchingEngine;
pub use ledger::TradeLedger;
pub use lifecycle::{
    CancelFilter, FundsError, FundsGate, ModifyPolicy, NoopFundsGate, OrderIntent,
    OrderLifecycle, PlaceOutcome,
};
