//! Wire models for the REST surface.
//!
//! Domain types from `tokex-types` serialize directly; what lives here
//! is the request shapes and the read-model views that aggregate more
//! than one domain type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tokex_engine::lifecycle::PlaceOutcome;
use tokex_types::ids::Symbol;
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::{CancelReason, Order, OrderType, Side};
use tokex_types::trade::Trade;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Required for limit orders, forbidden for market orders
    #[serde(default)]
    pub price: Option<Decimal>,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ModifyOrderRequest {
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelQuery {
    #[serde(default)]
    pub reason: Option<CancelReason>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CancelAllQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<Side>,
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    20
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Deserialize)]
pub struct MyTradesQuery {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub struct OhlcvQuery {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

fn default_interval() -> String {
    "1m".to_string()
}

/// Response for place and modify: the final order plus any trades it
/// produced
#[derive(Debug, Serialize)]
pub struct OrderOutcomeView {
    pub order: Order,
    pub trades: Vec<Trade>,
}

impl From<PlaceOutcome> for OrderOutcomeView {
    fn from(outcome: PlaceOutcome) -> Self {
        Self {
            order: outcome.order,
            trades: outcome.trades,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelAllView {
    pub cancelled: Vec<Order>,
}

/// Ticker: top of book plus current-day aggregates
#[derive(Debug, Serialize)]
pub struct TickerView {
    pub symbol: Symbol,
    pub last_price: Option<Price>,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub day_open: Option<Price>,
    pub day_high: Option<Price>,
    pub day_low: Option<Price>,
    pub day_volume: Quantity,
    pub day_trades: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub symbol: Symbol,
    pub open_orders: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
    pub trades: usize,
}

#[derive(Debug, Serialize)]
pub struct PairsView {
    pub pairs: Vec<Symbol>,
}
