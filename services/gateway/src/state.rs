//! Exchange state behind the REST surface.
//!
//! One `Market` per configured symbol, each behind its own mutex, held
//! in a `DashMap` so distinct symbols trade in parallel while all
//! mutation for one symbol is serialized. Positions are a cross-symbol
//! read model behind a separate lock, updated after the symbol commit.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use tokex_engine::book::Depth;
use tokex_engine::lifecycle::{
    CancelFilter, ModifyPolicy, NoopFundsGate, OrderIntent, OrderLifecycle, PlaceOutcome,
};
use rust_decimal::Decimal;
use tokex_market_data::candles::{Candle, Interval, SymbolCandles};
use tokex_market_data::positions::PositionTracker;
use tokex_types::errors::{EngineError, ValidationError};
use tokex_types::ids::{OrderId, Symbol, UserId};
use tokex_types::numeric::{Price, Quantity};
use tokex_types::order::{CancelReason, Order, Side};
use tokex_types::position::Position;
use tokex_types::time::now_nanos;
use tokex_types::trade::Trade;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{ModifyOrderRequest, PlaceOrderRequest, StatusView, TickerView};

fn parse_price(raw: Decimal) -> Result<Price, AppError> {
    Price::try_new(raw).ok_or_else(|| EngineError::from(ValidationError::NonPositivePrice).into())
}

fn parse_quantity(raw: Decimal) -> Result<Quantity, AppError> {
    Quantity::try_new(raw)
        .ok_or_else(|| EngineError::from(ValidationError::NonPositiveQuantity).into())
}

struct Market {
    lifecycle: OrderLifecycle,
    candles: SymbolCandles,
}

pub struct Exchange {
    markets: DashMap<Symbol, Mutex<Market>>,
    positions: Mutex<PositionTracker>,
    depth_cap: usize,
}

impl Exchange {
    pub fn new(symbols: &[Symbol], depth_cap: usize, candle_history: usize) -> Self {
        let markets = DashMap::new();
        for symbol in symbols {
            markets.insert(
                symbol.clone(),
                Mutex::new(Market {
                    lifecycle: OrderLifecycle::new(
                        symbol.clone(),
                        Arc::new(NoopFundsGate),
                        ModifyPolicy::default(),
                    ),
                    candles: SymbolCandles::new(symbol.clone(), Interval::all(), candle_history),
                }),
            );
        }
        Self {
            markets,
            positions: Mutex::new(PositionTracker::weighted_average()),
            depth_cap,
        }
    }

    fn parse_symbol(&self, raw: &str) -> Result<Symbol, AppError> {
        // Path segments cannot hold a literal slash, so AAPL-USD is
        // accepted as an alias for AAPL/USD
        let normalized = if raw.contains('/') {
            raw.to_string()
        } else {
            raw.replace('-', "/")
        };
        let symbol = Symbol::try_new(normalized)
            .ok_or_else(|| AppError::BadRequest(format!("malformed symbol: {raw}")))?;
        if !self.markets.contains_key(&symbol) {
            return Err(AppError::BadRequest(format!("unknown symbol: {symbol}")));
        }
        Ok(symbol)
    }

    fn with_market<T>(
        &self,
        symbol: &Symbol,
        f: impl FnOnce(&mut Market) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let market = self
            .markets
            .get(symbol)
            .ok_or_else(|| AppError::BadRequest(format!("unknown symbol: {symbol}")))?;
        let mut guard = market.lock();
        f(&mut guard)
    }

    fn record_trades(&self, trades: &[Trade]) {
        if trades.is_empty() {
            return;
        }
        let mut positions = self.positions.lock();
        for trade in trades {
            positions.apply_trade(trade);
        }
    }

    pub fn place(
        &self,
        user_id: UserId,
        request: PlaceOrderRequest,
    ) -> Result<PlaceOutcome, AppError> {
        let symbol = self.parse_symbol(&request.symbol)?;
        let price = request.price.map(parse_price).transpose()?;
        let quantity = parse_quantity(request.quantity)?;

        let intent = OrderIntent {
            user_id,
            symbol: symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            price,
            quantity,
        };

        let outcome = self.with_market(&symbol, |market| {
            let outcome = market.lifecycle.place(intent, now_nanos())?;
            for trade in &outcome.trades {
                market.candles.record_trade(trade);
            }
            Ok(outcome)
        })?;

        self.record_trades(&outcome.trades);
        Ok(outcome)
    }

    pub fn order(&self, user_id: &UserId, order_id: &OrderId) -> Result<Order, AppError> {
        for entry in self.markets.iter() {
            let market = entry.value().lock();
            if let Some(order) = market.lifecycle.get(order_id) {
                if &order.user_id == user_id {
                    return Ok(order.clone());
                }
                break;
            }
        }
        Err(AppError::NotFound(format!("order {order_id} not found")))
    }

    /// All of a user's orders across markets, newest first
    pub fn orders(&self, user_id: &UserId, open_only: bool) -> Vec<Order> {
        let mut orders = Vec::new();
        for entry in self.markets.iter() {
            let market = entry.value().lock();
            orders.extend(market.lifecycle.orders_for_user(user_id, open_only));
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    pub fn cancel(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
        reason: CancelReason,
    ) -> Result<Order, AppError> {
        for entry in self.markets.iter() {
            let mut market = entry.value().lock();
            if market.lifecycle.get(order_id).is_some() {
                let order = market
                    .lifecycle
                    .cancel(order_id, user_id, reason, now_nanos())?;
                return Ok(order);
            }
        }
        Err(AppError::NotFound(format!("order {order_id} not found")))
    }

    pub fn cancel_all(
        &self,
        user_id: &UserId,
        symbol: Option<&str>,
        side: Option<Side>,
    ) -> Result<Vec<Order>, AppError> {
        let symbol = symbol.map(|raw| self.parse_symbol(raw)).transpose()?;
        let filter = CancelFilter { side };

        let mut cancelled = Vec::new();
        for entry in self.markets.iter() {
            if let Some(wanted) = &symbol {
                if entry.key() != wanted {
                    continue;
                }
            }
            let mut market = entry.value().lock();
            cancelled.extend(market.lifecycle.cancel_all(user_id, filter, now_nanos())?);
        }
        Ok(cancelled)
    }

    pub fn modify(
        &self,
        user_id: &UserId,
        order_id: &OrderId,
        request: ModifyOrderRequest,
    ) -> Result<PlaceOutcome, AppError> {
        let new_price = request.price.map(parse_price).transpose()?;
        let new_quantity = request.quantity.map(parse_quantity).transpose()?;

        for entry in self.markets.iter() {
            let mut market = entry.value().lock();
            if market.lifecycle.get(order_id).is_none() {
                continue;
            }
            let outcome =
                market
                    .lifecycle
                    .modify(order_id, user_id, new_price, new_quantity, now_nanos())?;
            for trade in &outcome.trades {
                market.candles.record_trade(trade);
            }
            drop(market);
            self.record_trades(&outcome.trades);
            return Ok(outcome);
        }
        Err(AppError::NotFound(format!("order {order_id} not found")))
    }

    pub fn depth(&self, symbol: &str, levels: usize) -> Result<Depth, AppError> {
        let symbol = self.parse_symbol(symbol)?;
        let levels = levels.min(self.depth_cap);
        self.with_market(&symbol, |market| Ok(market.lifecycle.depth(levels)))
    }

    pub fn recent_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>, AppError> {
        let symbol = self.parse_symbol(symbol)?;
        self.with_market(&symbol, |market| Ok(market.lifecycle.ledger().recent(limit)))
    }

    /// The user's fills, optionally scoped to one symbol, newest first
    pub fn my_trades(
        &self,
        user_id: &UserId,
        symbol: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Trade>, AppError> {
        if let Some(raw) = symbol {
            let symbol = self.parse_symbol(raw)?;
            return self.with_market(&symbol, |market| {
                Ok(market.lifecycle.ledger().by_user(user_id, limit, offset))
            });
        }

        let mut trades = Vec::new();
        for entry in self.markets.iter() {
            let market = entry.value().lock();
            trades.extend(
                market
                    .lifecycle
                    .ledger()
                    .by_user(user_id, limit + offset, 0),
            );
        }
        trades.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        Ok(trades.into_iter().skip(offset).take(limit).collect())
    }

    pub fn ohlcv(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, AppError> {
        let symbol = self.parse_symbol(symbol)?;
        self.with_market(&symbol, |market| Ok(market.candles.ohlcv(interval, limit)))
    }

    pub fn positions(&self, user_id: &UserId) -> Vec<Position> {
        self.positions.lock().positions_for(user_id)
    }

    pub fn position(&self, user_id: &UserId, symbol: &Symbol) -> Option<Position> {
        self.positions.lock().get(user_id, symbol).cloned()
    }

    pub fn pairs(&self) -> Vec<Symbol> {
        let mut pairs: Vec<Symbol> = self.markets.iter().map(|e| e.key().clone()).collect();
        pairs.sort();
        pairs
    }

    pub fn ticker(&self, symbol: &str) -> Result<TickerView, AppError> {
        let symbol = self.parse_symbol(symbol)?;
        self.with_market(&symbol, |market| {
            let day = market.candles.current(Interval::D1);
            Ok(TickerView {
                symbol: symbol.clone(),
                last_price: market.lifecycle.ledger().last().map(|t| t.price),
                best_bid: market.lifecycle.best_bid().map(|(price, _)| price),
                best_ask: market.lifecycle.best_ask().map(|(price, _)| price),
                day_open: day.map(|c| c.open),
                day_high: day.map(|c| c.high),
                day_low: day.map(|c| c.low),
                day_volume: day.map(|c| c.volume).unwrap_or(Quantity::zero()),
                day_trades: day.map(|c| c.trade_count).unwrap_or(0),
            })
        })
    }

    pub fn status(&self, symbol: &str) -> Result<StatusView, AppError> {
        let symbol = self.parse_symbol(symbol)?;
        self.with_market(&symbol, |market| {
            Ok(StatusView {
                symbol: symbol.clone(),
                open_orders: market.lifecycle.open_order_count(),
                bid_levels: market.lifecycle.book().bid_level_count(),
                ask_levels: market.lifecycle.book().ask_level_count(),
                trades: market.lifecycle.ledger().len(),
            })
        })
    }

}

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<Exchange>,
    pub jwt_secret: Arc<String>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            exchange: Arc::new(Exchange::new(
                &config.symbols,
                config.depth_cap,
                config.candle_history,
            )),
            jwt_secret: Arc::new(config.jwt_secret.clone()),
        }
    }
}
