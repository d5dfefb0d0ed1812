use axum::extract::{Path, Query, State};
use axum::Json;

use tokex_engine::book::Depth;
use tokex_market_data::candles::{Candle, Interval};
use tokex_types::trade::Trade;

use crate::error::AppError;
use crate::models::{DepthQuery, OhlcvQuery, PairsView, StatusView, TickerView, TradesQuery};
use crate::state::AppState;

pub async fn orderbook(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<DepthQuery>,
) -> Result<Json<Depth>, AppError> {
    Ok(Json(state.exchange.depth(&symbol, query.depth)?))
}

pub async fn recent_trades(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<TradesQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    Ok(Json(state.exchange.recent_trades(&symbol, query.limit)?))
}

pub async fn ohlcv(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<OhlcvQuery>,
) -> Result<Json<Vec<Candle>>, AppError> {
    let interval: Interval = query
        .interval
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown interval: {}", query.interval)))?;
    Ok(Json(state.exchange.ohlcv(&symbol, interval, query.limit)?))
}

pub async fn pairs(State(state): State<AppState>) -> Json<PairsView> {
    Json(PairsView {
        pairs: state.exchange.pairs(),
    })
}

pub async fn ticker(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<TickerView>, AppError> {
    Ok(Json(state.exchange.ticker(&symbol)?))
}

pub async fn status(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StatusView>, AppError> {
    Ok(Json(state.exchange.status(&symbol)?))
}
