use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use tokex_types::ids::OrderId;
use tokex_types::order::{CancelReason, Order};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    CancelAllQuery, CancelAllView, CancelQuery, ModifyOrderRequest, OrderOutcomeView,
    PlaceOrderRequest,
};
use crate::state::AppState;

fn parse_order_id(raw: &str) -> Result<OrderId, AppError> {
    Uuid::parse_str(raw)
        .map(OrderId::from_uuid)
        .map_err(|_| AppError::BadRequest(format!("malformed order id: {raw}")))
}

pub async fn place_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<OrderOutcomeView>), AppError> {
    let outcome = state.exchange.place(user.user_id, payload)?;
    tracing::info!(
        user = %user.user_id,
        order = %outcome.order.id,
        status = %outcome.order.status,
        "order request handled"
    );
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order_id = parse_order_id(&id)?;
    let order = state.exchange.order(&user.user_id, &order_id)?;
    Ok(Json(order))
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Json<Vec<Order>> {
    Json(state.exchange.orders(&user.user_id, false))
}

pub async fn list_open_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Json<Vec<Order>> {
    Json(state.exchange.orders(&user.user_id, true))
}

pub async fn modify_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(payload): Json<ModifyOrderRequest>,
) -> Result<Json<OrderOutcomeView>, AppError> {
    let order_id = parse_order_id(&id)?;
    let outcome = state.exchange.modify(&user.user_id, &order_id, payload)?;
    Ok(Json(outcome.into()))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<Order>, AppError> {
    let order_id = parse_order_id(&id)?;
    let reason = query.reason.unwrap_or(CancelReason::UserRequested);
    let order = state.exchange.cancel(&user.user_id, &order_id, reason)?;
    Ok(Json(order))
}

pub async fn cancel_all_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<CancelAllQuery>,
) -> Result<Json<CancelAllView>, AppError> {
    let cancelled =
        state
            .exchange
            .cancel_all(&user.user_id, query.symbol.as_deref(), query.side)?;
    Ok(Json(CancelAllView { cancelled }))
}
