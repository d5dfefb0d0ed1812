use axum::extract::{Query, State};
use axum::Json;

use tokex_types::position::Position;
use tokex_types::trade::Trade;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::MyTradesQuery;
use crate::state::AppState;

pub async fn my_positions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Json<Vec<Position>> {
    Json(state.exchange.positions(&user.user_id))
}

pub async fn my_trades(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MyTradesQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    let trades = state.exchange.my_trades(
        &user.user_id,
        query.symbol.as_deref(),
        query.limit,
        query.offset,
    )?;
    Ok(Json(trades))
}
