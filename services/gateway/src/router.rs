use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{market, orders, positions};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let trading = Router::new()
        .route("/orders", post(orders::place_order))
        .route("/orders", get(orders::list_orders))
        .route("/orders", delete(orders::cancel_all_orders))
        .route("/orders/open", get(orders::list_open_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}", put(orders::modify_order))
        .route("/orders/{id}", delete(orders::cancel_order))
        .route("/orderbook/{symbol}", get(market::orderbook))
        .route("/trades/{symbol}", get(market::recent_trades))
        .route("/my-trades", get(positions::my_trades))
        .route("/ohlcv/{symbol}", get(market::ohlcv))
        .route("/positions", get(positions::my_positions))
        .route("/pairs", get(market::pairs))
        .route("/market/{symbol}", get(market::ticker))
        .route("/status/{symbol}", get(market::status));

    Router::new()
        .nest("/trading", trading)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
