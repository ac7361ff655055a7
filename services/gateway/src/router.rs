use crate::handlers::{accounts, markets, orders};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/markets", post(markets::create_market))
        .route("/markets/:id", get(markets::market_status))
        .route("/markets/:id/resolve", post(markets::resolve_market))
        .route("/markets/:id/claim", post(markets::claim))
        .route("/markets/:id/book/:outcome", get(markets::book))
        .route("/markets/:id/orders", post(orders::place_limit_order))
        .route("/markets/:id/sweeps", post(orders::execute_market_order))
        .route("/markets/:id/cancellations", post(orders::cancel_order))
        .route("/deposits", post(accounts::deposit))
        .route(
            "/markets/:id/balances/:participant",
            get(accounts::balances),
        );

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
