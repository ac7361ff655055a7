use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::AppError;
use crate::models::{
    CancelRequest, LimitOrderRequest, LimitOrderResponse, MarketOrderRequest, MarketOrderResponse,
};
use crate::state::AppState;
use persistence::Operation;
use types::ids::MarketId;
use types::outcome::Side;

pub async fn place_limit_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<LimitOrderRequest>,
) -> Result<Json<LimitOrderResponse>, AppError> {
    let market = MarketId::new(id);
    let mut shared = state.shared.lock().await;
    let (order_id, op) = match payload.side {
        Side::Bid => (
            shared.engine.limit_buy(
                payload.caller,
                market,
                payload.price,
                payload.size,
                payload.outcome,
            )?,
            Operation::LimitBuy {
                caller: payload.caller,
                market,
                price: payload.price,
                size: payload.size,
                outcome: payload.outcome,
            },
        ),
        Side::Ask => (
            shared.engine.limit_sell(
                payload.caller,
                market,
                payload.price,
                payload.size,
                payload.outcome,
            )?,
            Operation::LimitSell {
                caller: payload.caller,
                market,
                price: payload.price,
                size: payload.size,
                outcome: payload.outcome,
            },
        ),
    };
    shared.journal(&op);
    Ok(Json(LimitOrderResponse { order_id }))
}

pub async fn execute_market_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<MarketOrderRequest>,
) -> Result<Json<MarketOrderResponse>, AppError> {
    let market = MarketId::new(id);
    let mut shared = state.shared.lock().await;
    let (fulfilled, op) = match payload.side {
        Side::Bid => (
            shared
                .engine
                .market_buy(payload.caller, market, payload.size, payload.outcome)?,
            Operation::MarketBuy {
                caller: payload.caller,
                market,
                size: payload.size,
                outcome: payload.outcome,
            },
        ),
        Side::Ask => (
            shared
                .engine
                .market_sell(payload.caller, market, payload.size, payload.outcome)?,
            Operation::MarketSell {
                caller: payload.caller,
                market,
                size: payload.size,
                outcome: payload.outcome,
            },
        ),
    };
    shared.journal(&op);
    Ok(Json(MarketOrderResponse { fulfilled }))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<CancelRequest>,
) -> Result<StatusCode, AppError> {
    let market = MarketId::new(id);
    let mut shared = state.shared.lock().await;
    shared.engine.cancel(
        payload.caller,
        market,
        payload.price,
        payload.index,
        payload.side,
        payload.outcome,
    )?;
    shared.journal(&Operation::Cancel {
        caller: payload.caller,
        market,
        price: payload.price,
        index: payload.index,
        side: payload.side,
        outcome: payload.outcome,
    });
    Ok(StatusCode::OK)
}
