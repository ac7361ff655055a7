use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::models::{
    BookLevel, BookResponse, ClaimRequest, ClaimResponse, CreateMarketRequest,
    CreateMarketResponse, MarketStatusResponse, ResolveMarketRequest,
};
use crate::state::AppState;
use persistence::Operation;
use types::errors::MarketError;
use types::ids::MarketId;
use types::outcome::Outcome;

fn parse_outcome(raw: &str) -> Result<Outcome, AppError> {
    match raw.to_ascii_uppercase().as_str() {
        "YES" => Ok(Outcome::Yes),
        "NO" => Ok(Outcome::No),
        other => Err(AppError::BadRequest(format!("unknown outcome: {other}"))),
    }
}

pub async fn create_market(
    State(state): State<AppState>,
    Json(payload): Json<CreateMarketRequest>,
) -> Result<Json<CreateMarketResponse>, AppError> {
    let mut shared = state.shared.lock().await;
    let market = shared.engine.create_market(payload.caller)?;
    shared.journal(&Operation::CreateMarket {
        caller: payload.caller,
    });
    Ok(Json(CreateMarketResponse { market }))
}

pub async fn resolve_market(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ResolveMarketRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let market = MarketId::new(id);
    let mut shared = state.shared.lock().await;
    shared
        .engine
        .resolve_market(payload.caller, market, payload.outcome)?;
    shared.journal(&Operation::ResolveMarket {
        caller: payload.caller,
        market,
        outcome: payload.outcome,
    });
    Ok(Json(serde_json::json!({ "resolved": true })))
}

pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    let market = MarketId::new(id);
    let mut shared = state.shared.lock().await;
    let payout = shared.engine.claim(payload.caller, market)?;
    shared.journal(&Operation::Claim {
        caller: payload.caller,
        market,
    });
    Ok(Json(ClaimResponse { payout }))
}

pub async fn market_status(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<MarketStatusResponse>, AppError> {
    let market_id = MarketId::new(id);
    let shared = state.shared.lock().await;
    let market = shared
        .engine
        .market(market_id)
        .ok_or(MarketError::NotActive(market_id))
        .map_err(types::errors::EngineError::from)?;
    Ok(Json(MarketStatusResponse {
        market: market_id,
        active: market.is_active(),
        resolved: market.is_resolved(),
        outcome: market.outcome(),
        total_collateral: market.total_collateral(),
    }))
}

pub async fn book(
    State(state): State<AppState>,
    Path((id, outcome)): Path<(u64, String)>,
) -> Result<Json<BookResponse>, AppError> {
    let outcome = parse_outcome(&outcome)?;
    let shared = state.shared.lock().await;
    let levels = shared
        .engine
        .depth(MarketId::new(id), outcome, 50)
        .into_iter()
        .map(|(tick, size)| BookLevel { tick, size })
        .collect();
    Ok(Json(BookResponse { outcome, levels }))
}
