use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{BalancesResponse, DepositRequest};
use crate::state::AppState;
use persistence::Operation;
use types::ids::{MarketId, ParticipantId};
use types::outcome::Outcome;

pub async fn deposit(
    State(state): State<AppState>,
    Json(payload): Json<DepositRequest>,
) -> Result<StatusCode, AppError> {
    let mut shared = state.shared.lock().await;
    shared
        .engine
        .ledger_mut()
        .deposit(payload.participant, payload.amount);
    shared.journal(&Operation::Deposit {
        participant: payload.participant,
        amount: payload.amount,
    });
    Ok(StatusCode::OK)
}

pub async fn balances(
    State(state): State<AppState>,
    Path((id, participant)): Path<(u64, Uuid)>,
) -> Result<Json<BalancesResponse>, AppError> {
    let participant = ParticipantId::from_uuid(participant);
    let shared = state.shared.lock().await;
    let (yes_shares, no_shares) = match shared.engine.market(MarketId::new(id)) {
        Some(market) => (
            market.side(Outcome::Yes).balance(participant),
            market.side(Outcome::No).balance(participant),
        ),
        None => (0, 0),
    };
    Ok(Json(BalancesResponse {
        collateral: shared.engine.ledger().balance_of(participant),
        yes_shares,
        no_shares,
    }))
}
