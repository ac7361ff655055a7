//! Request and response bodies for the gateway API
//!
//! Prices travel as raw ticks, sizes as whole share counts, collateral
//! amounts as decimal strings (the `Collateral` serde form).

use serde::{Deserialize, Serialize};

use types::ids::{MarketId, OrderId, ParticipantId};
use types::numeric::Collateral;
use types::outcome::{Outcome, Side};

#[derive(Debug, Deserialize)]
pub struct CreateMarketRequest {
    pub caller: ParticipantId,
}

#[derive(Debug, Serialize)]
pub struct CreateMarketResponse {
    pub market: MarketId,
}

#[derive(Debug, Deserialize)]
pub struct ResolveMarketRequest {
    pub caller: ParticipantId,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub caller: ParticipantId,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub payout: Collateral,
}

#[derive(Debug, Deserialize)]
pub struct LimitOrderRequest {
    pub caller: ParticipantId,
    pub side: Side,
    pub price: u64,
    pub size: u128,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct LimitOrderResponse {
    pub order_id: OrderId,
}

#[derive(Debug, Deserialize)]
pub struct MarketOrderRequest {
    pub caller: ParticipantId,
    pub side: Side,
    pub size: u128,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct MarketOrderResponse {
    pub fulfilled: u128,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub caller: ParticipantId,
    pub price: u64,
    pub index: usize,
    pub side: Side,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub participant: ParticipantId,
    pub amount: Collateral,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub collateral: Collateral,
    pub yes_shares: u128,
    pub no_shares: u128,
}

#[derive(Debug, Serialize)]
pub struct BookLevel {
    pub tick: u64,
    pub size: u128,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub outcome: Outcome,
    pub levels: Vec<BookLevel>,
}

#[derive(Debug, Serialize)]
pub struct MarketStatusResponse {
    pub market: MarketId,
    pub active: bool,
    pub resolved: bool,
    pub outcome: Option<Outcome>,
    pub total_collateral: Collateral,
}
