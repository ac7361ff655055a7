//! Market lifecycle: creation, resolution, claim
//!
//! A market trades from creation until the admin declares its outcome;
//! afterwards only `claim` mutates it. Resting orders are neither refunded
//! nor matched on resolution — their collateral stays in escrow behind the
//! winning-share claims.

use types::errors::{BalanceError, EngineError, LedgerError, MarketError};
use types::ids::{MarketId, ParticipantId};
use types::numeric::Collateral;
use types::outcome::Outcome;

use crate::admin::AdminAuthority;
use crate::engine::Exchange;
use crate::events::{EventSink, MarketEvent};
use crate::ledger::CollateralLedger;
use crate::market::Market;

impl<L, A, S> Exchange<L, A, S>
where
    L: CollateralLedger,
    A: AdminAuthority,
    S: EventSink,
{
    /// Create the next market (admin only)
    ///
    /// Market ids are assigned monotonically from 0.
    pub fn create_market(&mut self, caller: ParticipantId) -> Result<MarketId, EngineError> {
        self.admin.require_admin(caller)?;
        let id = MarketId::new(self.markets.len() as u64);
        self.markets.push(Market::new());
        tracing::info!(market = %id, "market created");
        self.sink.record(MarketEvent::MarketCreated { market: id });
        Ok(id)
    }

    /// Declare a market's final outcome (admin only)
    ///
    /// Happens exactly once per market; trading is rejected afterwards.
    pub fn resolve_market(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        outcome: Outcome,
    ) -> Result<(), EngineError> {
        self.admin.require_admin(caller)?;
        let idx = self.market_index(market_id)?;
        let market = &mut self.markets[idx];
        if !market.is_active() {
            return Err(MarketError::NotActive(market_id).into());
        }
        if market.is_resolved() {
            return Err(MarketError::AlreadyResolved(market_id).into());
        }
        market.resolve(outcome);
        tracing::info!(market = %market_id, %outcome, "market resolved");
        self.sink.record(MarketEvent::MarketResolved {
            market: market_id,
            outcome,
        });
        Ok(())
    }

    /// Exchange the caller's winning shares for collateral
    ///
    /// Pays `shares * MULT` from escrow and zeroes the winning balance.
    /// Losing-side balances are worthless and left in place.
    pub fn claim(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
    ) -> Result<Collateral, EngineError> {
        let idx = self.market_index(market_id)?;
        let market = &self.markets[idx];
        if !market.is_active() {
            return Err(MarketError::NotActive(market_id).into());
        }
        if !market.is_resolved() {
            return Err(MarketError::NotResolved(market_id).into());
        }
        let outcome = market.outcome().expect("resolved market has an outcome");
        let shares = market.side(outcome).balance(caller);
        if shares == 0 {
            return Err(BalanceError::InsufficientShares {
                required: 1,
                available: 0,
            }
            .into());
        }
        let payout =
            Collateral::new(shares.checked_mul(self.mult).ok_or(LedgerError::Overflow)?);

        self.markets[idx]
            .side_mut(outcome)
            .debit_shares(caller, shares)
            .expect("balance read above");
        self.ledger.credit(caller, payout);
        tracing::info!(market = %market_id, user = %caller, shares, "rewards claimed");
        self.sink.record(MarketEvent::RewardsClaimed {
            market: market_id,
            user: caller,
            amount: shares,
        });
        Ok(payout)
    }
}
