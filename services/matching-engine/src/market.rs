//! Per-market state
//!
//! Each market carries one [`OutcomeBook`] per outcome. A book holds the
//! unified and bid-only tick indexes, the tick → level map, and the share
//! balances for that outcome. Ask orders rest in the *opposite* outcome's
//! book at the complement tick, which is what lets one descending scan of
//! the unified index serve both the minting and the transfer path.

use std::collections::BTreeMap;

use types::errors::{BalanceError, MarketError};
use types::ids::{MarketId, ParticipantId};
use types::numeric::{Collateral, Price};
use types::outcome::{Outcome, Side};

use crate::book::{PriceIndex, PriceLevel};

/// Book, indexes and balances for a single outcome
#[derive(Debug, Clone, Default)]
pub struct OutcomeBook {
    unified: PriceIndex,
    bid_only: PriceIndex,
    levels: BTreeMap<Price, PriceLevel>,
    balances: BTreeMap<ParticipantId, u128>,
}

impl OutcomeBook {
    /// Ticks with any resting order (bids here, or asks quoted on the
    /// opposite outcome and stored inverted)
    pub fn unified(&self) -> &PriceIndex {
        &self.unified
    }

    /// Ticks with at least one resting bid
    pub fn bid_only(&self) -> &PriceIndex {
        &self.bid_only
    }

    /// The level at `tick`, if one was ever created
    pub fn level(&self, tick: Price) -> Option<&PriceLevel> {
        self.levels.get(&tick)
    }

    /// All levels ever created, in ascending tick order
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.levels.iter().map(|(tick, level)| (*tick, level))
    }

    /// Share balance of one participant
    pub fn balance(&self, participant: ParticipantId) -> u128 {
        self.balances.get(&participant).copied().unwrap_or(0)
    }

    /// All nonzero share balances, in participant order
    pub fn balances(&self) -> impl Iterator<Item = (ParticipantId, u128)> + '_ {
        self.balances
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(participant, amount)| (*participant, *amount))
    }

    /// Total shares of this outcome across all participants
    pub fn share_supply(&self) -> u128 {
        self.balances.values().sum()
    }

    pub(crate) fn unified_mut(&mut self) -> &mut PriceIndex {
        &mut self.unified
    }

    pub(crate) fn bid_only_mut(&mut self) -> &mut PriceIndex {
        &mut self.bid_only
    }

    pub(crate) fn level_mut(&mut self, tick: Price) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&tick)
    }

    pub(crate) fn level_entry(&mut self, tick: Price) -> &mut PriceLevel {
        self.levels.entry(tick).or_default()
    }

    pub(crate) fn credit_shares(&mut self, participant: ParticipantId, amount: u128) {
        *self.balances.entry(participant).or_insert(0) += amount;
    }

    pub(crate) fn debit_shares(
        &mut self,
        participant: ParticipantId,
        amount: u128,
    ) -> Result<(), BalanceError> {
        let available = self.balance(participant);
        if available < amount {
            return Err(BalanceError::InsufficientShares {
                required: amount,
                available,
            });
        }
        self.balances.insert(participant, available - amount);
        Ok(())
    }
}

/// State of one binary market
#[derive(Debug, Clone)]
pub struct Market {
    yes: OutcomeBook,
    no: OutcomeBook,
    total_collateral: Collateral,
    active: bool,
    resolved: bool,
    outcome: Option<Outcome>,
}

impl Market {
    pub(crate) fn new() -> Self {
        Self {
            yes: OutcomeBook::default(),
            no: OutcomeBook::default(),
            total_collateral: Collateral::ZERO,
            active: true,
            resolved: false,
            outcome: None,
        }
    }

    /// The book for one outcome
    pub fn side(&self, outcome: Outcome) -> &OutcomeBook {
        match outcome {
            Outcome::Yes => &self.yes,
            Outcome::No => &self.no,
        }
    }

    pub(crate) fn side_mut(&mut self, outcome: Outcome) -> &mut OutcomeBook {
        match outcome {
            Outcome::Yes => &mut self.yes,
            Outcome::No => &mut self.no,
        }
    }

    /// Collateral backing minted pairs; monotone non-decreasing while trading
    pub fn total_collateral(&self) -> Collateral {
        self.total_collateral
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The declared outcome, once resolved
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub(crate) fn add_collateral(&mut self, amount: Collateral) {
        self.total_collateral = self.total_collateral + amount;
    }

    /// Guard for every order-mutating operation
    pub(crate) fn ensure_tradable(&self, id: MarketId) -> Result<(), MarketError> {
        if !self.active {
            return Err(MarketError::NotActive(id));
        }
        if self.resolved {
            return Err(MarketError::AlreadyResolved(id));
        }
        Ok(())
    }

    pub(crate) fn resolve(&mut self, outcome: Outcome) {
        self.resolved = true;
        self.outcome = Some(outcome);
    }

    /// Storage coordinates for an order quoted in the maker's natural frame
    ///
    /// Bids rest where they are quoted; asks rest at the complement tick in
    /// the opposite outcome's book.
    pub fn storage_frame(quoted: Price, side: Side, outcome: Outcome) -> (Outcome, Price) {
        match side {
            Side::Bid => (outcome, quoted),
            Side::Ask => (outcome.complement(), quoted.complement()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_market_is_tradable() {
        let market = Market::new();
        assert!(market.is_active());
        assert!(!market.is_resolved());
        assert!(market.ensure_tradable(MarketId::new(0)).is_ok());
    }

    #[test]
    fn test_resolved_market_rejects_trading() {
        let mut market = Market::new();
        market.resolve(Outcome::Yes);
        assert_eq!(
            market.ensure_tradable(MarketId::new(0)),
            Err(MarketError::AlreadyResolved(MarketId::new(0)))
        );
        assert_eq!(market.outcome(), Some(Outcome::Yes));
    }

    #[test]
    fn test_share_credit_and_debit() {
        let mut market = Market::new();
        let alice = ParticipantId::new();
        market.side_mut(Outcome::Yes).credit_shares(alice, 100);
        assert_eq!(market.side(Outcome::Yes).balance(alice), 100);
        assert_eq!(market.side(Outcome::Yes).share_supply(), 100);

        market
            .side_mut(Outcome::Yes)
            .debit_shares(alice, 40)
            .unwrap();
        assert_eq!(market.side(Outcome::Yes).balance(alice), 60);
    }

    #[test]
    fn test_share_debit_insufficient() {
        let mut market = Market::new();
        let alice = ParticipantId::new();
        market.side_mut(Outcome::No).credit_shares(alice, 10);
        let err = market
            .side_mut(Outcome::No)
            .debit_shares(alice, 11)
            .unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientShares {
                required: 11,
                available: 10
            }
        );
        // Failed debit left the balance untouched
        assert_eq!(market.side(Outcome::No).balance(alice), 10);
    }

    #[test]
    fn test_storage_frame_inversion() {
        let quoted = Price::new(600);
        assert_eq!(
            Market::storage_frame(quoted, Side::Bid, Outcome::Yes),
            (Outcome::Yes, Price::new(600))
        );
        assert_eq!(
            Market::storage_frame(quoted, Side::Ask, Outcome::Yes),
            (Outcome::No, Price::new(400))
        );
    }
}
