//! Exchange core
//!
//! Owns every market and the three boundary collaborators. Each operation
//! validates, performs its single fallible ledger debit (if any), and only
//! then mutates book state and emits audit records — so a returned error
//! always means nothing happened.

use sha2::{Digest, Sha256};

use types::errors::{BalanceError, EngineError, MarketError, OrderError};
use types::ids::{MarketId, OrderId, ParticipantId};
use types::numeric::{Collateral, Price, BPS, MAX_ORDER_SIZE};
use types::outcome::{Outcome, Side};

use crate::admin::AdminAuthority;
use crate::events::{EventSink, MarketEvent};
use crate::ledger::CollateralLedger;
use crate::market::Market;
use crate::matching::sweep;

/// The exchange: every market plus the boundary collaborators
pub struct Exchange<L, A, S> {
    pub(crate) markets: Vec<Market>,
    pub(crate) ledger: L,
    pub(crate) admin: A,
    pub(crate) sink: S,
    pub(crate) mult: u128,
}

impl<L, A, S> Exchange<L, A, S>
where
    L: CollateralLedger,
    A: AdminAuthority,
    S: EventSink,
{
    /// Create an exchange for a collateral token with `decimals` decimals
    ///
    /// One winning share pays `10^decimals` collateral units.
    ///
    /// # Panics
    /// Panics if `10^decimals` does not fit in `u128`.
    pub fn new(ledger: L, admin: A, sink: S, decimals: u32) -> Self {
        let mult = 10u128
            .checked_pow(decimals)
            .expect("collateral decimals too large");
        Self {
            markets: Vec::new(),
            ledger,
            admin,
            sink,
            mult,
        }
    }

    /// Collateral units paid per winning share
    pub fn mult(&self) -> u128 {
        self.mult
    }

    /// The market with this id, if it was ever created
    pub fn market(&self, id: MarketId) -> Option<&Market> {
        self.markets.get(id.get() as usize)
    }

    /// Number of markets ever created
    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // ── Placement operations ────────────────────────────────────────

    /// Rest a bid for `size` shares of `outcome` at `price`
    ///
    /// Debits `size * price * MULT / BPS` from the caller into escrow. A
    /// limit order never crosses the book on placement; takers sweep it
    /// later with a market order.
    pub fn limit_buy(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        price: u64,
        size: u128,
        outcome: Outcome,
    ) -> Result<OrderId, EngineError> {
        let price = Price::try_new(price)?;
        Self::validate_size(size)?;
        let idx = self.market_index(market_id)?;
        self.markets[idx].ensure_tradable(market_id)?;

        let cost = price.cost(size, self.mult)?;
        self.ledger.debit(caller, cost)?;

        let book = self.markets[idx].side_mut(outcome);
        let index = book.level_entry(price).append(caller, size, Side::Bid);
        book.unified_mut().set(price);
        book.bid_only_mut().set(price);

        let order_id = OrderId::derive(market_id, price, index);
        tracing::debug!(market = %market_id, maker = %caller, %price, size, %outcome, "bid resting");
        self.sink.record(MarketEvent::LimitOrderPlaced {
            market: market_id,
            maker: caller,
            order_id,
            price,
            size,
            outcome,
            side: Side::Bid,
        });
        Ok(order_id)
    }

    /// Rest an ask for `size` held shares of `outcome` at `price`
    ///
    /// Escrows the shares (not collateral) and stores the order at the
    /// complement tick in the opposite outcome's book, where opposing
    /// market buyers will find it ranked by what they would pay.
    pub fn limit_sell(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        price: u64,
        size: u128,
        outcome: Outcome,
    ) -> Result<OrderId, EngineError> {
        let price = Price::try_new(price)?;
        Self::validate_size(size)?;
        let idx = self.market_index(market_id)?;
        self.markets[idx].ensure_tradable(market_id)?;

        self.markets[idx]
            .side_mut(outcome)
            .debit_shares(caller, size)?;

        let tick = price.complement();
        let book = self.markets[idx].side_mut(outcome.complement());
        let index = book.level_entry(tick).append(caller, size, Side::Ask);
        book.unified_mut().set(tick);

        let order_id = OrderId::derive(market_id, tick, index);
        tracing::debug!(market = %market_id, maker = %caller, %price, size, %outcome, "ask resting");
        self.sink.record(MarketEvent::LimitOrderPlaced {
            market: market_id,
            maker: caller,
            order_id,
            price,
            size,
            outcome,
            side: Side::Ask,
        });
        Ok(order_id)
    }

    /// Cancel a resting order, addressed in the maker's natural frame
    ///
    /// Refunds the order's *current* residual: collateral for a bid, shares
    /// for an ask. The queue entry is zeroed in place so later indexes stay
    /// valid.
    pub fn cancel(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        price: u64,
        index: usize,
        side: Side,
        outcome: Outcome,
    ) -> Result<(), EngineError> {
        let quoted = Price::try_new(price)?;
        let idx = self.market_index(market_id)?;
        self.markets[idx].ensure_tradable(market_id)?;

        let (store_outcome, tick) = Market::storage_frame(quoted, side, outcome);
        let not_found = OrderError::NotFound { price, index };

        let residual = {
            let book = self.markets[idx].side(store_outcome);
            let level = book.level(tick).ok_or(not_found)?;
            let order = level.order(index).ok_or(not_found)?;
            if order.side != side {
                return Err(not_found.into());
            }
            if order.maker != caller {
                return Err(EngineError::Unauthorized);
            }
            order.size
        };
        let refund = match side {
            Side::Bid => quoted.cost(residual, self.mult)?,
            Side::Ask => Collateral::ZERO,
        };

        {
            let book = self.markets[idx].side_mut(store_outcome);
            let level = book.level_mut(tick).expect("order located above");
            level.order_mut(index).expect("order located above").size = 0;
            level.reduce_total(residual);
            if level.total_size() == 0 {
                book.unified_mut().unset(tick);
                book.bid_only_mut().unset(tick);
            }
        }
        match side {
            Side::Bid => self.ledger.credit(caller, refund),
            Side::Ask => self.markets[idx]
                .side_mut(outcome)
                .credit_shares(caller, residual),
        }

        let order_id = OrderId::derive(market_id, tick, index);
        tracing::debug!(market = %market_id, maker = %caller, %order_id, "order cancelled");
        self.sink.record(MarketEvent::OrderCancelled {
            market: market_id,
            maker: caller,
            order_id,
        });
        Ok(())
    }

    // ── Market orders ───────────────────────────────────────────────

    /// Buy up to `size` shares of `outcome` at the best available prices
    ///
    /// Sweeps the opposite outcome's unified index from the top. Resting
    /// opposite-outcome bids mint new pairs (the taker's collateral leg
    /// completes the escrowed backing); resting asks transfer existing
    /// shares with the proceeds paid through to the ask maker. Returns the
    /// fulfilled size, which may be less than requested.
    pub fn market_buy(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        size: u128,
        outcome: Outcome,
    ) -> Result<u128, EngineError> {
        Self::validate_size(size)?;
        let idx = self.market_index(market_id)?;
        self.markets[idx].ensure_tradable(market_id)?;

        let plan = sweep::plan_market_buy(&self.markets[idx], outcome, size, self.mult)?;
        if !plan.taker_cost.is_zero() {
            self.ledger.debit(caller, plan.taker_cost)?;
        }

        let opposite = outcome.complement();
        for level_sweep in &plan.levels {
            {
                let book = self.markets[idx].side_mut(opposite);
                let level = book
                    .level_mut(level_sweep.tick)
                    .expect("planned level exists");
                level.reduce_total(level_sweep.taken);
                level.advance_head(level_sweep.next_index);
                if level_sweep.drained {
                    book.unified_mut().unset(level_sweep.tick);
                    book.bid_only_mut().unset(level_sweep.tick);
                }
            }
            if level_sweep.drained && level_sweep.taken > 0 {
                self.sink.record(MarketEvent::PriceLevelCleared {
                    market: market_id,
                    price: level_sweep.tick,
                    outcome: opposite,
                });
            }
            for fill in &level_sweep.fills {
                {
                    let book = self.markets[idx].side_mut(opposite);
                    let order = book
                        .level_mut(level_sweep.tick)
                        .expect("planned level exists")
                        .order_mut(fill.index)
                        .expect("planned fill index exists");
                    order.size -= fill.amount;
                    if fill.side == Side::Bid {
                        book.credit_shares(fill.maker, fill.amount);
                    }
                }
                if fill.side == Side::Ask {
                    self.ledger.credit(fill.maker, fill.proceeds);
                }
                let order_id = OrderId::derive(market_id, level_sweep.tick, fill.index);
                self.sink.record(MarketEvent::OrderFilled {
                    market: market_id,
                    maker: fill.maker,
                    order_id,
                    size: fill.amount,
                    taker: caller,
                });
                if fill.side == Side::Bid {
                    self.sink.record(MarketEvent::SharesTransferred {
                        market: market_id,
                        from: None,
                        to: fill.maker,
                        amount: fill.amount,
                        outcome: opposite,
                    });
                }
            }
            if !level_sweep.minted_collateral.is_zero() {
                self.markets[idx].add_collateral(level_sweep.minted_collateral);
            }
        }

        if plan.fulfilled > 0 {
            self.markets[idx]
                .side_mut(outcome)
                .credit_shares(caller, plan.fulfilled);
            self.sink.record(MarketEvent::MarketOrderExecuted {
                market: market_id,
                taker: caller,
                fulfilled: plan.fulfilled,
                outcome,
                side: Side::Bid,
            });
            self.sink.record(MarketEvent::SharesTransferred {
                market: market_id,
                from: None,
                to: caller,
                amount: plan.fulfilled,
                outcome,
            });
        }
        tracing::debug!(
            market = %market_id,
            taker = %caller,
            requested = size,
            fulfilled = plan.fulfilled,
            "market buy swept"
        );
        Ok(plan.fulfilled)
    }

    /// Sell up to `size` held shares of `outcome` into resting bids
    ///
    /// Sweeps the same outcome's bid-only index; asks at a level are never
    /// consumed. Returns the fulfilled size, which may be less than
    /// requested.
    pub fn market_sell(
        &mut self,
        caller: ParticipantId,
        market_id: MarketId,
        size: u128,
        outcome: Outcome,
    ) -> Result<u128, EngineError> {
        Self::validate_size(size)?;
        let idx = self.market_index(market_id)?;
        self.markets[idx].ensure_tradable(market_id)?;

        let available = self.markets[idx].side(outcome).balance(caller);
        if available < size {
            return Err(BalanceError::InsufficientShares {
                required: size,
                available,
            }
            .into());
        }

        let plan = sweep::plan_market_sell(&self.markets[idx], outcome, size, self.mult)?;

        for level_sweep in &plan.levels {
            {
                let book = self.markets[idx].side_mut(outcome);
                let level = book
                    .level_mut(level_sweep.tick)
                    .expect("planned level exists");
                level.reduce_total(level_sweep.taken);
                level.advance_head(level_sweep.next_index);
                if level_sweep.unset_bid_only {
                    book.bid_only_mut().unset(level_sweep.tick);
                }
            }
            for fill in &level_sweep.fills {
                {
                    let book = self.markets[idx].side_mut(outcome);
                    let order = book
                        .level_mut(level_sweep.tick)
                        .expect("planned level exists")
                        .order_mut(fill.index)
                        .expect("planned fill index exists");
                    order.size -= fill.amount;
                    book.credit_shares(fill.maker, fill.amount);
                }
                let order_id = OrderId::derive(market_id, level_sweep.tick, fill.index);
                self.sink.record(MarketEvent::OrderFilled {
                    market: market_id,
                    maker: fill.maker,
                    order_id,
                    size: fill.amount,
                    taker: caller,
                });
                self.sink.record(MarketEvent::SharesTransferred {
                    market: market_id,
                    from: Some(caller),
                    to: fill.maker,
                    amount: fill.amount,
                    outcome,
                });
            }
        }

        if plan.fulfilled > 0 {
            self.markets[idx]
                .side_mut(outcome)
                .debit_shares(caller, plan.fulfilled)
                .expect("share balance checked before the sweep");
            self.ledger.credit(caller, plan.taker_proceeds);
            self.sink.record(MarketEvent::MarketOrderExecuted {
                market: market_id,
                taker: caller,
                fulfilled: plan.fulfilled,
                outcome,
                side: Side::Ask,
            });
        }
        tracing::debug!(
            market = %market_id,
            taker = %caller,
            requested = size,
            fulfilled = plan.fulfilled,
            "market sell swept"
        );
        Ok(plan.fulfilled)
    }

    // ── Read queries ────────────────────────────────────────────────

    /// Top-of-book depth for one outcome: `(tick, resting size)` pairs,
    /// best tick first
    pub fn depth(
        &self,
        market_id: MarketId,
        outcome: Outcome,
        max_levels: usize,
    ) -> Vec<(u64, u128)> {
        let Some(market) = self.market(market_id) else {
            return Vec::new();
        };
        let book = market.side(outcome);
        let mut out = Vec::new();
        let mut bound = BPS;
        while out.len() < max_levels {
            let Some(tick) = book.unified().find_last_set(bound) else {
                break;
            };
            bound = tick.get();
            let total = book.level(tick).map(|l| l.total_size()).unwrap_or(0);
            if total > 0 {
                out.push((tick.get(), total));
            }
        }
        out
    }

    /// SHA-256 over the canonical engine state
    ///
    /// Two exchanges that processed the same accepted operations in the
    /// same order produce the same digest; used by replay verification.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"exchange.state.v1");
        hasher.update((self.markets.len() as u64).to_le_bytes());
        for market in &self.markets {
            hasher.update([market.is_active() as u8, market.is_resolved() as u8]);
            hasher.update([match market.outcome() {
                None => 0u8,
                Some(Outcome::Yes) => 1,
                Some(Outcome::No) => 2,
            }]);
            hasher.update(market.total_collateral().get().to_le_bytes());
            for outcome in [Outcome::Yes, Outcome::No] {
                let book = market.side(outcome);
                for words in [book.unified().as_words(), book.bid_only().as_words()] {
                    for word in words {
                        hasher.update(word.to_le_bytes());
                    }
                }
                for (tick, level) in book.levels() {
                    hasher.update(tick.get().to_le_bytes());
                    hasher.update(level.total_size().to_le_bytes());
                    hasher.update((level.next_order_index() as u64).to_le_bytes());
                    hasher.update((level.len() as u64).to_le_bytes());
                    for order in level.orders() {
                        hasher.update(order.maker.as_uuid().as_bytes());
                        hasher.update(order.size.to_le_bytes());
                        hasher.update([match order.side {
                            Side::Bid => 0u8,
                            Side::Ask => 1,
                        }]);
                    }
                }
                for (participant, amount) in book.balances() {
                    hasher.update(participant.as_uuid().as_bytes());
                    hasher.update(amount.to_le_bytes());
                }
            }
        }
        hasher.finalize().into()
    }

    // ── Internal helpers ────────────────────────────────────────────

    pub(crate) fn market_index(&self, id: MarketId) -> Result<usize, MarketError> {
        let idx = id.get() as usize;
        if idx < self.markets.len() {
            Ok(idx)
        } else {
            Err(MarketError::NotActive(id))
        }
    }

    fn validate_size(size: u128) -> Result<(), OrderError> {
        if size == 0 {
            Err(OrderError::InvalidSize)
        } else if size > MAX_ORDER_SIZE {
            Err(OrderError::SizeTooLarge {
                size,
                limit: MAX_ORDER_SIZE,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::SingleAdmin;
    use crate::events::RecordingSink;
    use crate::ledger::InMemoryLedger;

    const MULT: u128 = 1_000_000_000_000_000_000;

    type TestExchange = Exchange<InMemoryLedger, SingleAdmin, RecordingSink>;

    fn funded_exchange(participants: &[ParticipantId]) -> (TestExchange, ParticipantId) {
        let admin = ParticipantId::new();
        let mut ledger = InMemoryLedger::new();
        for p in participants {
            ledger.deposit(*p, Collateral::new(1_000 * MULT));
        }
        let mut exchange = Exchange::new(ledger, SingleAdmin::new(admin), RecordingSink::new(), 18);
        exchange.create_market(admin).unwrap();
        (exchange, admin)
    }

    #[test]
    fn test_limit_buy_debits_and_rests() {
        let bob = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[bob]);
        let market = MarketId::new(0);

        exchange
            .limit_buy(bob, market, 400, 100, Outcome::No)
            .unwrap();

        assert_eq!(
            exchange.ledger().balance_of(bob),
            Collateral::new(1_000 * MULT - 40 * MULT)
        );
        assert_eq!(exchange.ledger().escrow(), Collateral::new(40 * MULT));
        let book = exchange.market(market).unwrap().side(Outcome::No);
        assert!(book.unified().contains(Price::new(400)));
        assert!(book.bid_only().contains(Price::new(400)));
        assert_eq!(book.level(Price::new(400)).unwrap().total_size(), 100);
    }

    #[test]
    fn test_limit_buy_validation_order() {
        let bob = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[bob]);
        let market = MarketId::new(0);

        assert_eq!(
            exchange.limit_buy(bob, market, 0, 100, Outcome::No),
            Err(OrderError::InvalidPrice.into())
        );
        assert_eq!(
            exchange.limit_buy(bob, market, 1000, 100, Outcome::No),
            Err(OrderError::PriceTooHigh {
                price: 1000,
                max: 999
            }
            .into())
        );
        assert_eq!(
            exchange.limit_buy(bob, market, 400, 0, Outcome::No),
            Err(OrderError::InvalidSize.into())
        );
        assert!(matches!(
            exchange.limit_buy(bob, market, 400, MAX_ORDER_SIZE + 1, Outcome::No),
            Err(EngineError::Order(OrderError::SizeTooLarge { .. }))
        ));
        // Unknown market
        assert_eq!(
            exchange.limit_buy(bob, MarketId::new(9), 400, 100, Outcome::No),
            Err(MarketError::NotActive(MarketId::new(9)).into())
        );
        // Nothing moved
        assert_eq!(exchange.ledger().escrow(), Collateral::ZERO);
    }

    #[test]
    fn test_limit_buy_insufficient_funds_no_side_effects() {
        let pauper = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[]);
        let market = MarketId::new(0);

        let err = exchange
            .limit_buy(pauper, market, 400, 100, Outcome::No)
            .unwrap_err();
        assert!(matches!(err, EngineError::Ledger(_)));
        let book = exchange.market(market).unwrap().side(Outcome::No);
        assert!(book.level(Price::new(400)).is_none());
        assert!(book.unified().is_empty());
        // Only the creation event was recorded
        assert_eq!(exchange.sink().events().len(), 1);
    }

    #[test]
    fn test_limit_sell_requires_shares() {
        let alice = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[alice]);
        let market = MarketId::new(0);

        let err = exchange
            .limit_sell(alice, market, 600, 50, Outcome::Yes)
            .unwrap_err();
        assert_eq!(
            err,
            BalanceError::InsufficientShares {
                required: 50,
                available: 0
            }
            .into()
        );
    }

    #[test]
    fn test_limit_sell_rests_inverted() {
        let alice = ParticipantId::new();
        let bob = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[alice, bob]);
        let market = MarketId::new(0);

        // Mint 100 pairs so alice holds Yes
        exchange
            .limit_buy(bob, market, 400, 100, Outcome::No)
            .unwrap();
        exchange
            .market_buy(alice, market, 100, Outcome::Yes)
            .unwrap();

        exchange
            .limit_sell(alice, market, 600, 50, Outcome::Yes)
            .unwrap();

        // Shares escrowed
        assert_eq!(
            exchange.market(market).unwrap().side(Outcome::Yes).balance(alice),
            50
        );
        // Stored on the No book at the complement tick, unified only
        let no_book = exchange.market(market).unwrap().side(Outcome::No);
        assert!(no_book.unified().contains(Price::new(400)));
        assert!(!no_book.bid_only().contains(Price::new(400)));
        let level = no_book.level(Price::new(400)).unwrap();
        assert_eq!(level.total_size(), 50);
        assert_eq!(level.orders()[level.len() - 1].side, Side::Ask);
    }

    #[test]
    fn test_depth_reports_best_first() {
        let bob = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[bob]);
        let market = MarketId::new(0);

        for (price, size) in [(500u64, 30u128), (400, 50), (600, 20)] {
            exchange
                .limit_buy(bob, market, price, size, Outcome::No)
                .unwrap();
        }

        let depth = exchange.depth(market, Outcome::No, 2);
        assert_eq!(depth, vec![(600, 20), (500, 30)]);
    }

    #[test]
    fn test_state_digest_distinguishes_states() {
        let bob = ParticipantId::new();
        let (mut exchange, _) = funded_exchange(&[bob]);
        let market = MarketId::new(0);
        let before = exchange.state_digest();

        exchange
            .limit_buy(bob, market, 400, 100, Outcome::No)
            .unwrap();
        let after = exchange.state_digest();
        assert_ne!(before, after);
        assert_eq!(after, exchange.state_digest());
    }
}
