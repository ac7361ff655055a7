//! Read-only sweep planning for market orders
//!
//! A buy sweep descends the opposite outcome's *unified* index, consuming
//! bids (minting new pairs) and asks (transferring existing shares) in FIFO
//! order within each level. A sell sweep descends the same outcome's
//! *bid-only* index and consumes bids exclusively; asks encountered on the
//! way are skipped and pin the level's head pointer in place.
//!
//! Planning never touches the market. The plan records, per level: the
//! fills, the aggregate consumed size, the mint tally and its two collateral
//! legs, the new head index, and which ticks to clear.

use types::errors::{EngineError, LedgerError};
use types::ids::ParticipantId;
use types::numeric::{Collateral, Price, BPS};
use types::outcome::{Outcome, Side};

use crate::market::Market;

/// One order fill within a level
#[derive(Debug, Clone)]
pub(crate) struct Fill {
    pub index: usize,
    pub maker: ParticipantId,
    pub amount: u128,
    pub side: Side,
    /// Transfer-path proceeds owed to the ask maker (buy sweeps only)
    pub proceeds: Collateral,
}

/// Planned effects for one visited level
#[derive(Debug, Clone)]
pub(crate) struct LevelSweep {
    pub tick: Price,
    pub fills: Vec<Fill>,
    /// Total size consumed at this level
    pub taken: u128,
    /// Bid-consumed size at this level (buy sweeps: freshly minted pairs)
    pub minted: u128,
    /// Taker's collateral leg for the mints at this tick
    pub mint_cost: Collateral,
    /// Full backing added to the market for the mints: `minted * MULT`
    pub minted_collateral: Collateral,
    /// New `next_order_index` for the level
    pub next_index: usize,
    /// Buy sweeps: the level's total size reached zero
    pub drained: bool,
    /// Sell sweeps: the bid scan was exhausted, clear the bid-only tick
    pub unset_bid_only: bool,
}

/// Complete plan for one market order
#[derive(Debug, Clone, Default)]
pub(crate) struct SweepPlan {
    pub levels: Vec<LevelSweep>,
    pub fulfilled: u128,
    /// Buy sweeps: debited from the taker in one settlement
    pub taker_cost: Collateral,
    /// Sell sweeps: credited to the taker in one settlement
    pub taker_proceeds: Collateral,
}

fn add(a: Collateral, b: Collateral) -> Result<Collateral, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Plan a market buy of `size` shares of `outcome`
///
/// Descends the opposite outcome's unified index. A level whose total size
/// is consumed entirely (including one left stale-empty by an earlier sell)
/// has both its ticks cleared; only a level that actually gave up size
/// records a clear event.
pub(crate) fn plan_market_buy(
    market: &Market,
    outcome: Outcome,
    size: u128,
    mult: u128,
) -> Result<SweepPlan, EngineError> {
    let book = market.side(outcome.complement());
    let mut plan = SweepPlan::default();
    let mut remaining = size;
    let mut bound = BPS;

    while remaining > 0 {
        let Some(tick) = book.unified().find_last_set(bound) else {
            break;
        };
        bound = tick.get();
        let level = book.level(tick).expect("unified tick has a level");

        let total = level.total_size();
        let cleared_here = remaining.min(total);
        let mut sweep = LevelSweep {
            tick,
            fills: Vec::new(),
            taken: cleared_here,
            minted: 0,
            mint_cost: Collateral::ZERO,
            minted_collateral: Collateral::ZERO,
            next_index: level.next_order_index(),
            drained: cleared_here == total,
            unset_bid_only: false,
        };

        let mut level_remaining = cleared_here;
        let orders = level.orders();
        let mut i = level.next_order_index();
        while i < orders.len() && level_remaining > 0 {
            let order = &orders[i];
            if order.size == 0 {
                i += 1;
                continue;
            }
            let consumed = order.size.min(level_remaining);
            level_remaining -= consumed;
            let proceeds = match order.side {
                Side::Bid => {
                    sweep.minted += consumed;
                    Collateral::ZERO
                }
                // Ask makers quoted BPS - tick; they receive it per share
                Side::Ask => tick.complement().cost(consumed, mult)?,
            };
            sweep.fills.push(Fill {
                index: i,
                maker: order.maker,
                amount: consumed,
                side: order.side,
                proceeds,
            });
            plan.taker_cost = add(plan.taker_cost, proceeds)?;
            if level_remaining == 0 {
                // The head stays put even when this order emptied; its zero
                // size makes later scans skip it.
                break;
            }
            sweep.next_index = i + 1;
            i += 1;
        }

        if sweep.minted > 0 {
            sweep.mint_cost = tick.complement().cost(sweep.minted, mult)?;
            sweep.minted_collateral = Collateral::new(
                sweep.minted.checked_mul(mult).ok_or(LedgerError::Overflow)?,
            );
            plan.taker_cost = add(plan.taker_cost, sweep.mint_cost)?;
        }

        remaining -= cleared_here;
        plan.fulfilled += cleared_here;
        plan.levels.push(sweep);
    }

    Ok(plan)
}

/// Plan a market sell of `size` shares of `outcome`
///
/// Descends the same outcome's bid-only index. Asks at a level are never
/// consumed; skipping one pins the head pointer for the rest of the pass.
/// A level whose bid scan is exhausted has its bid-only tick cleared even
/// when asks remain, so the outer loop cannot revisit it; the unified tick
/// is left alone.
pub(crate) fn plan_market_sell(
    market: &Market,
    outcome: Outcome,
    size: u128,
    mult: u128,
) -> Result<SweepPlan, EngineError> {
    let book = market.side(outcome);
    let mut plan = SweepPlan::default();
    let mut remaining = size;
    let mut bound = BPS;

    while remaining > 0 {
        let Some(tick) = book.bid_only().find_last_set(bound) else {
            break;
        };
        bound = tick.get();
        let level = book.level(tick).expect("bid-only tick has a level");

        let mut sweep = LevelSweep {
            tick,
            fills: Vec::new(),
            taken: 0,
            minted: 0,
            mint_cost: Collateral::ZERO,
            minted_collateral: Collateral::ZERO,
            next_index: level.next_order_index(),
            drained: false,
            unset_bid_only: true,
        };

        let mut saw_ask = false;
        let orders = level.orders();
        let mut i = level.next_order_index();
        while i < orders.len() {
            let order = &orders[i];
            if order.size == 0 {
                i += 1;
                continue;
            }
            if order.side == Side::Ask {
                saw_ask = true;
                i += 1;
                continue;
            }
            let consumed = order.size.min(remaining);
            remaining -= consumed;
            sweep.taken += consumed;
            sweep.fills.push(Fill {
                index: i,
                maker: order.maker,
                amount: consumed,
                side: Side::Bid,
                proceeds: Collateral::ZERO,
            });
            plan.taker_proceeds = add(plan.taker_proceeds, tick.cost(consumed, mult)?)?;
            if remaining == 0 {
                // Filled mid-level: the bid-only tick stays set; a live bid
                // may still rest here.
                sweep.unset_bid_only = false;
                break;
            }
            if !saw_ask {
                sweep.next_index = i + 1;
            }
            i += 1;
        }

        plan.fulfilled += sweep.taken;
        plan.levels.push(sweep);
    }

    Ok(plan)
}
