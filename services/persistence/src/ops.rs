//! The journaled operation set
//!
//! Every mutation accepted by the exchange is one of these records:
//! the nine engine operations plus `Deposit`, which funds a participant's
//! spendable balance on the reference ledger. Replaying the records in
//! sequence against a fresh exchange reproduces ledger and book state
//! together.

use serde::{Deserialize, Serialize};

use matching_engine::admin::AdminAuthority;
use matching_engine::events::EventSink;
use matching_engine::ledger::InMemoryLedger;
use matching_engine::Exchange;
use types::errors::EngineError;
use types::ids::{MarketId, ParticipantId};
use types::numeric::Collateral;
use types::outcome::{Outcome, Side};

/// One accepted operation, as written to the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Deposit {
        participant: ParticipantId,
        amount: Collateral,
    },
    CreateMarket {
        caller: ParticipantId,
    },
    ResolveMarket {
        caller: ParticipantId,
        market: MarketId,
        outcome: Outcome,
    },
    Claim {
        caller: ParticipantId,
        market: MarketId,
    },
    LimitBuy {
        caller: ParticipantId,
        market: MarketId,
        price: u64,
        size: u128,
        outcome: Outcome,
    },
    LimitSell {
        caller: ParticipantId,
        market: MarketId,
        price: u64,
        size: u128,
        outcome: Outcome,
    },
    MarketBuy {
        caller: ParticipantId,
        market: MarketId,
        size: u128,
        outcome: Outcome,
    },
    MarketSell {
        caller: ParticipantId,
        market: MarketId,
        size: u128,
        outcome: Outcome,
    },
    Cancel {
        caller: ParticipantId,
        market: MarketId,
        price: u64,
        index: usize,
        side: Side,
        outcome: Outcome,
    },
}

impl Operation {
    /// Apply this operation to an exchange backed by the reference ledger
    pub fn apply<A, S>(&self, exchange: &mut Exchange<InMemoryLedger, A, S>) -> Result<(), EngineError>
    where
        A: AdminAuthority,
        S: EventSink,
    {
        match *self {
            Operation::Deposit {
                participant,
                amount,
            } => {
                exchange.ledger_mut().deposit(participant, amount);
                Ok(())
            }
            Operation::CreateMarket { caller } => exchange.create_market(caller).map(|_| ()),
            Operation::ResolveMarket {
                caller,
                market,
                outcome,
            } => exchange.resolve_market(caller, market, outcome),
            Operation::Claim { caller, market } => exchange.claim(caller, market).map(|_| ()),
            Operation::LimitBuy {
                caller,
                market,
                price,
                size,
                outcome,
            } => exchange
                .limit_buy(caller, market, price, size, outcome)
                .map(|_| ()),
            Operation::LimitSell {
                caller,
                market,
                price,
                size,
                outcome,
            } => exchange
                .limit_sell(caller, market, price, size, outcome)
                .map(|_| ()),
            Operation::MarketBuy {
                caller,
                market,
                size,
                outcome,
            } => exchange
                .market_buy(caller, market, size, outcome)
                .map(|_| ()),
            Operation::MarketSell {
                caller,
                market,
                size,
                outcome,
            } => exchange
                .market_sell(caller, market, size, outcome)
                .map(|_| ()),
            Operation::Cancel {
                caller,
                market,
                price,
                index,
                side,
                outcome,
            } => exchange.cancel(caller, market, price, index, side, outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_serialization_roundtrip() {
        let op = Operation::LimitBuy {
            caller: ParticipantId::new(),
            market: MarketId::new(0),
            price: 400,
            size: 100,
            outcome: Outcome::No,
        };
        let json = serde_json::to_string(&op).unwrap();
        assert!(json.contains("\"op\":\"limit_buy\""));
        let decoded: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, decoded);
    }

    #[test]
    fn test_deposit_serialization() {
        let op = Operation::Deposit {
            participant: ParticipantId::new(),
            amount: Collateral::new(1_000_000_000_000_000_000_000),
        };
        let json = serde_json::to_string(&op).unwrap();
        let decoded: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, decoded);
    }
}
