//! Collateral ledger boundary
//!
//! The engine never touches the collateral asset directly; it moves value
//! between participant accounts and its own escrow pool through this trait.
//! `debit` is the only fallible call, and the engine always issues it before
//! mutating any book state, so a rejected debit aborts the whole operation
//! with no side effects.

use std::collections::BTreeMap;

use types::errors::LedgerError;
use types::ids::ParticipantId;
use types::numeric::Collateral;

/// Moves collateral between participant accounts and the engine escrow
pub trait CollateralLedger {
    /// Move `amount` from `from`'s spendable balance into engine escrow
    fn debit(&mut self, from: ParticipantId, amount: Collateral) -> Result<(), LedgerError>;

    /// Move `amount` from engine escrow to `to`'s spendable balance
    ///
    /// Infallible from the engine's standpoint: escrow always covers it
    /// when the accounting invariants hold.
    fn credit(&mut self, to: ParticipantId, amount: Collateral);

    /// Move `amount` directly between two participant accounts
    fn transfer_within(
        &mut self,
        from: ParticipantId,
        to: ParticipantId,
        amount: Collateral,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }
}

/// Reference in-memory ledger
///
/// Holds spendable balances per participant plus the engine escrow pool.
/// Escrow underflow means the engine's accounting is broken, which is not a
/// recoverable condition; it fails the process instead of returning an
/// error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: BTreeMap<ParticipantId, Collateral>,
    escrow: Collateral,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fund a participant's spendable balance from outside
    pub fn deposit(&mut self, to: ParticipantId, amount: Collateral) {
        let entry = self.balances.entry(to).or_insert(Collateral::ZERO);
        *entry = *entry + amount;
    }

    /// Spendable balance of one participant
    pub fn balance_of(&self, participant: ParticipantId) -> Collateral {
        self.balances
            .get(&participant)
            .copied()
            .unwrap_or(Collateral::ZERO)
    }

    /// Total collateral held in engine escrow
    pub fn escrow(&self) -> Collateral {
        self.escrow
    }
}

impl CollateralLedger for InMemoryLedger {
    fn debit(&mut self, from: ParticipantId, amount: Collateral) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        self.escrow = self.escrow + amount;
        Ok(())
    }

    fn credit(&mut self, to: ParticipantId, amount: Collateral) {
        self.escrow = self
            .escrow
            .checked_sub(amount)
            .expect("escrow underflow: engine accounting is inconsistent");
        let entry = self.balances.entry(to).or_insert(Collateral::ZERO);
        *entry = *entry + amount;
    }
}
