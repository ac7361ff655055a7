//! Error taxonomy for the matching engine
//!
//! Every operation validates before it mutates: a returned error implies
//! exactly zero side effects (no events, no ledger movement, no book
//! change).

use crate::ids::MarketId;
use crate::numeric::Collateral;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("market error: {0}")]
    Market(#[from] MarketError),

    #[error("balance error: {0}")]
    Balance(#[from] BalanceError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("unauthorized")]
    Unauthorized,
}

/// Order validation and addressing errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderError {
    #[error("price tick must be nonzero")]
    InvalidPrice,

    #[error("price tick {price} exceeds maximum {max}")]
    PriceTooHigh { price: u64, max: u64 },

    #[error("size must be nonzero")]
    InvalidSize,

    #[error("size {size} exceeds per-order limit {limit}")]
    SizeTooLarge { size: u128, limit: u128 },

    #[error("no matching order at price {price}, index {index}")]
    NotFound { price: u64, index: usize },
}

/// Market lifecycle errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketError {
    #[error("market {0} does not exist or is not active")]
    NotActive(MarketId),

    #[error("market {0} is already resolved")]
    AlreadyResolved(MarketId),

    #[error("market {0} is not yet resolved")]
    NotResolved(MarketId),
}

/// Share balance errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceError {
    #[error("insufficient shares: required {required}, available {available}")]
    InsufficientShares { required: u128, available: u128 },
}

/// Collateral ledger errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient collateral: required {required}, available {available}")]
    InsufficientFunds {
        required: Collateral,
        available: Collateral,
    },

    #[error("arithmetic overflow in collateral computation")]
    Overflow,
}
