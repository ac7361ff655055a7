//! Persistence for the exchange: an append-only journal of accepted
//! operations, and replay that reconstructs identical engine state.
//!
//! Only operations the engine *accepted* are journaled, so a replay that
//! hits a rejection means the journal and the engine configuration have
//! diverged — that is surfaced as an error, never skipped.

pub mod journal;
pub mod ops;
pub mod replay;

pub use journal::{JournalConfig, JournalEntry, JournalError, JournalReader, JournalWriter};
pub use ops::Operation;
pub use replay::{replay_into, ReplayError};
