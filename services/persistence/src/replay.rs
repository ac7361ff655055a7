//! Journal replay
//!
//! Rebuilds engine state by re-applying every journaled operation in
//! sequence. The journal only ever holds accepted operations, so a
//! rejection during replay means the journal does not match the engine
//! configuration it is being replayed into — that is an error, not
//! something to skip.

use std::path::Path;
use thiserror::Error;

use matching_engine::admin::AdminAuthority;
use matching_engine::events::EventSink;
use matching_engine::ledger::InMemoryLedger;
use matching_engine::Exchange;
use types::errors::EngineError;

use crate::journal::{JournalError, JournalReader};

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("operation at sequence {sequence} was rejected on replay: {source}")]
    Rejected {
        sequence: u64,
        source: EngineError,
    },
}

/// Re-apply every journaled operation into `exchange`
///
/// Returns the number of operations applied. The exchange must be fresh
/// and configured identically (admin, collateral decimals) to the one that
/// produced the journal.
pub fn replay_into<A, S>(
    path: impl AsRef<Path>,
    exchange: &mut Exchange<InMemoryLedger, A, S>,
) -> Result<u64, ReplayError>
where
    A: AdminAuthority,
    S: EventSink,
{
    let entries = JournalReader::open(path)?.read_all()?;
    let mut applied = 0u64;
    for entry in &entries {
        let op = entry.operation()?;
        op.apply(exchange).map_err(|source| ReplayError::Rejected {
            sequence: entry.sequence,
            source,
        })?;
        applied += 1;
    }
    Ok(applied)
}
