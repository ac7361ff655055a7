//! Application state: the engine behind a single-writer lock
//!
//! Every mutating request takes the lock for the whole operation, which
//! gives the serializable per-market execution the engine contract asks
//! for. Accepted operations are appended to the journal so a restart with
//! the same `EXCHANGE_ADMIN` replays back to identical state.

use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use matching_engine::admin::SingleAdmin;
use matching_engine::events::NullSink;
use matching_engine::ledger::InMemoryLedger;
use matching_engine::Exchange;
use persistence::{replay_into, JournalConfig, JournalWriter, Operation};
use types::ids::ParticipantId;

pub type Engine = Exchange<InMemoryLedger, SingleAdmin, NullSink>;

pub struct Shared {
    pub engine: Engine,
    journal: JournalWriter,
}

impl Shared {
    /// Append an operation the engine just accepted
    pub fn journal(&mut self, op: &Operation) {
        if let Err(err) = self.journal.append(op) {
            tracing::error!(%err, "failed to journal accepted operation");
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<Mutex<Shared>>,
}

impl AppState {
    /// Build state from the environment
    ///
    /// - `EXCHANGE_ADMIN`: admin participant UUID (generated when unset)
    /// - `EXCHANGE_JOURNAL`: journal path (default `exchange.journal`)
    /// - `EXCHANGE_DECIMALS`: collateral decimals (default 18)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let admin = match std::env::var("EXCHANGE_ADMIN") {
            Ok(raw) => ParticipantId::from_uuid(raw.parse::<Uuid>()?),
            Err(_) => {
                let generated = ParticipantId::new();
                tracing::warn!(admin = %generated, "EXCHANGE_ADMIN not set, generated one");
                generated
            }
        };
        let journal_path =
            std::env::var("EXCHANGE_JOURNAL").unwrap_or_else(|_| "exchange.journal".to_string());
        let decimals: u32 = std::env::var("EXCHANGE_DECIMALS")
            .ok()
            .and_then(|d| d.parse().ok())
            .unwrap_or(18);

        let mut engine = Exchange::new(
            InMemoryLedger::new(),
            SingleAdmin::new(admin),
            NullSink,
            decimals,
        );
        if std::path::Path::new(&journal_path).exists() {
            let applied = replay_into(&journal_path, &mut engine)?;
            tracing::info!(applied, path = %journal_path, "journal replayed");
        }
        let journal = JournalWriter::open(JournalConfig::new(&journal_path))?;

        Ok(Self {
            shared: Arc::new(Mutex::new(Shared { engine, journal })),
        })
    }
}
