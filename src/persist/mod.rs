/// In-process snapshot store.
pub mod memory;
/// SQLite snapshot store.
pub mod sqlite;

use thiserror::Error;
use tracing::{info, warn};

use crate::core::{
    ledger::{Ledger, LedgerConfig, Snapshot},
    seed::demo_roster,
};

/// Snapshot store failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The SQLite connection or statement failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A snapshot could not be encoded or decoded as JSON.
    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Any other store failure, described in text.
    #[error("{0}")]
    Message(String),
}

/// Result alias for store operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Key-value store holding whole-ledger snapshots.
pub trait SnapshotStore: Send {
    /// Returns the snapshot stored under `key`, if any.
    fn load(&self, key: &str) -> PersistResult<Option<Snapshot>>;
    /// Replaces whatever is stored under `key` with `snapshot`.
    fn save(&mut self, key: &str, snapshot: &Snapshot) -> PersistResult<()>;
}

/// Outcome of [`initialize`].
#[derive(Debug)]
pub struct Initialized {
    /// The loaded or freshly seeded ledger.
    pub ledger: Ledger,
    /// True when the demo roster was seeded because nothing was stored.
    pub seeded: bool,
    /// Set when the seeded roster could not be written back. The ledger is
    /// still usable; the seed is only in memory.
    pub seed_error: Option<PersistError>,
}

/// Loads the ledger stored under `key`, seeding and saving the demo roster
/// when nothing is stored yet.
///
/// A failed load is an error. A failed seed save is not: the seeded ledger
/// is returned with [`Initialized::seed_error`] set.
pub fn initialize(
    store: &mut dyn SnapshotStore,
    key: &str,
    config: LedgerConfig,
) -> PersistResult<Initialized> {
    if let Some(snapshot) = store.load(key)? {
        return Ok(Initialized {
            ledger: Ledger::from_snapshot(snapshot, config),
            seeded: false,
            seed_error: None,
        });
    }

    let snapshot = Snapshot {
        players: demo_roster(),
        match_history: Vec::new(),
    };
    let seed_error = match store.save(key, &snapshot) {
        Ok(()) => {
            info!(key, players = snapshot.players.len(), "seeded demo roster");
            None
        }
        Err(err) => {
            warn!(key, error = %err, "seeded demo roster could not be saved");
            Some(err)
        }
    };
    Ok(Initialized {
        ledger: Ledger::from_snapshot(snapshot, config),
        seeded: true,
        seed_error,
    })
}
