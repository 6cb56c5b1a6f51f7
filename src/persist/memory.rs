//! In-process snapshot store.

use std::sync::{Arc, Mutex};

use hashbrown::HashMap;

use crate::core::ledger::Snapshot;

use super::{PersistError, PersistResult, SnapshotStore};

/// Snapshot store backed by a shared map of serialized payloads.
///
/// Clones share the same map, so a clone kept outside a runtime observes
/// every save made through it.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialized payload currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().ok()?.get(key).cloned()
    }

    fn lock(&self) -> PersistResult<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| PersistError::Message("memory store lock poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> PersistResult<Option<Snapshot>> {
        let entries = self.lock()?;
        let Some(payload) = entries.get(key) else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(payload)?))
    }

    fn save(&mut self, key: &str, snapshot: &Snapshot) -> PersistResult<()> {
        let payload = serde_json::to_vec(snapshot)?;
        self.lock()?.insert(key.to_string(), payload);
        Ok(())
    }
}
