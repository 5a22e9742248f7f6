use dashmap::DashMap;

use crate::{
    dao::{session_store::SessionStore, storage::StorageResult},
    state::game::PuzzleId,
};

/// In-process store that forgets everything on drop.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<PuzzleId, String>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &PuzzleId) -> StorageResult<Option<String>> {
        Ok(self.entries.get(id).map(|entry| entry.value().clone()))
    }

    fn set(&self, id: &PuzzleId, payload: &str) -> StorageResult<()> {
        self.entries.insert(id.clone(), payload.to_owned());
        Ok(())
    }
}
