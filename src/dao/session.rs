use std::sync::Arc;

use tracing::warn;

use crate::{
    dao::{
        models::SessionRecordEntity,
        session_store::SessionStore,
        storage::{StorageError, StorageResult},
    },
    error::SessionError,
    state::game::PuzzleId,
};

/// Typed access to session records stored as JSON text.
#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn SessionStore>,
}

impl SessionRepository {
    /// Wrap a raw store.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Fetch the record stored for a puzzle.
    ///
    /// Unreadable or malformed records are logged and reported as absent.
    pub fn load(&self, id: &PuzzleId) -> Option<SessionRecordEntity> {
        match self.try_load(id) {
            Ok(record) => record,
            Err(err @ SessionError::PersistenceCorrupt { .. }) => {
                warn!(puzzle_id = %id, error = %err, "discarding corrupt session record");
                None
            }
            Err(err) => {
                warn!(puzzle_id = %id, error = %err, "failed to read session record");
                None
            }
        }
    }

    /// Upsert the record under its puzzle id, replacing any previous state.
    pub fn save(&self, record: &SessionRecordEntity) -> StorageResult<()> {
        let payload = serde_json::to_string(record).map_err(|source| {
            StorageError::unavailable(
                format!("failed to encode session record `{}`", record.id),
                source,
            )
        })?;
        self.store.set(&record.id, &payload)
    }

    fn try_load(&self, id: &PuzzleId) -> Result<Option<SessionRecordEntity>, SessionError> {
        let Some(payload) = self.store.get(id)? else {
            return Ok(None);
        };

        serde_json::from_str(&payload)
            .map(Some)
            .map_err(|source| SessionError::PersistenceCorrupt {
                id: id.clone(),
                source,
            })
    }
}
