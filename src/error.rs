use thiserror::Error;

use crate::{dao::storage::StorageError, providers::ProviderError, state::game::PuzzleId};

/// Errors surfaced by the puzzle session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The puzzle could not be fetched or had an invalid shape.
    #[error("puzzle unavailable")]
    PuzzleUnavailable(#[source] ProviderError),
    /// The genre list could not be fetched; enrichment is skipped.
    #[error("genre list unavailable")]
    GenreUnavailable(#[source] ProviderError),
    /// A stored session record failed to parse.
    #[error("corrupt session record for puzzle `{id}`")]
    PersistenceCorrupt {
        /// Puzzle whose record is corrupt.
        id: PuzzleId,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The session store could not be reached.
    #[error("session storage failed")]
    Storage(#[from] StorageError),
    /// No puzzle has been loaded yet.
    #[error("no puzzle is loaded")]
    NotLoaded,
}
