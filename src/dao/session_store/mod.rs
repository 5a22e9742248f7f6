#[cfg(feature = "file-store")]
pub mod file;
pub mod memory;

use crate::dao::storage::StorageResult;
use crate::state::game::PuzzleId;

#[cfg(feature = "file-store")]
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// Device-local key-value store holding one serialized session record per puzzle.
///
/// Reads and writes are synchronous; a write replaces any previous value for the key.
pub trait SessionStore: Send + Sync {
    /// Raw JSON stored for the puzzle, if any.
    fn get(&self, id: &PuzzleId) -> StorageResult<Option<String>>;
    /// Store raw JSON for the puzzle, overwriting the previous value.
    fn set(&self, id: &PuzzleId, payload: &str) -> StorageResult<()>;
}
