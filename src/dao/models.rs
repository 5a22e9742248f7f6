use serde::{Deserialize, Serialize};

use crate::{
    dao::guess_list,
    state::game::{MovieId, PuzzleId},
};

/// Persisted state of one puzzle attempt, keyed by puzzle id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecordEntity {
    /// Puzzle the record belongs to.
    pub id: PuzzleId,
    /// Submitted guesses in submission order.
    #[serde(deserialize_with = "guess_list::deserialize")]
    pub guesses: Vec<MovieId>,
    /// Whether the session was won when the record was written.
    pub won: bool,
    /// Whether the session was lost when the record was written.
    pub lost: bool,
}
