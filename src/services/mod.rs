/// Puzzle loading and guess handling on top of the shared session manager.
pub mod game_service;

pub use game_service::{GameService, GuessOutcome};
