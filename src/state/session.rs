use indexmap::IndexSet;

use crate::{
    dao::models::SessionRecordEntity,
    state::{
        game::{MovieId, PuzzleId},
        status::{GameRules, SessionStatus, derive_status},
    },
};

/// Result of confirming a guessed movie as correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectRegistration {
    /// The movie joined the correct set.
    Registered,
    /// The movie was already in the correct set; nothing changed.
    AlreadyRegistered,
    /// The movie was never submitted as a guess and cannot be correct.
    NotGuessed,
}

/// Mutable state of one player's attempt at one puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSession {
    puzzle_id: PuzzleId,
    guesses: Vec<MovieId>,
    correct: IndexSet<MovieId>,
    status: SessionStatus,
    rules: GameRules,
}

impl PuzzleSession {
    /// Start a fresh session with no guesses.
    pub fn new(puzzle_id: PuzzleId, rules: GameRules) -> Self {
        Self::restore(puzzle_id, Vec::new(), SessionStatus::default(), rules)
    }

    /// Rebuild a session from previously persisted guesses and flags.
    ///
    /// The correct set starts empty; callers re-confirm restored guesses. Persisted
    /// flags are kept even when the restored guesses alone would not set them.
    pub fn restore(
        puzzle_id: PuzzleId,
        guesses: Vec<MovieId>,
        persisted: SessionStatus,
        rules: GameRules,
    ) -> Self {
        let mut session = Self {
            puzzle_id,
            guesses,
            correct: IndexSet::new(),
            status: persisted,
            rules,
        };
        session.refresh_status();
        session
    }

    /// Identifier of the puzzle this session plays.
    pub fn puzzle_id(&self) -> &PuzzleId {
        &self.puzzle_id
    }

    /// Submitted guesses in submission order, duplicates included.
    pub fn guesses(&self) -> &[MovieId] {
        &self.guesses
    }

    /// Movies confirmed correct, in confirmation order.
    pub fn correct_guesses(&self) -> &IndexSet<MovieId> {
        &self.correct
    }

    /// Current win/loss flags.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Guesses left before the loss threshold.
    pub fn remaining_guesses(&self) -> usize {
        self.rules.max_guesses.saturating_sub(self.guesses.len())
    }

    /// Append a guess. Guesses are accepted even once the session is finished.
    pub fn submit_guess(&mut self, movie: MovieId) -> SessionStatus {
        self.guesses.push(movie);
        self.refresh_status()
    }

    /// Add a guessed movie to the correct set, de-duplicated by identifier.
    pub fn register_correct(&mut self, movie: MovieId) -> CorrectRegistration {
        if !self.guesses.contains(&movie) {
            return CorrectRegistration::NotGuessed;
        }
        if !self.correct.insert(movie) {
            return CorrectRegistration::AlreadyRegistered;
        }
        self.refresh_status();
        CorrectRegistration::Registered
    }

    fn refresh_status(&mut self) -> SessionStatus {
        let derived = derive_status(&self.guesses, &self.correct, &self.rules);
        self.status = self.status.merge(derived);
        self.status
    }
}

impl From<&PuzzleSession> for SessionRecordEntity {
    fn from(session: &PuzzleSession) -> Self {
        Self {
            id: session.puzzle_id.clone(),
            guesses: session.guesses.clone(),
            won: session.status.won,
            lost: session.status.lost,
        }
    }
}
