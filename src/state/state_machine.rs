use tracing::{debug, info, warn};

use crate::{
    dao::{models::SessionRecordEntity, session::SessionRepository},
    error::SessionError,
    providers::{ProviderResult, PuzzleRequest},
    state::{
        game::{Genre, GenreMap, MovieId, Puzzle, PuzzleId},
        session::{CorrectRegistration, PuzzleSession},
        status::{GameRules, SessionStatus},
    },
};

/// High-level phases of the session manager.
///
/// Won and lost are not phases: they are independent flags of [`SessionStatus`]
/// carried by an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No puzzle is applied yet, or the last load failed.
    Loading,
    /// A puzzle is loaded and guesses are accepted.
    Active,
}

/// Tag identifying one load request.
///
/// Responses are applied only while their ticket is the most recent one issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    request: PuzzleRequest,
}

impl LoadTicket {
    /// Monotonic counter of the load this ticket belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Puzzle requested by this load.
    pub fn request(&self) -> &PuzzleRequest {
        &self.request
    }
}

/// What happened to a puzzle response handed to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The puzzle became the active session.
    Ready {
        /// Identifier of the loaded puzzle.
        puzzle_id: PuzzleId,
        /// Guesses adopted from a persisted record.
        restored_guesses: usize,
    },
    /// The response belongs to a superseded request and was dropped.
    Stale,
}

/// Snapshot of the manager state for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase.
    pub phase: SessionPhase,
    /// Active puzzle, if any.
    pub puzzle_id: Option<PuzzleId>,
    /// Submitted guesses in order.
    pub guesses: Vec<MovieId>,
    /// Movies confirmed correct, in confirmation order.
    pub correct_guesses: Vec<MovieId>,
    /// Win/loss flags.
    pub status: SessionStatus,
    /// Guesses left before the loss threshold.
    pub remaining_guesses: usize,
}

/// Owns the authoritative session for the currently requested puzzle.
pub struct SessionManager {
    repository: SessionRepository,
    rules: GameRules,
    generation: u64,
    puzzle: Option<Puzzle>,
    genres: Option<GenreMap>,
    genres_in_flight: bool,
    session: Option<PuzzleSession>,
}

impl SessionManager {
    /// Create a manager in the loading phase.
    pub fn new(repository: SessionRepository, rules: GameRules) -> Self {
        Self {
            repository,
            rules,
            generation: 0,
            puzzle: None,
            genres: None,
            genres_in_flight: false,
            session: None,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        if self.session.is_some() {
            SessionPhase::Active
        } else {
            SessionPhase::Loading
        }
    }

    /// Loaded puzzle, if any.
    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// Genre lookup, if it has been fetched.
    pub fn genres(&self) -> Option<&GenreMap> {
        self.genres.as_ref()
    }

    /// Active session, if any.
    pub fn session(&self) -> Option<&PuzzleSession> {
        self.session.as_ref()
    }

    /// Start loading a puzzle, superseding every earlier load.
    ///
    /// The previous session is dropped and the manager returns to [`SessionPhase::Loading`].
    pub fn begin_load(&mut self, request: PuzzleRequest) -> LoadTicket {
        self.generation += 1;
        self.puzzle = None;
        self.session = None;

        info!(generation = self.generation, %request, "loading puzzle");
        LoadTicket {
            generation: self.generation,
            request,
        }
    }

    /// Whether a response for `ticket` carrying `puzzle_id` may still be applied.
    pub fn is_current(&self, ticket: &LoadTicket, puzzle_id: &PuzzleId) -> bool {
        ticket.generation == self.generation && ticket.request.accepts(puzzle_id)
    }

    /// Apply the outcome of a puzzle fetch issued with `ticket`.
    ///
    /// Responses to superseded tickets are dropped. A failure for the current ticket
    /// leaves the manager loading and is returned as [`SessionError::PuzzleUnavailable`].
    /// On success the persisted guesses for the puzzle are adopted when the stored
    /// record belongs to the same puzzle.
    pub fn apply_puzzle(
        &mut self,
        ticket: &LoadTicket,
        result: ProviderResult<Puzzle>,
    ) -> Result<LoadOutcome, SessionError> {
        if ticket.generation != self.generation {
            debug!(
                generation = ticket.generation,
                current = self.generation,
                "discarding response for superseded load"
            );
            return Ok(LoadOutcome::Stale);
        }

        let puzzle = match result {
            Ok(puzzle) => puzzle,
            Err(err) => {
                warn!(request = %ticket.request, error = %err, "puzzle fetch failed");
                return Err(SessionError::PuzzleUnavailable(err));
            }
        };

        if !self.is_current(ticket, &puzzle.id) {
            warn!(
                request = %ticket.request,
                puzzle_id = %puzzle.id,
                "discarding puzzle that does not match the request"
            );
            return Ok(LoadOutcome::Stale);
        }

        let (guesses, persisted) = match self.repository.load(&puzzle.id) {
            Some(record) if record.id == puzzle.id => {
                let persisted = SessionStatus {
                    won: record.won,
                    lost: record.lost,
                };
                (record.guesses, persisted)
            }
            Some(record) => {
                info!(
                    puzzle_id = %puzzle.id,
                    stored_id = %record.id,
                    "stored session belongs to another puzzle; starting fresh"
                );
                (Vec::new(), SessionStatus::default())
            }
            None => (Vec::new(), SessionStatus::default()),
        };

        let restored_guesses = guesses.len();
        let session = PuzzleSession::restore(puzzle.id.clone(), guesses, persisted, self.rules);
        info!(
            puzzle_id = %puzzle.id,
            movies = puzzle.len(),
            restored_guesses,
            "puzzle session ready"
        );

        let puzzle_id = puzzle.id.clone();
        self.session = Some(session);
        self.puzzle = Some(puzzle);

        Ok(LoadOutcome::Ready {
            puzzle_id,
            restored_guesses,
        })
    }

    /// Reserve the genre fetch for the caller.
    ///
    /// Returns `false` when genres are already known or another load is fetching them,
    /// so overlapping loads issue a single request.
    pub fn claim_genre_fetch(&mut self) -> bool {
        if self.genres.is_some() || self.genres_in_flight {
            return false;
        }
        self.genres_in_flight = true;
        true
    }

    /// Apply the outcome of a genre fetch.
    ///
    /// A failure keeps whatever genre data was already known and lets a later load retry.
    pub fn apply_genres(&mut self, result: ProviderResult<Vec<Genre>>) {
        self.genres_in_flight = false;
        match result {
            Ok(genres) => {
                let genres: GenreMap = genres.into_iter().collect();
                debug!(count = genres.len(), "genre list loaded");
                self.genres = Some(genres);
            }
            Err(err) => {
                let err = SessionError::GenreUnavailable(err);
                warn!(error = ?err, "continuing without genres");
            }
        }
    }

    /// Record a guess and persist the session.
    pub fn submit_guess(&mut self, movie: MovieId) -> Result<SessionStatus, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotLoaded)?;
        let previous = session.status();
        let status = session.submit_guess(movie);

        debug!(
            puzzle_id = %session.puzzle_id(),
            %movie,
            guesses = session.guesses().len(),
            "guess submitted"
        );
        log_transition(session.puzzle_id(), previous, status);
        persist(&self.repository, session);

        Ok(status)
    }

    /// Confirm a guessed movie as correct and re-evaluate the win threshold.
    pub fn register_correct(
        &mut self,
        movie: MovieId,
    ) -> Result<CorrectRegistration, SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NotLoaded)?;
        let previous = session.status();
        let registration = session.register_correct(movie);

        match registration {
            CorrectRegistration::Registered => {
                let status = session.status();
                log_transition(session.puzzle_id(), previous, status);
                if status != previous {
                    persist(&self.repository, session);
                }
            }
            CorrectRegistration::AlreadyRegistered => {}
            CorrectRegistration::NotGuessed => {
                warn!(
                    puzzle_id = %session.puzzle_id(),
                    %movie,
                    "ignoring correct registration for a movie that was never guessed"
                );
            }
        }

        Ok(registration)
    }

    /// Create a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        match &self.session {
            Some(session) => Snapshot {
                phase: SessionPhase::Active,
                puzzle_id: Some(session.puzzle_id().clone()),
                guesses: session.guesses().to_vec(),
                correct_guesses: session.correct_guesses().iter().copied().collect(),
                status: session.status(),
                remaining_guesses: session.remaining_guesses(),
            },
            None => Snapshot {
                phase: SessionPhase::Loading,
                puzzle_id: None,
                guesses: Vec::new(),
                correct_guesses: Vec::new(),
                status: SessionStatus::default(),
                remaining_guesses: self.rules.max_guesses,
            },
        }
    }
}

/// Write the session record; failures leave the in-memory session authoritative.
fn persist(repository: &SessionRepository, session: &PuzzleSession) {
    let record = SessionRecordEntity::from(session);
    if let Err(err) = repository.save(&record) {
        warn!(puzzle_id = %record.id, error = %err, "failed to persist session");
    }
}

fn log_transition(puzzle_id: &PuzzleId, previous: SessionStatus, next: SessionStatus) {
    if next.won && !previous.won {
        info!(%puzzle_id, "puzzle won");
    }
    if next.lost && !previous.lost {
        info!(%puzzle_id, "puzzle lost");
    }
}
