use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    error::SessionError,
    providers::{GenreProvider, PuzzleProvider, PuzzleRequest},
    state::{
        CorrectRegistration, LoadOutcome, SessionManager, SessionStatus, SharedSession, Snapshot,
        game::{MovieId, PuzzleId},
    },
};

/// Result of submitting a guess through the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Whether the guessed movie is one of the puzzle's targets.
    pub correct: bool,
    /// Win/loss flags after the guess was applied.
    pub status: SessionStatus,
}

/// Drives a shared [`SessionManager`] from the puzzle and genre providers.
#[derive(Clone)]
pub struct GameService {
    session: SharedSession,
    puzzles: Arc<dyn PuzzleProvider>,
    genres: Arc<dyn GenreProvider>,
}

impl GameService {
    /// Wire a service around a shared manager and its providers.
    pub fn new(
        session: SharedSession,
        puzzles: Arc<dyn PuzzleProvider>,
        genres: Arc<dyn GenreProvider>,
    ) -> Self {
        Self {
            session,
            puzzles,
            genres,
        }
    }

    /// Shared manager driven by this service.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Load a puzzle by id, or the latest one when no id is given.
    ///
    /// The puzzle and genre fetches run concurrently and each applies its own
    /// slice of state as soon as it completes. Genre failures never fail the load.
    /// Genres are requested once; overlapping loads share the first fetch.
    pub async fn load(&self, puzzle_id: Option<PuzzleId>) -> Result<LoadOutcome, SessionError> {
        let ticket = self
            .session
            .write()
            .await
            .begin_load(PuzzleRequest::from(puzzle_id));

        let puzzle_task = async {
            let result = self.puzzles.get_puzzle(ticket.request().clone()).await;
            let mut manager = self.session.write().await;
            let outcome = manager.apply_puzzle(&ticket, result)?;
            if matches!(outcome, LoadOutcome::Ready { .. }) {
                replay_correct(&mut manager)?;
            }
            Ok::<_, SessionError>(outcome)
        };

        let genre_task = async {
            if !self.session.write().await.claim_genre_fetch() {
                return;
            }
            let result = self.genres.get_genres().await;
            self.session.write().await.apply_genres(result);
        };

        let (outcome, ()) = futures::join!(puzzle_task, genre_task);
        outcome
    }

    /// Submit a guess, check it against the loaded puzzle, and confirm it when correct.
    pub async fn submit_guess(&self, movie: MovieId) -> Result<GuessOutcome, SessionError> {
        let mut manager = self.session.write().await;
        let mut status = manager.submit_guess(movie)?;

        let correct = manager
            .puzzle()
            .is_some_and(|puzzle| puzzle.contains(movie));
        if correct {
            manager.register_correct(movie)?;
            status = manager
                .session()
                .map(|session| session.status())
                .unwrap_or(status);
        }

        Ok(GuessOutcome { correct, status })
    }

    /// Confirm a guessed movie as correct.
    pub async fn register_correct(
        &self,
        movie: MovieId,
    ) -> Result<CorrectRegistration, SessionError> {
        self.session.write().await.register_correct(movie)
    }

    /// Snapshot the current session for display.
    pub async fn snapshot(&self) -> Snapshot {
        self.session.read().await.snapshot()
    }

    /// Genre names of a puzzle movie; empty while genre data is unavailable.
    pub async fn genre_names(&self, movie: MovieId) -> Vec<String> {
        let manager = self.session.read().await;
        let (Some(puzzle), Some(genres)) = (manager.puzzle(), manager.genres()) else {
            return Vec::new();
        };
        puzzle
            .movie(movie)
            .map(|movie| {
                genres
                    .names_for(movie)
                    .into_iter()
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Re-confirm restored guesses that hit the puzzle's targets.
///
/// The correct set is not persisted, so a resumed session rebuilds it here from
/// puzzle membership. Persisted win/loss flags are already merged in by the restore.
fn replay_correct(manager: &mut SessionManager) -> Result<(), SessionError> {
    let hits: Vec<MovieId> = match (manager.puzzle(), manager.session()) {
        (Some(puzzle), Some(session)) => session
            .guesses()
            .iter()
            .copied()
            .filter(|movie| puzzle.contains(*movie))
            .collect(),
        _ => return Ok(()),
    };

    if hits.is_empty() {
        return Ok(());
    }

    for movie in &hits {
        manager.register_correct(*movie)?;
    }
    debug!(replayed = hits.len(), "restored correct guesses");
    if let Some(session) = manager.session() {
        info!(
            puzzle_id = %session.puzzle_id(),
            correct = session.correct_guesses().len(),
            won = session.status().won,
            lost = session.status().lost,
            "resumed puzzle session"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use futures::future::BoxFuture;
    use tokio::sync::{Notify, oneshot};

    use super::*;
    use crate::{
        dao::{session::SessionRepository, session_store::MemorySessionStore},
        providers::{ProviderError, ProviderResult},
        state::{
            GameRules, SessionPhase,
            game::{Genre, Movie, Puzzle},
            shared_session,
        },
    };

    fn movie(id: u64, genre_ids: Vec<u32>) -> Movie {
        Movie {
            id: MovieId(id),
            title: format!("Movie {id}"),
            release_date: None,
            genre_ids,
            overview: None,
            poster_path: None,
        }
    }

    fn puzzle(id: &str) -> Puzzle {
        Puzzle {
            id: PuzzleId::new(id),
            movies: (1..=8).map(|n| movie(n, vec![28])).collect(),
        }
    }

    struct StaticPuzzles {
        latest: String,
        puzzles: HashMap<String, Puzzle>,
    }

    impl StaticPuzzles {
        fn new(ids: &[&str]) -> Self {
            Self {
                latest: ids.last().map(|id| id.to_string()).unwrap_or_default(),
                puzzles: ids.iter().map(|id| (id.to_string(), puzzle(id))).collect(),
            }
        }
    }

    impl PuzzleProvider for StaticPuzzles {
        fn get_puzzle(&self, request: PuzzleRequest) -> BoxFuture<'static, ProviderResult<Puzzle>> {
            let key = match &request {
                PuzzleRequest::Latest => self.latest.clone(),
                PuzzleRequest::Id(id) => id.to_string(),
            };
            let found = self.puzzles.get(&key).cloned();
            Box::pin(async move { found.ok_or(ProviderError::NotFound(key)) })
        }
    }

    #[derive(Default)]
    struct CountingGenres {
        calls: AtomicUsize,
        fail: bool,
    }

    impl GenreProvider for CountingGenres {
        fn get_genres(&self) -> BoxFuture<'static, ProviderResult<Vec<Genre>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            Box::pin(async move {
                if fail {
                    Err(ProviderError::InvalidShape("no genres".into()))
                } else {
                    Ok(vec![Genre {
                        id: 28,
                        name: "Action".into(),
                    }])
                }
            })
        }
    }

    #[derive(Clone, Default)]
    struct SlowGenres {
        calls: Arc<AtomicUsize>,
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl GenreProvider for SlowGenres {
        fn get_genres(&self) -> BoxFuture<'static, ProviderResult<Vec<Genre>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.notify_one();
            let release = Arc::clone(&self.release);
            Box::pin(async move {
                release.notified().await;
                Ok(vec![Genre {
                    id: 28,
                    name: "Action".into(),
                }])
            })
        }
    }

    fn service_with(
        store: Arc<MemorySessionStore>,
        puzzles: Arc<dyn PuzzleProvider>,
        genres: Arc<dyn GenreProvider>,
    ) -> GameService {
        let repository = SessionRepository::new(store);
        GameService::new(
            shared_session(repository, GameRules::default()),
            puzzles,
            genres,
        )
    }

    fn service(ids: &[&str]) -> (Arc<MemorySessionStore>, GameService) {
        let store = Arc::new(MemorySessionStore::new());
        let service = service_with(
            store.clone(),
            Arc::new(StaticPuzzles::new(ids)),
            Arc::new(CountingGenres::default()),
        );
        (store, service)
    }

    #[tokio::test]
    async fn loads_latest_puzzle_and_genres() {
        let (_, service) = service(&["41", "42"]);
        let outcome = service.load(None).await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Ready {
                puzzle_id: PuzzleId::new("42"),
                restored_guesses: 0
            }
        );
        assert_eq!(service.genre_names(MovieId(1)).await, vec!["Action"]);
    }

    #[tokio::test]
    async fn missing_puzzle_reports_unavailable() {
        let (_, service) = service(&["42"]);
        let err = service
            .load(Some(PuzzleId::new("7")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SessionError::PuzzleUnavailable(ProviderError::NotFound(_))
        ));
        assert_eq!(service.snapshot().await.phase, SessionPhase::Loading);
    }

    #[tokio::test]
    async fn genre_failure_does_not_block_the_puzzle() {
        let service = service_with(
            Arc::new(MemorySessionStore::new()),
            Arc::new(StaticPuzzles::new(&["42"])),
            Arc::new(CountingGenres {
                fail: true,
                ..Default::default()
            }),
        );

        service.load(None).await.unwrap();
        let outcome = service.submit_guess(MovieId(1)).await.unwrap();

        assert!(outcome.correct);
        assert!(service.genre_names(MovieId(1)).await.is_empty());
    }

    #[tokio::test]
    async fn genres_are_fetched_once() {
        let genres = Arc::new(CountingGenres::default());
        let service = service_with(
            Arc::new(MemorySessionStore::new()),
            Arc::new(StaticPuzzles::new(&["41", "42"])),
            genres.clone(),
        );

        service.load(Some(PuzzleId::new("41"))).await.unwrap();
        service.load(Some(PuzzleId::new("42"))).await.unwrap();

        assert_eq!(genres.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn six_correct_guesses_win_puzzle_42() {
        let (_, service) = service(&["42"]);
        service.load(Some(PuzzleId::new("42"))).await.unwrap();

        for id in 1..=6 {
            let outcome = service.submit_guess(MovieId(id)).await.unwrap();
            assert!(outcome.correct);
            assert_eq!(outcome.status.won, id == 6);
        }

        let snapshot = service.snapshot().await;
        assert!(snapshot.status.won);
        assert!(!snapshot.status.lost);
        assert_eq!(snapshot.correct_guesses.len(), 6);
    }

    #[tokio::test]
    async fn ten_wrong_guesses_lose() {
        let (_, service) = service(&["42"]);
        service.load(None).await.unwrap();

        for id in 100..110 {
            let outcome = service.submit_guess(MovieId(id)).await.unwrap();
            assert!(!outcome.correct);
        }

        let snapshot = service.snapshot().await;
        assert!(snapshot.status.lost);
        assert!(!snapshot.status.won);
    }

    #[tokio::test]
    async fn repeated_correct_movie_counts_once() {
        let (_, service) = service(&["42"]);
        service.load(None).await.unwrap();

        service.submit_guess(MovieId(7)).await.unwrap();
        service.submit_guess(MovieId(7)).await.unwrap();
        assert_eq!(
            service.register_correct(MovieId(7)).await.unwrap(),
            CorrectRegistration::AlreadyRegistered
        );

        let snapshot = service.snapshot().await;
        assert_eq!(snapshot.correct_guesses, vec![MovieId(7)]);
        assert_eq!(snapshot.guesses.len(), 2);
    }

    #[tokio::test]
    async fn resumed_session_replays_correct_guesses() {
        let store = Arc::new(MemorySessionStore::new());
        let first = service_with(
            store.clone(),
            Arc::new(StaticPuzzles::new(&["42"])),
            Arc::new(CountingGenres::default()),
        );
        first.load(None).await.unwrap();
        for id in [1, 99, 2, 3, 4, 5, 6] {
            first.submit_guess(MovieId(id)).await.unwrap();
        }
        assert!(first.snapshot().await.status.won);

        let second = service_with(
            store,
            Arc::new(StaticPuzzles::new(&["42"])),
            Arc::new(CountingGenres::default()),
        );
        let outcome = second.load(Some(PuzzleId::new("42"))).await.unwrap();

        assert_eq!(
            outcome,
            LoadOutcome::Ready {
                puzzle_id: PuzzleId::new("42"),
                restored_guesses: 7
            }
        );
        let snapshot = second.snapshot().await;
        assert!(snapshot.status.won);
        assert_eq!(snapshot.correct_guesses.len(), 6);
        assert_eq!(snapshot.remaining_guesses, 3);
    }

    /// Holds the response for puzzle "1" until released.
    struct GatedPuzzles {
        started: Mutex<Option<oneshot::Sender<()>>>,
        release: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl PuzzleProvider for GatedPuzzles {
        fn get_puzzle(&self, request: PuzzleRequest) -> BoxFuture<'static, ProviderResult<Puzzle>> {
            let gate = match &request {
                PuzzleRequest::Id(id) if id.as_str() == "1" => {
                    let started = self.started.lock().unwrap().take();
                    let release = self.release.lock().unwrap().take();
                    started.zip(release)
                }
                _ => None,
            };
            Box::pin(async move {
                let id = match &request {
                    PuzzleRequest::Latest => "latest".to_string(),
                    PuzzleRequest::Id(id) => id.to_string(),
                };
                if let Some((started, release)) = gate {
                    let _ = started.send(());
                    let _ = release.await;
                }
                Ok(puzzle(&id))
            })
        }
    }

    #[tokio::test]
    async fn late_response_does_not_replace_newer_session() {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let service = Arc::new(service_with(
            Arc::new(MemorySessionStore::new()),
            Arc::new(GatedPuzzles {
                started: Mutex::new(Some(started_tx)),
                release: Mutex::new(Some(release_rx)),
            }),
            Arc::new(CountingGenres::default()),
        ));

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.load(Some(PuzzleId::new("1"))).await })
        };
        started_rx.await.unwrap();

        let fast = service.load(Some(PuzzleId::new("2"))).await.unwrap();
        assert!(matches!(fast, LoadOutcome::Ready { .. }));

        release_tx.send(()).unwrap();
        let late = slow.await.unwrap().unwrap();

        assert_eq!(late, LoadOutcome::Stale);
        assert_eq!(
            service.snapshot().await.puzzle_id,
            Some(PuzzleId::new("2"))
        );
    }

    #[tokio::test]
    async fn overlapping_loads_share_one_genre_fetch() {
        let genres = SlowGenres::default();
        let service = service_with(
            Arc::new(MemorySessionStore::new()),
            Arc::new(StaticPuzzles::new(&["41", "42"])),
            Arc::new(genres.clone()),
        );

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.load(Some(PuzzleId::new("41"))).await }
        });
        genres.started.notified().await;

        let second = service.load(Some(PuzzleId::new("42"))).await.unwrap();
        assert!(matches!(second, LoadOutcome::Ready { .. }));
        assert_eq!(genres.calls.load(Ordering::SeqCst), 1);

        genres.release.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(genres.calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.genre_names(MovieId(1)).await, vec!["Action"]);
    }

    #[tokio::test]
    async fn manual_win_survives_a_reload() {
        let (store, service) = service(&["42"]);
        service.load(Some(PuzzleId::new("42"))).await.unwrap();
        for id in 100..106 {
            service.submit_guess(MovieId(id)).await.unwrap();
            service.register_correct(MovieId(id)).await.unwrap();
        }
        assert!(service.snapshot().await.status.won);

        let resumed = service_with(
            store,
            Arc::new(StaticPuzzles::new(&["42"])),
            Arc::new(CountingGenres::default()),
        );
        resumed.load(Some(PuzzleId::new("42"))).await.unwrap();

        let snapshot = resumed.snapshot().await;
        assert!(snapshot.status.won);
        assert!(snapshot.correct_guesses.is_empty());
        assert_eq!(snapshot.guesses.len(), 6);
    }
}
