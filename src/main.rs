//! Movie Guess binary entrypoint: loads a puzzle and plays guesses read from stdin.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_guess_back::{
    config::AppConfig,
    dao::{session::SessionRepository, session_store::FileSessionStore},
    providers::http::{HttpGenreProvider, HttpPuzzleProvider},
    services::GameService,
    state::{
        LoadOutcome, shared_session,
        game::{MovieId, PuzzleId},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let provider_config = config.provider_config();
    let puzzles =
        HttpPuzzleProvider::new(&provider_config).context("building puzzle provider")?;
    let genres = HttpGenreProvider::new(&provider_config).context("building genre provider")?;

    let store = FileSessionStore::open(config.storage_dir.clone()).context("opening session storage")?;
    let repository = SessionRepository::new(Arc::new(store));
    let service = GameService::new(
        shared_session(repository, config.rules),
        Arc::new(puzzles),
        Arc::new(genres),
    );

    let requested = env::args()
        .nth(1)
        .filter(|arg| arg != "latest")
        .map(PuzzleId::new);
    match service.load(requested).await.context("loading puzzle")? {
        LoadOutcome::Ready {
            puzzle_id,
            restored_guesses,
        } => info!(%puzzle_id, restored_guesses, "puzzle ready"),
        LoadOutcome::Stale => return Ok(()),
    }

    let snapshot = service.snapshot().await;
    info!(
        remaining = snapshot.remaining_guesses,
        correct = snapshot.correct_guesses.len(),
        won = snapshot.status.won,
        lost = snapshot.status.lost,
        "session state"
    );

    // One movie id per line.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(raw) = line.parse::<u64>() else {
            warn!(input = %line, "ignoring non-numeric movie id");
            continue;
        };

        let movie = MovieId(raw);
        let outcome = service.submit_guess(movie).await?;
        let genres = service.genre_names(movie).await;
        info!(
            %movie,
            correct = outcome.correct,
            genres = ?genres,
            won = outcome.status.won,
            lost = outcome.status.lost,
            remaining = service.snapshot().await.remaining_guesses,
            "guess recorded"
        );
        if outcome.status.is_finished() {
            info!(
                won = outcome.status.won,
                lost = outcome.status.lost,
                "puzzle finished"
            );
        }
    }

    Ok(())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,movie_guess_back=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
