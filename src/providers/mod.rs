//! Read-only data sources the session layer depends on.

#[cfg(feature = "http-providers")]
pub mod http;

use std::{error::Error, fmt};

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::game::{Genre, Puzzle, PuzzleId};

/// Result alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Which puzzle to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleRequest {
    /// The most recently published puzzle.
    Latest,
    /// A specific puzzle.
    Id(PuzzleId),
}

impl PuzzleRequest {
    /// Whether a fetched puzzle answers this request.
    pub fn accepts(&self, id: &PuzzleId) -> bool {
        match self {
            PuzzleRequest::Latest => true,
            PuzzleRequest::Id(requested) => requested == id,
        }
    }
}

impl From<Option<PuzzleId>> for PuzzleRequest {
    fn from(value: Option<PuzzleId>) -> Self {
        value.map_or(PuzzleRequest::Latest, PuzzleRequest::Id)
    }
}

impl fmt::Display for PuzzleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleRequest::Latest => f.write_str("latest"),
            PuzzleRequest::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Failure reported by a puzzle or genre provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The source could not be reached or answered with an error.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// What was being fetched.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The source answered with a payload of the wrong shape.
    #[error("invalid payload: {0}")]
    InvalidShape(String),
}

impl ProviderError {
    /// Construct an unavailable error from any transport failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        ProviderError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Source of daily puzzles.
pub trait PuzzleProvider: Send + Sync {
    /// Fetch the requested puzzle.
    fn get_puzzle(&self, request: PuzzleRequest) -> BoxFuture<'static, ProviderResult<Puzzle>>;
}

/// Source of the genre lookup table.
pub trait GenreProvider: Send + Sync {
    /// Fetch every known genre.
    fn get_genres(&self) -> BoxFuture<'static, ProviderResult<Vec<Genre>>>;
}
