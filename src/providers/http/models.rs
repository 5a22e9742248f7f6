use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing::debug;
use validator::{Validate, ValidationError};

use crate::state::game::{Genre, GenreId, Movie, MovieId, Puzzle, PuzzleId};

const RELEASE_DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Payload returned by the puzzle endpoint.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleResponse {
    #[validate(custom(function = "validate_puzzle_id"))]
    pub puzzle_id: PuzzleId,
    #[validate(custom(function = "validate_movies"))]
    pub puzzle: Vec<MovieModel>,
}

/// Movie entry as published by the movie database.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieModel {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Payload returned by the genre endpoint.
#[derive(Debug, Deserialize)]
pub struct GenreListResponse {
    pub genres: Vec<GenreModel>,
}

#[derive(Debug, Deserialize)]
pub struct GenreModel {
    pub id: GenreId,
    pub name: String,
}

fn validate_puzzle_id(id: &PuzzleId) -> Result<(), ValidationError> {
    if id.is_blank() {
        let mut err = ValidationError::new("puzzle_id_blank");
        err.message = Some("puzzle id must not be blank".into());
        return Err(err);
    }
    Ok(())
}

fn validate_movies(movies: &[MovieModel]) -> Result<(), ValidationError> {
    if movies.is_empty() {
        let mut err = ValidationError::new("puzzle_empty");
        err.message = Some("puzzle has no movies".into());
        return Err(err);
    }
    Ok(())
}

impl From<PuzzleResponse> for Puzzle {
    fn from(value: PuzzleResponse) -> Self {
        Self {
            id: value.puzzle_id,
            movies: value.puzzle.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<MovieModel> for Movie {
    fn from(value: MovieModel) -> Self {
        let release_date = value.release_date.and_then(|raw| {
            Date::parse(&raw, RELEASE_DATE_FORMAT)
                .inspect_err(|err| {
                    debug!(movie_id = %value.id, %raw, error = %err, "unparseable release date")
                })
                .ok()
        });

        Self {
            id: value.id,
            title: value.title,
            release_date,
            genre_ids: value.genre_ids,
            overview: value.overview.filter(|text| !text.is_empty()),
            poster_path: value.poster_path,
        }
    }
}

impl From<GenreModel> for Genre {
    fn from(value: GenreModel) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}
