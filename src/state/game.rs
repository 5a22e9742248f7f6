use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

/// Identifier of a genre as published by the movie database.
pub type GenreId = u32;

/// Identifier of a daily puzzle, also used as the persistence key.
///
/// Puzzle sources publish ids either as strings or as numbers; both are
/// normalized to their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PuzzleId(String);

impl PuzzleId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is blank.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PuzzleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PuzzleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for PuzzleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPuzzleId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
            Float(f64),
        }

        Ok(match RawPuzzleId::deserialize(deserializer)? {
            RawPuzzleId::Text(text) => Self(text),
            RawPuzzleId::Unsigned(number) => Self(number.to_string()),
            RawPuzzleId::Signed(number) => Self(number.to_string()),
            // `42.0` names the same puzzle as `42`.
            RawPuzzleId::Float(number) => Self(number.to_string()),
        })
    }
}

/// Identifier of a movie, shared by puzzles and guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MovieId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A movie taking part in a puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// Stable identifier of the movie.
    pub id: MovieId,
    /// Display title.
    pub title: String,
    /// Theatrical release date, when known.
    pub release_date: Option<Date>,
    /// Genres the movie is filed under.
    pub genre_ids: Vec<GenreId>,
    /// Short synopsis shown once the movie is revealed.
    pub overview: Option<String>,
    /// Poster path relative to the image CDN.
    pub poster_path: Option<String>,
}

impl Movie {
    /// Release year, when the release date is known.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }
}

/// A daily puzzle: an ordered list of target movies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// Identifier of the puzzle.
    pub id: PuzzleId,
    /// Target movies in display order.
    pub movies: Vec<Movie>,
}

impl Puzzle {
    /// Whether the movie is one of this puzzle's targets.
    ///
    /// This is the correctness check for a submitted guess.
    pub fn contains(&self, movie_id: MovieId) -> bool {
        self.movies.iter().any(|movie| movie.id == movie_id)
    }

    /// Look up a target movie by identifier.
    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|movie| movie.id == movie_id)
    }

    /// Number of target movies.
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the puzzle has no target movies.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

/// A genre entry as listed by the genre provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    /// Identifier referenced by [`Movie::genre_ids`].
    pub id: GenreId,
    /// Display name.
    pub name: String,
}

/// Flat genre lookup, loaded once and shared by every puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreMap {
    genres: IndexMap<GenreId, String>,
}

impl GenreMap {
    /// Name of a single genre.
    pub fn name(&self, id: GenreId) -> Option<&str> {
        self.genres.get(&id).map(String::as_str)
    }

    /// Display names for a movie's genres, skipping unknown ids.
    pub fn names_for<'a>(&'a self, movie: &Movie) -> Vec<&'a str> {
        movie
            .genre_ids
            .iter()
            .filter_map(|id| self.name(*id))
            .collect()
    }

    /// Number of known genres.
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    /// Whether no genre is known.
    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }
}

impl FromIterator<Genre> for GenreMap {
    fn from_iter<T: IntoIterator<Item = Genre>>(iter: T) -> Self {
        Self {
            genres: iter
                .into_iter()
                .map(|genre| (genre.id, genre.name))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn movie(id: u64, genre_ids: Vec<GenreId>) -> Movie {
        Movie {
            id: MovieId(id),
            title: format!("Movie {id}"),
            release_date: Some(date!(1999 - 03 - 31)),
            genre_ids,
            overview: None,
            poster_path: None,
        }
    }

    #[test]
    fn puzzle_id_accepts_strings_and_numbers() {
        let text: PuzzleId = serde_json::from_str("\"42\"").unwrap();
        let number: PuzzleId = serde_json::from_str("42").unwrap();
        assert_eq!(text, number);
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"42\"");
    }

    #[test]
    fn puzzle_id_accepts_large_and_float_numbers() {
        let large: PuzzleId = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(large, PuzzleId::new("18446744073709551615"));

        let negative: PuzzleId = serde_json::from_str("-3").unwrap();
        assert_eq!(negative, PuzzleId::new("-3"));

        let float: PuzzleId = serde_json::from_str("42.0").unwrap();
        assert_eq!(float, PuzzleId::new("42"));
    }

    #[test]
    fn puzzle_contains_only_its_targets() {
        let puzzle = Puzzle {
            id: PuzzleId::new("7"),
            movies: vec![movie(603, vec![]), movie(604, vec![])],
        };
        assert!(puzzle.contains(MovieId(603)));
        assert!(!puzzle.contains(MovieId(1)));
        assert_eq!(puzzle.movie(MovieId(604)).map(|m| m.id), Some(MovieId(604)));
        assert_eq!(puzzle.len(), 2);
    }

    #[test]
    fn genre_names_skip_unknown_ids() {
        let genres: GenreMap = vec![
            Genre {
                id: 28,
                name: "Action".into(),
            },
            Genre {
                id: 878,
                name: "Science Fiction".into(),
            },
        ]
        .into_iter()
        .collect();

        let names = genres.names_for(&movie(603, vec![28, 99, 878]));
        assert_eq!(names, vec!["Action", "Science Fiction"]);
    }

    #[test]
    fn release_year_follows_release_date() {
        assert_eq!(movie(603, vec![]).release_year(), Some(1999));
    }
}
