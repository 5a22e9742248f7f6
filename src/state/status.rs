//! Pure win/loss derivation for a puzzle session.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::state::game::MovieId;

/// Distinct correct movies needed to win a puzzle.
pub const DEFAULT_CORRECT_TO_WIN: usize = 6;
/// Guesses (duplicates included) after which the puzzle is lost.
pub const DEFAULT_MAX_GUESSES: usize = 10;

/// Thresholds deciding when a session is won or lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GameRules {
    /// A session is won once this many distinct movies are confirmed correct.
    #[validate(range(min = 1))]
    pub correct_to_win: usize,
    /// A session is lost once this many guesses have been submitted.
    #[validate(range(min = 1))]
    pub max_guesses: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            correct_to_win: DEFAULT_CORRECT_TO_WIN,
            max_guesses: DEFAULT_MAX_GUESSES,
        }
    }
}

/// Win and loss flags of a session.
///
/// The two flags are independent: a single submission may cross both thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Enough distinct correct movies were found.
    pub won: bool,
    /// The guess budget is exhausted.
    pub lost: bool,
}

impl SessionStatus {
    /// Combine with a newer derivation; a flag once set stays set.
    pub fn merge(self, next: SessionStatus) -> SessionStatus {
        SessionStatus {
            won: self.won || next.won,
            lost: self.lost || next.lost,
        }
    }

    /// Whether either terminal flag is set.
    pub fn is_finished(&self) -> bool {
        self.won || self.lost
    }
}

/// Compute the win/loss flags from the current guesses and correct set.
///
/// Both checks always run; neither short-circuits the other.
pub fn derive_status(
    guesses: &[MovieId],
    correct: &IndexSet<MovieId>,
    rules: &GameRules,
) -> SessionStatus {
    let won = correct.len() >= rules.correct_to_win;
    let lost = guesses.len() >= rules.max_guesses;
    SessionStatus { won, lost }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<MovieId> {
        range.map(MovieId).collect()
    }

    #[test]
    fn sixth_distinct_correct_movie_wins() {
        let rules = GameRules::default();
        let guesses = ids(1..=6);
        let five: IndexSet<MovieId> = ids(1..=5).into_iter().collect();
        let six: IndexSet<MovieId> = ids(1..=6).into_iter().collect();

        assert!(!derive_status(&guesses, &five, &rules).won);
        assert!(derive_status(&guesses, &six, &rules).won);
    }

    #[test]
    fn tenth_guess_loses() {
        let rules = GameRules::default();
        let correct = IndexSet::new();

        assert!(!derive_status(&ids(1..=9), &correct, &rules).lost);
        assert!(derive_status(&ids(1..=10), &correct, &rules).lost);
    }

    #[test]
    fn both_flags_can_be_set_together() {
        let rules = GameRules::default();
        let correct: IndexSet<MovieId> = ids(1..=6).into_iter().collect();
        let status = derive_status(&ids(1..=10), &correct, &rules);
        assert_eq!(
            status,
            SessionStatus {
                won: true,
                lost: true
            }
        );
    }

    #[test]
    fn merge_keeps_flags_sticky() {
        let previous = SessionStatus {
            won: true,
            lost: false,
        };
        let merged = previous.merge(SessionStatus::default());
        assert!(merged.won);
        assert!(!merged.lost);
    }

    #[test]
    fn zero_thresholds_fail_validation() {
        let rules = GameRules {
            correct_to_win: 0,
            max_guesses: 10,
        };
        assert!(rules.validate().is_err());
        assert!(GameRules::default().validate().is_ok());
    }
}
