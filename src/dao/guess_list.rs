use serde::{Deserialize, Deserializer};

use crate::state::game::MovieId;

/// Read a guess list whose entries are either bare movie ids or movie objects.
///
/// Older clients stored the whole movie object; only its `id` is kept.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<MovieId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawGuess {
        Id(MovieId),
        Movie { id: MovieId },
    }

    let raw = Vec::<RawGuess>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|guess| match guess {
            RawGuess::Id(id) | RawGuess::Movie { id } => id,
        })
        .collect())
}
