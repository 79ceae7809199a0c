use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the quiz engine and the dataset loader.
#[derive(Debug, Error)]
pub enum GameError {
    /// A difficulty level outside the configured range. Treated as a
    /// configuration error, not something a player can recover from.
    #[error("invalid difficulty level: {0}")]
    InvalidDifficulty(u8),

    /// No positive-weight candidates were left to sample from. Indicates a
    /// dataset invariant violation; question generation must fail loudly
    /// rather than produce an empty question.
    #[error("no candidates with positive weight to sample from")]
    EmptyCandidateSet,

    /// A guess referenced a country code the dataset does not contain.
    #[error("unknown country code {0:?}")]
    UnknownCountry(String),

    /// No playable country survived loading and eligibility filtering.
    #[error("dataset contains no playable countries")]
    EmptyDataset,

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
