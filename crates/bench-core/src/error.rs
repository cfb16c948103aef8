//! Error type shared by the benchmark core

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("opponent set is empty")]
    EmptyOpponentSet,

    #[error("opponent {0} appears more than once in the ladder")]
    DuplicateOpponent(String),

    #[error("opponent {0} must have a positive weight")]
    InvalidWeight(String),

    #[error("games per matchup must be at least 1")]
    NoGames,

    #[error("ladder for {0} has already finished")]
    LadderFinished(String),

    #[error("no games recorded against {0}")]
    EmptyBatch(String),

    #[error("unknown ladder format '{0}'")]
    UnknownFormat(String),

    /// The match configuration could not be handed to the game engine.
    /// No outcome can be trusted after this, so it aborts the run.
    #[error("failed to write match configuration {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported run record version '{0}'")]
    UnsupportedVersion(String),

    #[error("malformed run record: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
