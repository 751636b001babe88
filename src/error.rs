use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TetrisError {
    /// A fixed-size buffer could not be allocated while building the game.
    #[error("could not allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("high score file {path} could not be accessed")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("high score file {path} holds {contents:?}, not a score")]
    InvalidHighScore { path: PathBuf, contents: String },
}

pub type Result<T> = std::result::Result<T, TetrisError>;
