use std::cell::Cell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Result, TetrisError};

pub const HIGH_SCORE_FILE: &str = "high_score.txt";

/// Where the single best score lives between runs.
pub trait HighScoreStore {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<u32>>;
    fn save(&mut self, score: u32) -> Result<()>;
}

/// Plain decimal text in one file.
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileHighScoreStore {
    fn default() -> Self {
        Self::new(HIGH_SCORE_FILE)
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&mut self) -> Result<Option<u32>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(TetrisError::Storage {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        contents
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| TetrisError::InvalidHighScore {
                path: self.path.clone(),
                contents,
            })
    }

    fn save(&mut self, score: u32) -> Result<()> {
        fs::write(&self.path, score.to_string()).map_err(|source| TetrisError::Storage {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps the score in memory. Clones share it, so a caller can hand one
/// handle to the game and inspect the other.
#[derive(Clone, Debug, Default)]
pub struct MemoryHighScoreStore {
    score: Rc<Cell<Option<u32>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryHighScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(score: u32) -> Self {
        let store = Self::default();
        store.score.set(Some(score));
        store
    }

    pub fn score(&self) -> Option<u32> {
        self.score.get()
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&mut self) -> Result<Option<u32>> {
        Ok(self.score.get())
    }

    fn save(&mut self, score: u32) -> Result<()> {
        self.score.set(Some(score));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Reads the stored score, falling back to 0 on any problem.
pub fn load_or_default(store: &mut dyn HighScoreStore) -> u32 {
    store.load().ok().flatten().unwrap_or(0)
}
