//! Rules engine for a falling-block puzzle: a tick-driven state machine over
//! a 20x10 field. Rendering, input polling and the loop cadence belong to the
//! caller, which feeds at most one [`UserAction`] per [`Game::update`] and
//! draws the returned [`GameSnapshot`].

pub mod error;
pub mod field;
pub mod figure;
pub mod game;
pub mod scoring;
pub mod storage;
pub mod timing;

pub use error::TetrisError;
pub use field::{Field, HEIGHT, WIDTH};
pub use figure::{Figure, FigureKind, PieceProvider, RandomPieceProvider, SequencePieceProvider};
pub use game::{can_place, Game, GameEvent, GameSnapshot, State, UserAction};
pub use scoring::Progress;
pub use storage::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
pub use timing::{Clock, ManualClock, SystemClock};
