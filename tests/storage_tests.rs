//! High score file round trips. These share one file, so they run serially.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use brick_tetris::figure::{FigureKind, SequencePieceProvider};
use brick_tetris::storage::{
    load_or_default, FileHighScoreStore, HighScoreStore, HIGH_SCORE_FILE,
};
use brick_tetris::{Game, ManualClock, TetrisError};

fn scratch_path() -> PathBuf {
    let path = std::env::temp_dir().join("brick_tetris_high_score_test.txt");
    let _ = fs::remove_file(&path);
    path
}

#[test]
#[serial]
fn missing_file_loads_as_nothing() {
    let mut store = FileHighScoreStore::new(scratch_path());

    assert!(store.load().unwrap().is_none());
    assert_eq!(load_or_default(&mut store), 0);
}

#[test]
#[serial]
fn saved_score_round_trips_as_decimal_text() {
    let path = scratch_path();
    let mut store = FileHighScoreStore::new(&path);

    store.save(1234).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1234");
    assert_eq!(store.load().unwrap(), Some(1234));
    assert_eq!(FileHighScoreStore::new(&path).load().unwrap(), Some(1234));
}

#[test]
#[serial]
fn garbage_is_reported_and_defaults_to_zero() {
    let path = scratch_path();
    fs::write(&path, "not a number").unwrap();
    let mut store = FileHighScoreStore::new(&path);

    assert!(matches!(
        store.load(),
        Err(TetrisError::InvalidHighScore { .. })
    ));
    assert_eq!(load_or_default(&mut store), 0);
}

#[test]
#[serial]
fn game_reads_the_stored_score_and_writes_new_records() {
    let path = scratch_path();
    fs::write(&path, "250\n").unwrap();

    let mut game = Game::with_parts(
        Box::new(SequencePieceProvider::new(vec![FigureKind::O])),
        Box::new(ManualClock::new()),
        Box::new(FileHighScoreStore::new(&path)),
    )
    .unwrap();
    assert_eq!(game.progress.high_score, 250);

    game.add_score(2);

    assert_eq!(fs::read_to_string(&path).unwrap(), "300");
}

#[test]
fn default_store_uses_the_standard_file_name() {
    let store = FileHighScoreStore::default();

    assert_eq!(store.path(), std::path::Path::new(HIGH_SCORE_FILE));
}
