//! Property tests for placement, rotation, line clearing and scoring.
//!
//! Invariants covered:
//! - `can_place` only accepts in-bounds, free cells (or cells above the top).
//! - Four quarter turns give back the same figure.
//! - Kick rotation commits the first fitting offset or nothing at all.
//! - Line clearing removes exactly the full rows and nothing else.
//! - Score never decreases; level and speed stay in range.

use proptest::prelude::*;

use brick_tetris::field::{Field, HEIGHT, WIDTH};
use brick_tetris::figure::{Figure, FigureKind};
use brick_tetris::game::{can_place, test_helpers::game_at, WALL_KICKS};
use brick_tetris::scoring::{Progress, MAX_LEVEL, MAX_SPEED, MIN_SPEED, POINTS_FOR_LEVEL};

fn field_from(cells: &[bool]) -> Field {
    let mut field = Field::new().unwrap();
    for (i, &occupied) in cells.iter().enumerate() {
        field.set(i % WIDTH, i / WIDTH, occupied);
    }
    field
}

fn arb_field() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(0.3), WIDTH * HEIGHT)
}

fn arb_kind() -> impl Strategy<Value = FigureKind> {
    prop::sample::select(FigureKind::ALL.to_vec())
}

fn arb_figure() -> impl Strategy<Value = Figure> {
    (arb_kind(), -3i32..12, -4i32..22, 0usize..4).prop_map(|(kind, x, y, turns)| {
        let mut figure = Figure::new_at(kind, x, y);
        for _ in 0..turns {
            figure = figure.rotated();
        }
        figure
    })
}

proptest! {
    #[test]
    fn accepted_placements_are_in_bounds_and_free(
        cells in arb_field(),
        figure in arb_figure(),
        dx in -2i32..3,
        dy in -2i32..3,
    ) {
        let field = field_from(&cells);
        if can_place(&figure, &field, dx, dy) {
            for (col, row) in figure.cells() {
                let (col, row) = (col + dx, row + dy);
                prop_assert!((0..WIDTH as i32).contains(&col));
                prop_assert!(row < HEIGHT as i32);
                if row >= 0 {
                    prop_assert!(!field.is_occupied(col as usize, row as usize));
                }
            }
        }
    }

    #[test]
    fn four_turns_are_identity(figure in arb_figure()) {
        prop_assert_eq!(figure.rotated().rotated().rotated().rotated(), figure);
    }

    #[test]
    fn rotation_commits_first_fitting_kick(cells in arb_field(), figure in arb_figure()) {
        let field = field_from(&cells);
        let rotated = figure.rotated();
        let expected = WALL_KICKS
            .iter()
            .map(|&dx| rotated.moved(dx, 0))
            .find(|candidate| can_place(candidate, &field, 0, 0));

        let (mut game, _clock) = game_at(field, figure);
        let accepted = game.try_rotate();
        let after = game.current.unwrap();

        prop_assert_eq!(accepted, expected.is_some());
        match expected {
            Some(kicked) => {
                prop_assert_eq!((after.x, after.y), (kicked.x, kicked.y));
                prop_assert_eq!(after.mask, kicked.mask);
                prop_assert_eq!((after.width, after.height), (kicked.width, kicked.height));
            }
            None => {
                prop_assert_eq!(after, figure);
            }
        }
    }

    #[test]
    fn clearing_removes_exactly_full_rows(
        cells in arb_field(),
        full in prop::collection::vec(0usize..HEIGHT, 0..5),
    ) {
        let mut field = field_from(&cells);
        for &row in &full {
            for col in 0..WIDTH {
                field.set(col, row, true);
            }
        }
        let complete = (0..HEIGHT).filter(|&row| field.is_row_complete(row)).count();
        let filled = field.total_filled_cells();

        let cleared = field.clear_completed_lines() as usize;

        prop_assert_eq!(cleared, complete);
        prop_assert_eq!(field.total_filled_cells(), filled - cleared * WIDTH);
        prop_assert!((0..HEIGHT).all(|row| !field.is_row_complete(row)));
        prop_assert!(field.rows().take(cleared).all(|row| row.iter().all(|&cell| !cell)));
    }

    #[test]
    fn score_and_level_stay_consistent(clears in prop::collection::vec(0u32..=4, 0..80)) {
        let mut progress = Progress::new(0);
        for lines in clears {
            let before = progress;
            progress.award(lines);

            prop_assert!(progress.score >= before.score);
            prop_assert!(progress.level >= before.level);
            prop_assert!(progress.speed <= before.speed);
            prop_assert_eq!(progress.level, (progress.score / POINTS_FOR_LEVEL + 1).min(MAX_LEVEL));
            prop_assert!((MIN_SPEED..=MAX_SPEED).contains(&progress.speed));
            prop_assert_eq!(progress.high_score, progress.score);
        }
    }
}
