use crate::error::{Result, TetrisError};
use crate::figure::Figure;

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 20;

/// The settled blocks, stored row-major in one buffer (`row * WIDTH + col`).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    cells: Vec<bool>,
}

impl Field {
    pub fn new() -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(WIDTH * HEIGHT)
            .map_err(|source| TetrisError::Allocation {
                what: "field",
                source,
            })?;
        cells.resize(WIDTH * HEIGHT, false);
        Ok(Self { cells })
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    pub fn is_occupied(&self, col: usize, row: usize) -> bool {
        self.cells[row * WIDTH + col]
    }

    pub fn set(&mut self, col: usize, row: usize, occupied: bool) {
        self.cells[row * WIDTH + col] = occupied;
    }

    pub fn row(&self, row: usize) -> &[bool] {
        &self.cells[row * WIDTH..(row + 1) * WIDTH]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks_exact(WIDTH)
    }

    pub fn is_row_complete(&self, row: usize) -> bool {
        self.row(row).iter().all(|&cell| cell)
    }

    pub fn filled_count_in_row(&self, row: usize) -> usize {
        self.row(row).iter().filter(|&&cell| cell).count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.contains(&true)
    }

    /// Any settled block in row 0 ends the game.
    pub fn is_top_row_occupied(&self) -> bool {
        self.row(0).contains(&true)
    }

    /// Merges the figure's cells into the grid. Cells outside the board
    /// (above the top edge) are dropped.
    pub fn attach(&mut self, figure: &Figure) {
        for (col, row) in figure.cells() {
            if (0..WIDTH as i32).contains(&col) && (0..HEIGHT as i32).contains(&row) {
                self.set(col as usize, row as usize, true);
            }
        }
    }

    /// Removes every full row, bottom to top, dropping the rows above it by
    /// one. Returns how many rows went away.
    pub fn clear_completed_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = HEIGHT;

        while row > 0 {
            let current = row - 1;
            if self.is_row_complete(current) {
                cleared += 1;
                self.cells.copy_within(0..current * WIDTH, WIDTH);
                self.cells[..WIDTH].fill(false);
                // Re-examine the same index: it now holds the row from above.
            } else {
                row -= 1;
            }
        }

        cleared
    }
}
