use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::field::WIDTH;

// ============================================================================
// Figure Catalog
// ============================================================================

/// Side of the square mask every figure lives in.
pub const FIGURE_SIZE: usize = 4;

pub type Mask = [[bool; FIGURE_SIZE]; FIGURE_SIZE];

const B: bool = true;
const E: bool = false;

/// Spawn-orientation masks, indexed by `FigureKind as usize`.
pub const SHAPES: [Mask; 7] = [
    // O
    [[B, B, E, E], [B, B, E, E], [E, E, E, E], [E, E, E, E]],
    // J
    [[B, E, E, E], [B, B, B, E], [E, E, E, E], [E, E, E, E]],
    // L
    [[E, E, B, E], [B, B, B, E], [E, E, E, E], [E, E, E, E]],
    // I
    [[B, B, B, B], [E, E, E, E], [E, E, E, E], [E, E, E, E]],
    // S
    [[E, B, B, E], [B, B, E, E], [E, E, E, E], [E, E, E, E]],
    // Z
    [[B, B, E, E], [E, B, B, E], [E, E, E, E], [E, E, E, E]],
    // T
    [[E, B, E, E], [B, B, B, E], [E, E, E, E], [E, E, E, E]],
];

/// `(width, height)` bounding boxes matching [`SHAPES`].
pub const SIZES: [(usize, usize); 7] = [(2, 2), (3, 2), (3, 2), (4, 1), (3, 2), (3, 2), (3, 2)];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum FigureKind {
    O,
    J,
    L,
    I,
    S,
    Z,
    T,
}

impl FigureKind {
    pub const ALL: [FigureKind; 7] = [
        FigureKind::O,
        FigureKind::J,
        FigureKind::L,
        FigureKind::I,
        FigureKind::S,
        FigureKind::Z,
        FigureKind::T,
    ];

    pub fn mask(self) -> Mask {
        SHAPES[self as usize]
    }

    pub fn size(self) -> (usize, usize) {
        SIZES[self as usize]
    }

    fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Active Figure
// ============================================================================

/// A piece on (or above) the board. `x`/`y` address the top-left corner of
/// the bounding box; only the `width × height` corner of `mask` is meaningful.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Figure {
    pub kind: FigureKind,
    pub mask: Mask,
    pub width: usize,
    pub height: usize,
    pub x: i32,
    pub y: i32,
    pub locked: bool,
}

impl Figure {
    pub fn new(kind: FigureKind) -> Self {
        Self::new_at(kind, 0, 0)
    }

    pub fn new_at(kind: FigureKind, x: i32, y: i32) -> Self {
        let (width, height) = kind.size();
        Self {
            kind,
            mask: kind.mask(),
            width,
            height,
            x,
            y,
            locked: false,
        }
    }

    /// Places the figure horizontally centered on the top row.
    pub fn spawned(kind: FigureKind) -> Self {
        Self::new(kind).at_spawn()
    }

    /// Same shape, moved to the spawn point with the lock flag cleared.
    pub fn at_spawn(&self) -> Self {
        Self {
            x: (WIDTH / 2) as i32 - (self.width / 2) as i32,
            y: 0,
            locked: false,
            ..*self
        }
    }

    /// Board coordinates `(column, row)` of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width)
                .filter(move |&col| self.mask[row][col])
                .map(move |col| (self.x + col as i32, self.y + row as i32))
        })
    }

    pub fn moved(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Quarter turn clockwise inside the bounding box; width and height swap
    /// and the position is left where it was.
    pub fn rotated(&self) -> Self {
        let mut mask = [[false; FIGURE_SIZE]; FIGURE_SIZE];
        for row in 0..self.height {
            for col in 0..self.width {
                mask[col][self.height - 1 - row] = self.mask[row][col];
            }
        }
        Self {
            mask,
            width: self.height,
            height: self.width,
            ..*self
        }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> FigureKind;
}

/// Uniform choice over the seven kinds.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> FigureKind {
        FigureKind::random(&mut self.rng)
    }
}

/// Cycles through a fixed list; an empty list yields `O` forever.
pub struct SequencePieceProvider {
    pieces: Vec<FigureKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<FigureKind>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> FigureKind {
        if self.pieces.is_empty() {
            return FigureKind::O;
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
