use crate::error::Result;
use crate::field::{Field, HEIGHT, WIDTH};
use crate::figure::{
    Figure, FigureKind, Mask, PieceProvider, RandomPieceProvider, FIGURE_SIZE,
};
use crate::scoring::Progress;
use crate::storage::{self, FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use crate::timing::{Clock, SystemClock, Timers};

/// Horizontal offsets tried, in order, after a rotation.
pub const WALL_KICKS: [i32; 5] = [0, -1, 1, -2, 2];

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UserAction {
    Start,
    Pause,
    Terminate,
    Left,
    Right,
    /// Accepted and ignored.
    Up,
    Down,
    /// Rotate clockwise.
    Action,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Start,
    Spawn,
    Moving,
    Shifting,
    Attaching,
    GameOver,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Started,
    Spawned(FigureKind),
    Moved,
    Rotated,
    LockArmed,
    Attached,
    LinesCleared(u32),
    LevelUp(u32),
    NewHighScore(u32),
    HighScoreNotSaved,
    Paused,
    Unpaused,
    Terminated,
    GameOver,
}

/// Everything a renderer needs after a step.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GameSnapshot {
    pub field: Field,
    pub next: Mask,
    pub current: Option<Figure>,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub speed: u64,
    pub pause: bool,
    pub state: State,
}

impl GameSnapshot {
    /// The settled field with the falling figure drawn in.
    pub fn composed(&self) -> Field {
        let mut grid = self.field.clone();
        if let Some(figure) = &self.current {
            grid.attach(figure);
        }
        grid
    }
}

// ============================================================================
// Collision & Movement Engine
// ============================================================================

/// Whether `figure`, offset by `(dx, dy)`, fits on `field`. Cells above the
/// top edge are allowed; the side walls and the floor are not.
pub fn can_place(figure: &Figure, field: &Field, dx: i32, dy: i32) -> bool {
    figure.cells().all(|(col, row)| {
        let (col, row) = (col + dx, row + dy);
        if !(0..WIDTH as i32).contains(&col) || row >= HEIGHT as i32 {
            return false;
        }
        row < 0 || !field.is_occupied(col as usize, row as usize)
    })
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub field: Field,
    pub current: Option<Figure>,
    pub state: State,
    pub progress: Progress,
    next: Figure,
    preview: Mask,
    pause: bool,
    active: bool,
    timers: Timers,
    piece_provider: Box<dyn PieceProvider>,
    clock: Box<dyn Clock>,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Random pieces, wall-clock time and the high score file in the
    /// working directory.
    pub fn new() -> Result<Self> {
        Self::with_parts(
            Box::new(RandomPieceProvider::new()),
            Box::new(SystemClock::new()),
            Box::new(FileHighScoreStore::default()),
        )
    }

    /// Builds a game in the `Start` state. The high score is read once here.
    pub fn with_parts(
        piece_provider: Box<dyn PieceProvider>,
        clock: Box<dyn Clock>,
        mut store: Box<dyn HighScoreStore>,
    ) -> Result<Self> {
        let field = Field::new()?;
        let high_score = storage::load_or_default(store.as_mut());

        Ok(Self {
            field,
            current: None,
            state: State::Start,
            progress: Progress::new(high_score),
            next: Figure::new(FigureKind::O),
            preview: [[false; FIGURE_SIZE]; FIGURE_SIZE],
            pause: false,
            active: false,
            timers: Timers::default(),
            piece_provider,
            clock,
            store,
            events: Vec::new(),
        })
    }

    /// A game already in `Moving` with `current` falling over `field`.
    pub fn with_field(field: Field, current: Figure, clock: Box<dyn Clock>) -> Self {
        let mut timers = Timers::default();
        timers.reset_fall(clock.now());

        let mut game = Self {
            field,
            current: Some(current),
            state: State::Moving,
            progress: Progress::new(0),
            next: Figure::new(FigureKind::O),
            preview: [[false; FIGURE_SIZE]; FIGURE_SIZE],
            pause: false,
            active: true,
            timers,
            piece_provider: Box::new(RandomPieceProvider::new()),
            clock,
            store: Box::new(MemoryHighScoreStore::new()),
            events: Vec::new(),
        };
        game.generate_next();
        game
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    /// Runs one step and returns the resulting snapshot.
    pub fn update(&mut self, action: Option<UserAction>) -> GameSnapshot {
        self.step(action);
        self.snapshot()
    }

    pub fn step(&mut self, action: Option<UserAction>) {
        if self.pause {
            match action {
                Some(UserAction::Pause) => self.set_pause(false),
                Some(UserAction::Terminate) => self.terminate(),
                _ => {}
            }
            return;
        }

        match action {
            Some(UserAction::Terminate) => {
                self.terminate();
                return;
            }
            Some(UserAction::Down) if !matches!(self.state, State::Moving | State::Shifting) => {
                self.hard_drop();
            }
            _ => {}
        }

        match self.state {
            State::Start => self.start_operate(action),
            State::Spawn => self.spawn_operate(),
            State::Moving => self.moving_operate(action),
            State::Shifting => self.shifting_operate(),
            State::Attaching => self.attaching_operate(),
            State::GameOver => self.gameover_operate(action),
        }
    }

    /// Asks for a forced one-row descent on the next step.
    pub fn force_shift(&mut self) {
        if self.state == State::Moving {
            self.state = State::Shifting;
        }
    }

    /// Sends a grounded figure to `Attaching` once the lock delay has run
    /// out. Called by every `Moving` step; safe to call from a driver too.
    pub fn update_lock_timer(&mut self) {
        let locked = self.current.is_some_and(|figure| figure.locked);
        if self.state == State::Moving && locked && self.timers.lock_expired(self.clock.now()) {
            self.state = State::Attaching;
        }
    }

    fn start_operate(&mut self, action: Option<UserAction>) {
        if action != Some(UserAction::Start) {
            return;
        }

        self.field.clear();
        self.progress.reset();
        self.current = None;
        self.pause = false;
        self.active = true;
        self.timers = Timers::default();
        self.events.clear();
        self.generate_next();
        self.state = State::Spawn;
        self.events.push(GameEvent::Started);
    }

    fn spawn_operate(&mut self) {
        let figure = self.next.at_spawn();
        self.current = Some(figure);
        self.timers.disarm_lock();
        self.generate_next();

        if !can_place(&figure, &self.field, 0, 0) {
            self.game_over();
            return;
        }

        self.events.push(GameEvent::Spawned(figure.kind));
        self.timers.reset_fall(self.clock.now());
        self.state = State::Moving;
    }

    fn moving_operate(&mut self, action: Option<UserAction>) {
        if action == Some(UserAction::Pause) {
            self.set_pause(!self.pause);
            return;
        }

        match action {
            Some(UserAction::Left) => {
                self.try_move(-1, 0);
            }
            Some(UserAction::Right) => {
                self.try_move(1, 0);
            }
            Some(UserAction::Down) => {
                self.descend();
            }
            Some(UserAction::Action) => {
                self.try_rotate();
            }
            _ => {}
        }

        self.update_lock_timer();

        if self.timers.is_time_to_fall(self.clock.now(), self.progress.speed) {
            self.descend();
        }
    }

    fn shifting_operate(&mut self) {
        self.state = if self.try_move(0, 1) {
            State::Moving
        } else {
            State::Attaching
        };
        self.timers.reset_fall(self.clock.now());
    }

    fn attaching_operate(&mut self) {
        if let Some(figure) = self.current.take() {
            self.field.attach(&figure);
            self.events.push(GameEvent::Attached);
        }
        self.timers.disarm_lock();

        let lines = self.field.clear_completed_lines();
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
            self.add_score(lines);
        }

        if self.field.is_top_row_occupied() {
            self.game_over();
        } else {
            self.state = State::Spawn;
        }
    }

    fn gameover_operate(&mut self, action: Option<UserAction>) {
        self.active = false;
        if action == Some(UserAction::Start) {
            self.state = State::Start;
        }
    }

    /// One row down, or on to `Attaching` if that is blocked.
    fn descend(&mut self) {
        if !self.try_move(0, 1) {
            self.state = State::Attaching;
        }
        self.timers.reset_fall(self.clock.now());
    }

    fn set_pause(&mut self, pause: bool) {
        self.pause = pause;
        self.events.push(if pause {
            GameEvent::Paused
        } else {
            GameEvent::Unpaused
        });
    }

    fn terminate(&mut self) {
        self.pause = false;
        self.events.push(GameEvent::Terminated);
        self.game_over();
    }

    fn game_over(&mut self) {
        self.active = false;
        self.state = State::GameOver;
        self.events.push(GameEvent::GameOver);
    }

    fn generate_next(&mut self) {
        self.next = Figure::new(self.piece_provider.next_piece());
        self.preview = self.next.mask;
    }

    // ------------------------------------------------------------------------
    // Movement
    // ------------------------------------------------------------------------

    /// `can_place` for the current figure; false when there is none.
    pub fn can_place(&self, dx: i32, dy: i32) -> bool {
        self.current
            .is_some_and(|figure| can_place(&figure, &self.field, dx, dy))
    }

    /// Shifts the current figure unless it is locked or blocked. Landing on
    /// something arms the lock delay.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(figure) = self.current else {
            return false;
        };
        if figure.locked || !can_place(&figure, &self.field, dx, dy) {
            return false;
        }

        self.current = Some(figure.moved(dx, dy));
        self.events.push(GameEvent::Moved);
        self.arm_lock_if_grounded();
        true
    }

    /// Clockwise rotation with wall kicks. Leaves the figure untouched when
    /// no kick fits.
    pub fn try_rotate(&mut self) -> bool {
        let Some(figure) = self.current else {
            return false;
        };
        if figure.locked {
            return false;
        }

        let rotated = figure.rotated();
        let Some(kicked) = WALL_KICKS
            .iter()
            .map(|&dx| rotated.moved(dx, 0))
            .find(|candidate| can_place(candidate, &self.field, 0, 0))
        else {
            return false;
        };

        self.current = Some(kicked);
        self.events.push(GameEvent::Rotated);
        self.arm_lock_if_grounded();
        true
    }

    /// Drops the figure until it lands. Attaching is left to a later step.
    pub fn hard_drop(&mut self) {
        if !self.active {
            return;
        }
        let mark = self.events.len();
        while self.try_move(0, 1) {}

        // Only the drop's own moves are folded away.
        let mut dropped = self.events.split_off(mark);
        dropped.retain(|e| *e != GameEvent::Moved);
        self.events.append(&mut dropped);
    }

    fn arm_lock_if_grounded(&mut self) {
        let Some(figure) = self.current.as_mut() else {
            return;
        };
        if !can_place(figure, &self.field, 0, 1) {
            figure.locked = true;
            self.timers.arm_lock(self.clock.now());
            self.events.push(GameEvent::LockArmed);
        }
    }

    // ------------------------------------------------------------------------
    // Scoring
    // ------------------------------------------------------------------------

    pub fn add_score(&mut self, lines: u32) {
        let award = self.progress.award(lines);

        if award.new_high_score {
            let high_score = self.progress.high_score;
            self.events.push(GameEvent::NewHighScore(high_score));
            if self.store.save(high_score).is_err() {
                self.events.push(GameEvent::HighScoreNotSaved);
            }
        }
        if let Some(level) = award.level_up {
            self.events.push(GameEvent::LevelUp(level));
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            field: self.field.clone(),
            next: self.preview,
            current: self.current,
            score: self.progress.score,
            high_score: self.progress.high_score,
            level: self.progress.level,
            speed: self.progress.speed,
            pause: self.pause,
            state: self.state,
        }
    }

    pub fn next_kind(&self) -> FigureKind {
        self.next.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_paused(&self) -> bool {
        self.pause
    }

    pub fn is_game_over(&self) -> bool {
        self.state == State::GameOver
    }

    pub fn is_lock_armed(&self) -> bool {
        self.timers.is_lock_armed()
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::timing::ManualClock;

    pub fn empty_field() -> Field {
        Field::new().expect("a 20x10 field always fits in memory")
    }

    pub fn fill_row(field: &mut Field, row: usize) {
        for col in 0..WIDTH {
            field.set(col, row, true);
        }
    }

    pub fn fill_row_with_gap(field: &mut Field, row: usize, gap: usize) {
        for col in 0..WIDTH {
            if col != gap {
                field.set(col, row, true);
            }
        }
    }

    /// `with_field` on a fresh manual clock; the clock handle comes back too.
    pub fn game_at(field: Field, current: Figure) -> (Game, ManualClock) {
        let clock = ManualClock::new();
        let game = Game::with_field(field, current, Box::new(clock.clone()));
        (game, clock)
    }
}
