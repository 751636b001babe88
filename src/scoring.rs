/// Points awarded for clearing 0..=4 rows at once.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 700, 1500];
pub const POINTS_FOR_LEVEL: u32 = 600;
pub const MAX_LEVEL: u32 = 10;

// Fall cadence in milliseconds; a larger value is a slower game.
pub const MAX_SPEED: u64 = 1000;
pub const MIN_SPEED: u64 = 100;
pub const LEVEL_SPEED_STEP: u64 = 100;

/// Fall cadence for `level`, floored at [`MIN_SPEED`].
pub fn speed_for_level(level: u32) -> u64 {
    let reduction = u64::from(level.saturating_sub(1)) * LEVEL_SPEED_STEP;
    MAX_SPEED.saturating_sub(reduction).max(MIN_SPEED)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Progress {
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub speed: u64,
}

/// What a single `Progress::award` call changed.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Award {
    pub points: u32,
    pub new_high_score: bool,
    pub level_up: Option<u32>,
}

impl Progress {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            level: 1,
            speed: MAX_SPEED,
        }
    }

    /// Back to level 1 with an empty score; the high score survives.
    pub fn reset(&mut self) {
        *self = Self::new(self.high_score);
    }

    pub fn award(&mut self, lines: u32) -> Award {
        let points = match lines {
            1..=4 => LINE_SCORES[lines as usize],
            _ => return Award::default(),
        };

        let mut award = Award {
            points,
            ..Award::default()
        };

        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            award.new_high_score = true;
        }

        let new_level = self.score / POINTS_FOR_LEVEL + 1;
        if new_level > self.level {
            if new_level <= MAX_LEVEL {
                self.level = new_level;
                self.speed = speed_for_level(new_level);
                award.level_up = Some(new_level);
            } else if self.level < MAX_LEVEL {
                self.level = MAX_LEVEL;
                award.level_up = Some(MAX_LEVEL);
            }
        }

        award
    }
}

