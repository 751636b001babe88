use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Grace period between a figure touching down and being merged.
pub const LOCK_DELAY_MS: u64 = 500;

// ============================================================================
// Clocks
// ============================================================================

/// Monotonic time source. Only differences between readings matter.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same reading, so a test can keep one
/// handle and give the other to the game.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.set(self.now.get() + Duration::from_millis(ms));
    }

    pub fn set_ms(&self, ms: u64) {
        self.now.set(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

// ============================================================================
// Timers
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Timers {
    last_fall: Duration,
    lock_start: Option<Duration>,
}

impl Timers {
    pub fn reset_fall(&mut self, now: Duration) {
        self.last_fall = now;
    }

    pub fn is_time_to_fall(&self, now: Duration, speed_ms: u64) -> bool {
        now.saturating_sub(self.last_fall) >= Duration::from_millis(speed_ms)
    }

    pub fn arm_lock(&mut self, now: Duration) {
        self.lock_start = Some(now);
    }

    pub fn disarm_lock(&mut self) {
        self.lock_start = None;
    }

    pub fn is_lock_armed(&self) -> bool {
        self.lock_start.is_some()
    }

    pub fn lock_expired(&self, now: Duration) -> bool {
        self.lock_start
            .is_some_and(|start| now.saturating_sub(start) >= Duration::from_millis(LOCK_DELAY_MS))
    }
}
