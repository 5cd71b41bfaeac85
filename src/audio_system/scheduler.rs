/// Fixed-interval scheduler
///
/// Converts caller-supplied frame deltas into whole ticks. Fades, delayed
/// starts and the jukebox timer all advance once per tick.
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    accumulator: Duration,
}

impl Scheduler {
    /// A zero interval falls back to the default
    pub fn new(interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_TICK_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Add `delta` and return how many whole ticks are now due
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta;
        let mut due = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            due += 1;
        }
        due
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}
