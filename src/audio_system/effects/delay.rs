/// Delayed start countdown
///
/// The device performs the deferred audio start itself; this countdown tells
/// the bank when the sound has logically started so it can be registered.
use std::time::Duration;

use crate::audio_system::entry::SoundKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayedStart {
    key: SoundKey,
    remaining: Duration,
    generation: u64,
}

impl DelayedStart {
    /// `generation` is the entry's generation at trigger time
    pub fn new(key: SoundKey, delay: Duration, generation: u64) -> Self {
        Self {
            key,
            remaining: delay,
            generation,
        }
    }

    pub fn key(&self) -> SoundKey {
        self.key
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Whether the entry has not been stopped since this start was scheduled
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Count down by `elapsed`; true once the delay has run out
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(elapsed);
        self.remaining.is_zero()
    }
}
