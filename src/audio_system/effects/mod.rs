/// Playback effects module
///
/// Time-driven and one-shot modifiers applied on top of an entry's settings:
/// the volume cascade, linear fades, delayed starts and trigger-time randomisation.

pub mod delay;
pub mod fade;
pub mod volume;

pub use delay::DelayedStart;
pub use fade::{Fade, FadePhase, FadeStep};
pub use volume::VolumeMixer;

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Range a randomised start delay is drawn from, in seconds
pub const RANDOM_DELAY_RANGE: [f32; 2] = [0.1, 1.0];

/// Ranges used when an entry asks for randomised volume or pitch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomRanges {
    /// [min, max] one-shot playback volume
    pub volume: [f32; 2],

    /// [min, max] one-shot pitch
    pub pitch: [f32; 2],
}

impl Default for RandomRanges {
    fn default() -> Self {
        Self {
            volume: [0.1, 1.0],
            pitch: [0.3, 3.0],
        }
    }
}

impl RandomRanges {
    pub fn with_volume(mut self, min: f32, max: f32) -> Self {
        self.volume = [min, max];
        self
    }

    pub fn with_pitch(mut self, min: f32, max: f32) -> Self {
        self.pitch = [min, max];
        self
    }

    pub fn sample_volume<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        sample(self.volume, rng)
    }

    pub fn sample_pitch<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        sample(self.pitch, rng)
    }
}

/// Effective start delay: the configured one, or a random draw when requested
pub fn resolve_delay<R: Rng + ?Sized>(configured: Duration, randomize: bool, rng: &mut R) -> Duration {
    if randomize {
        Duration::from_secs_f32(sample(RANDOM_DELAY_RANGE, rng))
    } else {
        configured
    }
}

fn sample<R: Rng + ?Sized>([min, max]: [f32; 2], rng: &mut R) -> f32 {
    if min < max {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let ranges = RandomRanges::default().with_volume(0.2, 0.4);

        for _ in 0..200 {
            let volume = ranges.sample_volume(&mut rng);
            assert!((0.2..=0.4).contains(&volume));
            let pitch = ranges.sample_pitch(&mut rng);
            assert!((0.3..=3.0).contains(&pitch));
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let mut rng = StdRng::seed_from_u64(1);
        let ranges = RandomRanges::default().with_pitch(1.2, 1.2);
        assert_eq!(ranges.sample_pitch(&mut rng), 1.2);
    }

    #[test]
    fn test_resolve_delay() {
        let mut rng = StdRng::seed_from_u64(3);
        let configured = Duration::from_millis(250);
        assert_eq!(resolve_delay(configured, false, &mut rng), configured);

        for _ in 0..50 {
            let delay = resolve_delay(Duration::ZERO, true, &mut rng);
            assert!(delay >= Duration::from_millis(99) && delay <= Duration::from_millis(1001));
        }
    }
}
