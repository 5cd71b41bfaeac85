/// Linear fade state machine
///
/// One per entry, advanced once per scheduler tick. Rates are volume units per
/// tick. Every step ramps from the device's live volume towards the entry's
/// current cascade target, so a volume change mid-fade moves the end point.
/// Starting a fade replaces whatever was in flight.

/// Observable fade phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadePhase {
    #[default]
    Idle,
    FadingIn,
    FadingOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum FadeState {
    #[default]
    Idle,
    In { rate: f32 },
    Out { rate: f32 },
}

/// Result of advancing a fade by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    /// Still ramping; write this volume
    Ramp(f32),

    /// Fade-in is done. `Some` is a last write that may overshoot the target,
    /// `None` means the live volume was already there.
    InFinished(Option<f32>),

    /// Fade-out reached silence; stop the device and restore its volume
    OutFinished,
}

#[derive(Debug, Clone, Default)]
pub struct Fade {
    state: FadeState,
}

impl Fade {
    pub fn phase(&self) -> FadePhase {
        match self.state {
            FadeState::Idle => FadePhase::Idle,
            FadeState::In { .. } => FadePhase::FadingIn,
            FadeState::Out { .. } => FadePhase::FadingOut,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != FadeState::Idle
    }

    /// Start ramping up from silence. Returns the volume to write now.
    pub fn begin_fade_in(&mut self, rate: f32) -> f32 {
        self.state = FadeState::In { rate };
        0.0
    }

    /// Start ramping down to silence from whatever the device holds
    pub fn begin_fade_out(&mut self, rate: f32) {
        self.state = FadeState::Out { rate };
    }

    pub fn cancel(&mut self) {
        self.state = FadeState::Idle;
    }

    /// Advance one tick from the `live` device volume. `target` is the entry's
    /// effective volume right now. `None` when idle.
    pub fn step(&mut self, live: f32, target: f32) -> Option<FadeStep> {
        match self.state {
            FadeState::Idle => None,
            FadeState::In { rate } => {
                if live >= target {
                    self.state = FadeState::Idle;
                    return Some(FadeStep::InFinished(None));
                }
                if rate <= 0.0 {
                    self.state = FadeState::Idle;
                    return Some(FadeStep::InFinished(Some(target)));
                }
                let next = live + rate;
                if next >= target {
                    self.state = FadeState::Idle;
                    Some(FadeStep::InFinished(Some(next)))
                } else {
                    Some(FadeStep::Ramp(next))
                }
            }
            FadeState::Out { rate } => {
                let next = live - rate.max(0.0);
                if next <= 0.0 || rate <= 0.0 {
                    self.state = FadeState::Idle;
                    Some(FadeStep::OutFinished)
                } else {
                    Some(FadeStep::Ramp(next))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive a fade the way the bank does, feeding every write back as the live volume
    fn run(fade: &mut Fade, mut live: f32, target: f32) -> (Vec<f32>, Option<FadeStep>) {
        let mut writes = Vec::new();
        while let Some(step) = fade.step(live, target) {
            match step {
                FadeStep::Ramp(volume) => {
                    writes.push(volume);
                    live = volume;
                }
                finished => return (writes, Some(finished)),
            }
        }
        (writes, None)
    }

    #[test]
    fn test_fade_out_quarter_rate_takes_four_ticks() {
        let mut fade = Fade::default();
        fade.begin_fade_out(0.25);

        assert_eq!(fade.step(1.0, 1.0), Some(FadeStep::Ramp(0.75)));
        assert_eq!(fade.step(0.75, 1.0), Some(FadeStep::Ramp(0.5)));
        assert_eq!(fade.step(0.5, 1.0), Some(FadeStep::Ramp(0.25)));
        assert_eq!(fade.step(0.25, 1.0), Some(FadeStep::OutFinished));
        assert_eq!(fade.step(0.0, 1.0), None);
        assert_eq!(fade.phase(), FadePhase::Idle);
    }

    #[test]
    fn test_fade_in_overshoots_target_without_clamping() {
        // Known behaviour: the last write lands past the target
        let mut fade = Fade::default();
        assert_eq!(fade.begin_fade_in(0.3), 0.0);

        let (writes, finished) = run(&mut fade, 0.0, 0.5);
        assert_eq!(writes, vec![0.3]);
        match finished {
            Some(FadeStep::InFinished(Some(last))) => assert!((last - 0.6).abs() < 1e-6),
            other => panic!("expected fade-in to finish, got {:?}", other),
        }
        assert_eq!(fade.step(0.6, 0.5), None);
    }

    #[test]
    fn test_fade_in_to_silent_target_writes_nothing() {
        let mut fade = Fade::default();
        let start = fade.begin_fade_in(0.25);

        assert_eq!(fade.step(start, 0.0), Some(FadeStep::InFinished(None)));
        assert!(!fade.is_active());
    }

    #[test]
    fn test_fade_in_follows_target_changed_mid_fade() {
        let mut fade = Fade::default();
        fade.begin_fade_in(0.25);
        assert_eq!(fade.step(0.0, 1.0), Some(FadeStep::Ramp(0.25)));

        // Target lowered below the ramp: finish without writing over it
        assert_eq!(fade.step(0.3, 0.3), Some(FadeStep::InFinished(None)));

        // Target raised: keep ramping past the old end point
        fade.begin_fade_in(0.25);
        let (writes, finished) = run(&mut fade, 0.0, 1.0);
        assert_eq!(writes, vec![0.25, 0.5, 0.75]);
        assert_eq!(finished, Some(FadeStep::InFinished(Some(1.0))));
    }

    #[test]
    fn test_new_fade_supersedes_old_one() {
        let mut fade = Fade::default();
        fade.begin_fade_out(0.1);
        fade.step(1.0, 1.0);

        fade.begin_fade_in(0.5);
        assert_eq!(fade.phase(), FadePhase::FadingIn);
        assert_eq!(fade.step(0.0, 1.0), Some(FadeStep::Ramp(0.5)));
    }

    #[test]
    fn test_zero_rate_finishes_immediately() {
        let mut fade = Fade::default();
        fade.begin_fade_in(0.0);
        assert_eq!(fade.step(0.0, 0.7), Some(FadeStep::InFinished(Some(0.7))));

        fade.begin_fade_out(0.0);
        assert_eq!(fade.step(0.7, 0.7), Some(FadeStep::OutFinished));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut fade = Fade::default();
        fade.begin_fade_out(0.1);
        fade.cancel();
        assert!(!fade.is_active());
        assert_eq!(fade.step(1.0, 1.0), None);
    }
}
