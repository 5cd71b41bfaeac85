/// Jukebox
///
/// Autonomous playlist scheduler on top of its own set of music entries.
/// Each tick advances the playhead of the current track; once the clip's
/// duration has elapsed the next track (sequential or random) starts.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::device::OutputBackend;
use super::effects::VolumeMixer;
use super::entry::{SoundDefinition, SoundEntry};
use super::source::SoundCategory;
use crate::error::AudioError;
use crate::messaging::AudioEvent;
use crate::state::{JukeboxState, JukeboxStateMachine, TransitionError};

/// How the next track is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    #[default]
    Sequential,
    Random,
}

pub struct Jukebox {
    playlist: Vec<SoundEntry>,
    cursor: usize,
    mode: PlayMode,
    elapsed: Duration,
    play_time: Duration,
    lifecycle: JukeboxStateMachine,
    rng: StdRng,
    events: Vec<AudioEvent>,
}

impl Jukebox {
    /// Open a device for every playlist track; playback starts with [`Jukebox::initialize`]
    pub fn new(
        backend: &mut dyn OutputBackend,
        playlist: &[SoundDefinition],
        mode: PlayMode,
        mixer: &VolumeMixer,
    ) -> Result<Self, AudioError> {
        let playlist = playlist
            .iter()
            .map(|definition| {
                let device = backend.open(&format!("playlist/{}", definition.name), &definition.clip)?;
                Ok(SoundEntry::new(definition, SoundCategory::Music, device, mixer))
            })
            .collect::<Result<Vec<_>, AudioError>>()?;

        tracing::info!("Jukebox loaded {} tracks ({:?})", playlist.len(), mode);

        Ok(Self {
            playlist,
            cursor: 0,
            mode,
            elapsed: Duration::ZERO,
            play_time: Duration::ZERO,
            lifecycle: JukeboxStateMachine::new(),
            rng: StdRng::from_entropy(),
            events: Vec::new(),
        })
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn state(&self) -> JukeboxState {
        self.lifecycle.state()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
    }

    /// Time since the current track started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Duration of the current track
    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    pub fn playlist(&self) -> &[SoundEntry] {
        &self.playlist
    }

    /// Track under the cursor, once initialized
    pub fn current_track(&self) -> Option<&SoundEntry> {
        if self.state().is_initialized() {
            self.playlist.get(self.cursor)
        } else {
            None
        }
    }

    /// Start track 0 and enter `Playing`
    pub fn initialize(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        if self.state().is_initialized() {
            tracing::debug!("Jukebox already initialized");
            return Ok(());
        }
        if self.playlist.is_empty() {
            tracing::warn!("Jukebox playlist is empty");
            return Err(AudioError::NoActiveTrack);
        }

        self.start_track(0, mixer)?;
        self.transition(JukeboxStateMachine::finish_initializing);
        Ok(())
    }

    /// Advance the playhead by one scheduler tick
    pub fn tick(&mut self, interval: Duration, mixer: &VolumeMixer) -> Result<(), AudioError> {
        if !self.state().is_playing() {
            return Ok(());
        }

        self.elapsed += interval;
        if self.elapsed >= self.play_time {
            let next = match self.mode {
                PlayMode::Sequential => self.next_index(),
                PlayMode::Random => self.random_index(),
            };
            self.switch_to(next, mixer)?;
        }
        Ok(())
    }

    /// Toggle pause from the lifecycle state
    ///
    /// Unpausing re-applies the cascade in case global volumes changed meanwhile.
    /// A stopped jukebox is left alone.
    pub fn pause(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        match self.state() {
            JukeboxState::Initializing => Err(AudioError::NoActiveTrack),
            JukeboxState::Playing => {
                self.playlist[self.cursor].device.pause();
                self.transition(JukeboxStateMachine::pause);
                Ok(())
            }
            JukeboxState::Paused => {
                let track = &mut self.playlist[self.cursor];
                track.recascade(mixer);
                track.device.unpause();
                self.transition(JukeboxStateMachine::unpause);
                Ok(())
            }
            JukeboxState::Stopped => {
                tracing::debug!("Jukebox is stopped, nothing to pause");
                Ok(())
            }
        }
    }

    pub fn stop(&mut self) -> Result<(), AudioError> {
        match self.state() {
            JukeboxState::Initializing => Err(AudioError::NoActiveTrack),
            JukeboxState::Stopped => Ok(()),
            JukeboxState::Playing | JukeboxState::Paused => {
                self.playlist[self.cursor].halt();
                self.transition(JukeboxStateMachine::stop);
                Ok(())
            }
        }
    }

    /// Restart the current track from its beginning
    pub fn resume_from_stop(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        if !self.state().is_stopped() {
            tracing::debug!("Jukebox not stopped ({})", self.state().description());
            return Ok(());
        }
        self.start_track(self.cursor, mixer)?;
        self.transition(JukeboxStateMachine::resume);
        Ok(())
    }

    /// Single transport entry point dispatching on the lifecycle state
    pub fn play(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        match self.state() {
            JukeboxState::Initializing => self.initialize(mixer),
            JukeboxState::Paused => self.pause(mixer),
            JukeboxState::Stopped => self.resume_from_stop(mixer),
            JukeboxState::Playing => Ok(()),
        }
    }

    /// Next track in playlist order; lifecycle state is unchanged
    pub fn skip_next(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        self.require_track()?;
        let next = self.next_index();
        self.switch_to(next, mixer)
    }

    /// Random track other than the current one; lifecycle state is unchanged
    pub fn skip_random(&mut self, mixer: &VolumeMixer) -> Result<(), AudioError> {
        self.require_track()?;
        let next = self.random_index();
        self.switch_to(next, mixer)
    }

    /// Re-apply the cascade to the current track only
    pub fn notify_volume_changed(&mut self, mixer: &VolumeMixer) {
        if let Some(track) = self.playlist.get_mut(self.cursor) {
            track.recascade(mixer);
        }
    }

    pub fn drain_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }

    fn require_track(&self) -> Result<(), AudioError> {
        if self.state().is_initialized() && !self.playlist.is_empty() {
            Ok(())
        } else {
            Err(AudioError::NoActiveTrack)
        }
    }

    fn next_index(&self) -> usize {
        (self.cursor + 1) % self.playlist.len()
    }

    /// Uniform over every index except the cursor; a single track repeats
    fn random_index(&mut self) -> usize {
        let len = self.playlist.len();
        if len <= 1 {
            return self.cursor;
        }
        let pick = self.rng.gen_range(0..len - 1);
        if pick >= self.cursor {
            pick + 1
        } else {
            pick
        }
    }

    fn switch_to(&mut self, index: usize, mixer: &VolumeMixer) -> Result<(), AudioError> {
        self.playlist[self.cursor].halt();
        self.start_track(index, mixer)
    }

    /// Point the cursor at `index`, reset the timer and start playback
    fn start_track(&mut self, index: usize, mixer: &VolumeMixer) -> Result<(), AudioError> {
        self.cursor = index;
        self.elapsed = Duration::ZERO;

        let track = &mut self.playlist[index];
        self.play_time = track.clip().duration;
        track.recascade(mixer);
        track.device.play()?;

        tracing::info!("Jukebox playing track {}: {} ({:?})", index, track.name(), self.play_time);
        self.events.push(AudioEvent::TrackChanged {
            index,
            name: track.name().to_string(),
        });
        Ok(())
    }

    fn transition(&mut self, step: fn(&mut JukeboxStateMachine) -> Result<(), TransitionError>) {
        let old_state = self.lifecycle.state();
        match step(&mut self.lifecycle) {
            Ok(()) => {
                let new_state = self.lifecycle.state();
                tracing::debug!("Jukebox {} -> {}", old_state.description(), new_state.description());
                self.events.push(AudioEvent::JukeboxStateChanged { old_state, new_state });
            }
            Err(e) => tracing::warn!("Jukebox transition rejected: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::entry::AudioClip;
    use crate::audio_system::headless::HeadlessBackend;

    const TICK: Duration = Duration::from_millis(100);

    fn track(name: &str, secs: u64) -> SoundDefinition {
        SoundDefinition::new(name, AudioClip::new(format!("{}.ogg", name), Duration::from_secs(secs)))
    }

    fn jukebox(tracks: &[SoundDefinition], mode: PlayMode) -> (Jukebox, HeadlessBackend) {
        let backend = HeadlessBackend::new();
        let jukebox = Jukebox::new(&mut backend.clone(), tracks, mode, &VolumeMixer::default())
            .unwrap()
            .with_rng(StdRng::seed_from_u64(9));
        (jukebox, backend)
    }

    fn run(jukebox: &mut Jukebox, ticks: u32, mixer: &VolumeMixer) {
        for _ in 0..ticks {
            jukebox.tick(TICK, mixer).unwrap();
        }
    }

    #[test]
    fn test_initialize_starts_first_track() {
        let (mut jukebox, backend) = jukebox(&[track("A", 30), track("B", 45)], PlayMode::Sequential);
        assert!(jukebox.current_track().is_none());

        jukebox.initialize(&VolumeMixer::default()).unwrap();

        assert_eq!(jukebox.state(), JukeboxState::Playing);
        assert_eq!(jukebox.cursor(), 0);
        assert_eq!(jukebox.play_time(), Duration::from_secs(30));
        assert!(backend.probe("playlist/A").unwrap().playing);
    }

    #[test]
    fn test_empty_playlist_has_no_active_track() {
        let (mut jukebox, _) = jukebox(&[], PlayMode::Sequential);
        let mixer = VolumeMixer::default();
        assert!(matches!(jukebox.initialize(&mixer), Err(AudioError::NoActiveTrack)));
        assert!(matches!(jukebox.skip_next(&mixer), Err(AudioError::NoActiveTrack)));
        assert!(matches!(jukebox.pause(&mixer), Err(AudioError::NoActiveTrack)));
        assert_eq!(jukebox.state(), JukeboxState::Initializing);
    }

    #[test]
    fn test_sequential_advance_and_wrap() {
        let mixer = VolumeMixer::default();
        let (mut jukebox, backend) = jukebox(&[track("A", 30), track("B", 45)], PlayMode::Sequential);
        jukebox.initialize(&mixer).unwrap();

        run(&mut jukebox, 299, &mixer);
        assert_eq!(jukebox.cursor(), 0);

        run(&mut jukebox, 1, &mixer);
        assert_eq!(jukebox.cursor(), 1);
        assert_eq!(jukebox.elapsed(), Duration::ZERO);
        assert_eq!(jukebox.play_time(), Duration::from_secs(45));
        assert!(!backend.probe("playlist/A").unwrap().playing);
        assert!(backend.probe("playlist/B").unwrap().playing);

        run(&mut jukebox, 450, &mixer);
        assert_eq!(jukebox.cursor(), 0);
        assert_eq!(jukebox.play_time(), Duration::from_secs(30));
    }

    #[test]
    fn test_single_track_random_terminates() {
        let mixer = VolumeMixer::default();
        let (mut jukebox, backend) = jukebox(&[track("Only", 1)], PlayMode::Random);
        jukebox.initialize(&mixer).unwrap();

        jukebox.skip_random(&mixer).unwrap();
        assert_eq!(jukebox.cursor(), 0);

        run(&mut jukebox, 10, &mixer);
        assert_eq!(jukebox.cursor(), 0);
        assert_eq!(backend.probe("playlist/Only").unwrap().play_count, 3);
    }

    #[test]
    fn test_random_never_repeats_immediately() {
        let mixer = VolumeMixer::default();
        let tracks = [track("A", 10), track("B", 10), track("C", 10)];
        let (mut jukebox, _) = jukebox(&tracks, PlayMode::Random);
        jukebox.initialize(&mixer).unwrap();

        for _ in 0..50 {
            let before = jukebox.cursor();
            jukebox.skip_random(&mixer).unwrap();
            assert_ne!(jukebox.cursor(), before);
        }
    }

    #[test]
    fn test_pause_freezes_timer_and_recascades_on_unpause() {
        let mut mixer = VolumeMixer::default();
        let (mut jukebox, backend) = jukebox(&[track("A", 30)], PlayMode::Sequential);
        jukebox.initialize(&mixer).unwrap();
        run(&mut jukebox, 5, &mixer);

        jukebox.pause(&mixer).unwrap();
        assert_eq!(jukebox.state(), JukeboxState::Paused);
        run(&mut jukebox, 5, &mixer);
        assert_eq!(jukebox.elapsed(), Duration::from_millis(500));

        mixer.set_master(0.5).unwrap();
        jukebox.pause(&mixer).unwrap();
        assert_eq!(jukebox.state(), JukeboxState::Playing);
        let probe = backend.probe("playlist/A").unwrap();
        assert!(probe.playing);
        assert!((probe.volume - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stop_then_play_restarts_current_track() {
        let mixer = VolumeMixer::default();
        let (mut jukebox, backend) = jukebox(&[track("A", 30), track("B", 45)], PlayMode::Sequential);
        jukebox.initialize(&mixer).unwrap();
        jukebox.skip_next(&mixer).unwrap();
        run(&mut jukebox, 20, &mixer);

        jukebox.stop().unwrap();
        assert_eq!(jukebox.state(), JukeboxState::Stopped);
        assert!(!backend.probe("playlist/B").unwrap().playing);
        run(&mut jukebox, 20, &mixer);

        jukebox.play(&mixer).unwrap();
        assert_eq!(jukebox.state(), JukeboxState::Playing);
        assert_eq!(jukebox.cursor(), 1);
        assert_eq!(jukebox.elapsed(), Duration::ZERO);
        assert!(backend.probe("playlist/B").unwrap().playing);
    }

    #[test]
    fn test_skip_keeps_lifecycle_state() {
        let mixer = VolumeMixer::default();
        let (mut jukebox, _) = jukebox(&[track("A", 30), track("B", 45)], PlayMode::Sequential);
        jukebox.initialize(&mixer).unwrap();
        jukebox.stop().unwrap();

        jukebox.skip_next(&mixer).unwrap();
        assert_eq!(jukebox.state(), JukeboxState::Stopped);
        assert_eq!(jukebox.cursor(), 1);
    }

    #[test]
    fn test_events_record_tracks_and_states() {
        let mixer = VolumeMixer::default();
        let (mut jukebox, _) = jukebox(&[track("A", 30), track("B", 45)], PlayMode::Sequential);
        jukebox.play(&mixer).unwrap();

        let events = jukebox.drain_events();
        assert_eq!(
            events,
            vec![
                AudioEvent::TrackChanged { index: 0, name: "A".to_string() },
                AudioEvent::JukeboxStateChanged {
                    old_state: JukeboxState::Initializing,
                    new_state: JukeboxState::Playing,
                },
            ]
        );
        assert!(jukebox.drain_events().is_empty());
    }
}
