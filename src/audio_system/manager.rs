/// Audio manager
///
/// Composition root owning the output backend, the sound bank, the optional
/// jukebox and the scheduler. Callers hold the one instance built at startup
/// and drive time with [`AudioManager::update`].

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::bank::{SoundBank, SoundSelector};
use super::device::{OutputBackend, Position};
use super::entry::SoundConfigUpdate;
use super::jukebox::Jukebox;
use super::scheduler::Scheduler;
use super::source::SoundCategory;
use crate::config::AudioConfig;
use crate::error::AudioError;
use crate::messaging::{AudioCommand, AudioEvent};

pub struct AudioManager {
    bank: SoundBank,
    jukebox: Option<Jukebox>,
    scheduler: Scheduler,
    /// Devices borrow the backend's output stream; it must outlive them
    _backend: Box<dyn OutputBackend>,
}

impl AudioManager {
    /// Build the bank (and jukebox, if configured) from a validated config
    pub fn new(config: &AudioConfig, backend: Box<dyn OutputBackend>) -> Result<Self, AudioError> {
        Self::build(config, backend, None)
    }

    /// Same as [`AudioManager::new`] with deterministic random draws
    pub fn with_seed(config: &AudioConfig, backend: Box<dyn OutputBackend>, seed: u64) -> Result<Self, AudioError> {
        Self::build(config, backend, Some(seed))
    }

    fn build(config: &AudioConfig, mut backend: Box<dyn OutputBackend>, seed: Option<u64>) -> Result<Self, AudioError> {
        let mut bank = SoundBank::new(
            backend.as_mut(),
            &config.catalog,
            config.volumes,
            config.random_ranges,
        )?;
        if let Some(seed) = seed {
            bank = bank.with_rng(StdRng::seed_from_u64(seed));
        }

        let jukebox = match &config.jukebox {
            Some(jukebox_config) => {
                let mut jukebox = Jukebox::new(
                    backend.as_mut(),
                    &jukebox_config.playlist,
                    jukebox_config.play_mode,
                    bank.mixer(),
                )?;
                if let Some(seed) = seed {
                    jukebox = jukebox.with_rng(StdRng::seed_from_u64(seed.wrapping_add(1)));
                }
                if jukebox_config.autoplay {
                    jukebox.initialize(bank.mixer())?;
                }
                Some(jukebox)
            }
            None => None,
        };

        Ok(Self {
            bank,
            jukebox,
            scheduler: Scheduler::new(config.tick_interval()),
            _backend: backend,
        })
    }

    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    pub fn jukebox(&self) -> Option<&Jukebox> {
        self.jukebox.as_ref()
    }

    pub fn tick_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    /// Advance logical time by `delta`, running every tick that became due
    pub fn update(&mut self, delta: Duration) {
        let interval = self.scheduler.interval();
        for _ in 0..self.scheduler.advance(delta) {
            self.bank.tick(interval);
            if let Some(jukebox) = &mut self.jukebox {
                if let Err(e) = jukebox.tick(interval, self.bank.mixer()) {
                    tracing::error!("Jukebox failed to advance: {}", e);
                }
            }
        }
    }

    pub fn play_music(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        self.bank.play_music(selector, position)
    }

    pub fn play_sfx(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        self.bank.play_sfx(selector, position)
    }

    pub fn play_voice(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        self.bank.play_voice(selector, position)
    }

    pub fn set_category_volume(&mut self, category: SoundCategory, volume: f32) -> Result<(), AudioError> {
        self.bank.set_category_volume(category, volume)?;
        self.notify_jukebox();
        Ok(())
    }

    pub fn set_music_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.set_category_volume(SoundCategory::Music, volume)
    }

    pub fn set_sfx_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.set_category_volume(SoundCategory::Sfx, volume)
    }

    pub fn set_voice_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.set_category_volume(SoundCategory::Voice, volume)
    }

    pub fn set_master_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        self.bank.set_master_volume(volume)?;
        self.notify_jukebox();
        Ok(())
    }

    pub fn update_global_volumes(&mut self, sfx: f32, music: f32, voice: f32, master: f32) -> Result<(), AudioError> {
        let result = self.bank.update_global_volumes(sfx, music, voice, master);
        self.notify_jukebox();
        result
    }

    pub fn category_volume(&self, category: SoundCategory) -> f32 {
        self.bank.category_volume(category)
    }

    pub fn music_volume(&self) -> f32 {
        self.bank.music_volume()
    }

    pub fn master_volume(&self) -> f32 {
        self.bank.master_volume()
    }

    pub fn update_sound_config(
        &mut self,
        category: SoundCategory,
        index: isize,
        update: SoundConfigUpdate,
    ) -> Result<(), AudioError> {
        self.bank.update_sound_config(category, index, update)
    }

    pub fn stop_all(&mut self) {
        self.bank.stop_all();
    }

    pub fn pause_resume_all(&mut self) {
        self.bank.pause_resume_all();
    }

    pub fn jukebox_play(&mut self) -> Result<(), AudioError> {
        let mixer = self.bank.mixer();
        self.jukebox.as_mut().ok_or(AudioError::NoActiveTrack)?.play(mixer)
    }

    pub fn jukebox_pause(&mut self) -> Result<(), AudioError> {
        let mixer = self.bank.mixer();
        self.jukebox.as_mut().ok_or(AudioError::NoActiveTrack)?.pause(mixer)
    }

    pub fn jukebox_stop(&mut self) -> Result<(), AudioError> {
        self.jukebox.as_mut().ok_or(AudioError::NoActiveTrack)?.stop()
    }

    pub fn jukebox_skip_next(&mut self) -> Result<(), AudioError> {
        let mixer = self.bank.mixer();
        self.jukebox.as_mut().ok_or(AudioError::NoActiveTrack)?.skip_next(mixer)
    }

    pub fn jukebox_skip_random(&mut self) -> Result<(), AudioError> {
        let mixer = self.bank.mixer();
        self.jukebox.as_mut().ok_or(AudioError::NoActiveTrack)?.skip_random(mixer)
    }

    fn notify_jukebox(&mut self) {
        if let Some(jukebox) = &mut self.jukebox {
            jukebox.notify_volume_changed(self.bank.mixer());
        }
    }

    /// Apply one command; `Quit` is left to the driver
    pub fn execute(&mut self, command: AudioCommand) -> Result<(), AudioError> {
        tracing::debug!("Executing command: {}", command.description());

        match command {
            AudioCommand::PlayMusic { selector, position } => self.play_music(selector, position),
            AudioCommand::PlaySfx { selector, position } => self.play_sfx(selector, position),
            AudioCommand::PlayVoice { selector, position } => self.play_voice(selector, position),
            AudioCommand::SetCategoryVolume { category, volume } => self.set_category_volume(category, volume),
            AudioCommand::SetMasterVolume(volume) => self.set_master_volume(volume),
            AudioCommand::UpdateGlobalVolumes {
                sfx,
                music,
                voice,
                master,
            } => self.update_global_volumes(sfx, music, voice, master),
            AudioCommand::UpdateSoundConfig { category, index, update } => {
                self.update_sound_config(category, index, update)
            }
            AudioCommand::StopAll => {
                self.stop_all();
                Ok(())
            }
            AudioCommand::PauseResumeAll => {
                self.pause_resume_all();
                Ok(())
            }
            AudioCommand::JukeboxPlay => self.jukebox_play(),
            AudioCommand::JukeboxPause => self.jukebox_pause(),
            AudioCommand::JukeboxStop => self.jukebox_stop(),
            AudioCommand::JukeboxSkipNext => self.jukebox_skip_next(),
            AudioCommand::JukeboxSkipRandom => self.jukebox_skip_random(),
            AudioCommand::Quit => Ok(()),
        }
    }

    /// Bank events first, then jukebox events
    pub fn drain_events(&mut self) -> Vec<AudioEvent> {
        let mut events = self.bank.drain_events();
        if let Some(jukebox) = &mut self.jukebox {
            events.extend(jukebox.drain_events());
        }
        events
    }
}
