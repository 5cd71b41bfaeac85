/// Sound bank
///
/// Owns the music, SFX and voice catalogs, the global volume multipliers and
/// the bookkeeping of what is currently playing. All operations return
/// immediately; fades and delayed starts advance in [`SoundBank::tick`].

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::device::{OutputBackend, Position};
use super::effects::{resolve_delay, DelayedStart, FadePhase, FadeStep, RandomRanges, VolumeMixer};
use super::entry::{SoundConfigUpdate, SoundDefinition, SoundEntry, SoundKey};
use super::source::SoundCategory;
use crate::config::SoundCatalog;
use crate::error::AudioError;
use crate::messaging::AudioEvent;

/// Name or index of a sound inside one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSelector {
    Name(String),
    Index(isize),
}

impl fmt::Display for SoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSelector::Name(name) => write!(f, "'{}'", name),
            SoundSelector::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl From<&str> for SoundSelector {
    fn from(name: &str) -> Self {
        SoundSelector::Name(name.to_string())
    }
}

impl From<String> for SoundSelector {
    fn from(name: String) -> Self {
        SoundSelector::Name(name)
    }
}

impl From<isize> for SoundSelector {
    fn from(index: isize) -> Self {
        SoundSelector::Index(index)
    }
}

impl From<i32> for SoundSelector {
    fn from(index: i32) -> Self {
        SoundSelector::Index(index as isize)
    }
}

fn slot(category: SoundCategory) -> usize {
    match category {
        SoundCategory::Music => 0,
        SoundCategory::Sfx => 1,
        SoundCategory::Voice => 2,
    }
}

pub struct SoundBank {
    collections: [Vec<SoundEntry>; 3],
    mixer: VolumeMixer,
    ranges: RandomRanges,
    current_music: Option<usize>,
    previous_music: Option<usize>,
    active_sfx: Vec<usize>,
    active_voices: Vec<usize>,
    delayed: Vec<DelayedStart>,
    rng: StdRng,
    events: Vec<AudioEvent>,
}

impl SoundBank {
    /// Open one device per catalog entry and apply its settings
    pub fn new(
        backend: &mut dyn OutputBackend,
        catalog: &SoundCatalog,
        mixer: VolumeMixer,
        ranges: RandomRanges,
    ) -> Result<Self, AudioError> {
        let collections = [
            build_collection(backend, SoundCategory::Music, &catalog.music, &mixer)?,
            build_collection(backend, SoundCategory::Sfx, &catalog.sfx, &mixer)?,
            build_collection(backend, SoundCategory::Voice, &catalog.voice, &mixer)?,
        ];

        tracing::info!(
            "Sound bank ready: {} music, {} sfx, {} voice",
            collections[0].len(),
            collections[1].len(),
            collections[2].len()
        );

        Ok(Self {
            collections,
            mixer,
            ranges,
            current_music: None,
            previous_music: None,
            active_sfx: Vec::new(),
            active_voices: Vec::new(),
            delayed: Vec::new(),
            rng: StdRng::from_entropy(),
            events: Vec::new(),
        })
    }

    /// Replace the random source (seeded banks are deterministic)
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn collection(&self, category: SoundCategory) -> &[SoundEntry] {
        &self.collections[slot(category)]
    }

    pub fn entry(&self, key: SoundKey) -> Option<&SoundEntry> {
        self.collections[slot(key.category)].get(key.index)
    }

    /// First entry named `name`
    pub fn find_by_name(&self, category: SoundCategory, name: &str) -> Result<&SoundEntry, AudioError> {
        let key = self.resolve(category, &SoundSelector::Name(name.to_string()))?;
        Ok(&self.collections[slot(category)][key.index])
    }

    /// Entry at `index`; valid range is `0..len`
    pub fn find_by_index(&self, category: SoundCategory, index: isize) -> Result<&SoundEntry, AudioError> {
        let key = self.resolve(category, &SoundSelector::Index(index))?;
        Ok(&self.collections[slot(category)][key.index])
    }

    /// Turn a selector into a stable key without touching any state
    pub fn resolve(&self, category: SoundCategory, selector: &SoundSelector) -> Result<SoundKey, AudioError> {
        let entries = &self.collections[slot(category)];
        let index = match selector {
            SoundSelector::Name(name) => entries
                .iter()
                .position(|entry| entry.name() == name)
                .ok_or_else(|| AudioError::NotFound {
                    category,
                    name: name.clone(),
                })?,
            SoundSelector::Index(index) => usize::try_from(*index)
                .ok()
                .filter(|i| *i < entries.len())
                .ok_or(AudioError::OutOfRange {
                    category,
                    index: *index,
                    len: entries.len(),
                })?,
        };
        Ok(SoundKey { category, index })
    }

    pub fn mixer(&self) -> &VolumeMixer {
        &self.mixer
    }

    pub fn category_volume(&self, category: SoundCategory) -> f32 {
        self.mixer.category(category)
    }

    pub fn music_volume(&self) -> f32 {
        self.mixer.category(SoundCategory::Music)
    }

    pub fn master_volume(&self) -> f32 {
        self.mixer.master()
    }

    /// Set a category multiplier and re-cascade that category
    pub fn set_category_volume(&mut self, category: SoundCategory, volume: f32) -> Result<(), AudioError> {
        if let Err(e) = self.mixer.set_category(category, volume) {
            tracing::debug!("Ignoring {} volume {}: {}", category, volume, e);
            return Err(e);
        }
        self.recascade(category);
        self.events.push(AudioEvent::VolumeChanged {
            category: Some(category),
            volume,
        });
        Ok(())
    }

    /// Set the master multiplier and re-cascade every category
    pub fn set_master_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        if let Err(e) = self.mixer.set_master(volume) {
            tracing::debug!("Ignoring master volume {}: {}", volume, e);
            return Err(e);
        }
        self.recascade_all();
        self.events.push(AudioEvent::VolumeChanged {
            category: None,
            volume,
        });
        Ok(())
    }

    /// Set all four multipliers at once
    ///
    /// Each value is validated on its own; valid ones are applied even when
    /// another is rejected. Returns the first rejection.
    pub fn update_global_volumes(&mut self, sfx: f32, music: f32, voice: f32, master: f32) -> Result<(), AudioError> {
        let results = [
            self.mixer.set_category(SoundCategory::Sfx, sfx),
            self.mixer.set_category(SoundCategory::Music, music),
            self.mixer.set_category(SoundCategory::Voice, voice),
            self.mixer.set_master(master),
        ];
        self.recascade_all();
        self.events.push(AudioEvent::VolumeChanged {
            category: None,
            volume: self.mixer.master(),
        });
        results.into_iter().collect()
    }

    /// Bulk re-cascade of one category
    fn recascade(&mut self, category: SoundCategory) {
        for entry in &mut self.collections[slot(category)] {
            entry.recascade(&self.mixer);
        }
        tracing::debug!("Re-cascaded {} volumes", category);
    }

    fn recascade_all(&mut self) {
        for category in SoundCategory::all() {
            self.recascade(category);
        }
    }

    /// Overwrite an entry's static configuration and re-cascade it
    pub fn update_sound_config(
        &mut self,
        category: SoundCategory,
        index: isize,
        update: SoundConfigUpdate,
    ) -> Result<(), AudioError> {
        let key = self.lookup(category, &SoundSelector::Index(index))?;
        self.collections[slot(category)][key.index].apply_update(update, &self.mixer)
    }

    /// Switch background music, cross-fading when the new track asks for it
    pub fn play_music(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        let key = self.lookup(SoundCategory::Music, &selector.into())?;
        let index = key.index;

        self.previous_music = self.current_music;
        self.current_music = Some(index);

        let music = &mut self.collections[0];
        let previous_name = self.previous_music.map(|i| music[i].name().to_string());
        let current = &mut music[index];
        tracing::info!("Playing music: {}", current.name());
        self.events.push(AudioEvent::MusicChanged {
            previous: previous_name,
            current: current.name().to_string(),
        });

        if let Some(position) = position {
            current.device.set_position(position);
        }

        // A restart replaces anything the device still had queued
        current.generation += 1;
        self.delayed.retain(|pending| pending.key() != key);

        let delay = resolve_delay(current.settings().delay(), current.settings().randomize_delay, &mut self.rng);
        if !delay.is_zero() {
            current.device.play_delayed(delay)?;
            self.delayed.push(DelayedStart::new(key, delay, current.generation));
            return Ok(());
        }

        current.device.play()?;
        self.events.push(AudioEvent::SoundStarted {
            category: SoundCategory::Music,
            name: current.name().to_string(),
        });

        let previous = self.previous_music.filter(|i| *i != index);
        if current.settings().fade_enabled {
            let rate = current.settings().fade_in_rate;
            let start = current.fade.begin_fade_in(rate);
            current.device.set_volume(start);

            if let Some(i) = previous {
                let previous = &mut music[i];
                let rate = previous.settings().fade_out_rate;
                previous.fade.begin_fade_out(rate);
            }
        } else {
            if current.fade.is_active() {
                current.fade.cancel();
                let volume = current.effective_volume();
                current.device.set_volume(volume);
            }
            if let Some(i) = previous {
                music[i].halt();
            }
        }
        Ok(())
    }

    pub fn play_sfx(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        self.trigger(SoundCategory::Sfx, selector.into(), position)
    }

    pub fn play_voice(&mut self, selector: impl Into<SoundSelector>, position: Option<Position>) -> Result<(), AudioError> {
        self.trigger(SoundCategory::Voice, selector.into(), position)
    }

    /// Start an SFX or voice entry: randomise, place, then start now or later
    fn trigger(&mut self, category: SoundCategory, selector: SoundSelector, position: Option<Position>) -> Result<(), AudioError> {
        let key = self.lookup(category, &selector)?;
        let entry = &mut self.collections[slot(category)][key.index];
        let settings = entry.settings().clone();

        if settings.randomize_volume {
            let volume = self.ranges.sample_volume(&mut self.rng);
            entry.device.set_volume(volume);
        }
        if settings.randomize_pitch {
            let pitch = self.ranges.sample_pitch(&mut self.rng);
            entry.device.set_pitch(pitch);
        }
        if let Some(position) = position {
            entry.device.set_position(position);
        }

        // A restart replaces anything the device still had queued
        entry.generation += 1;
        self.delayed.retain(|pending| pending.key() != key);

        let delay = resolve_delay(settings.delay(), settings.randomize_delay, &mut self.rng);
        if delay.is_zero() {
            tracing::info!("Playing {}: {}", category, entry.name());
            entry.device.play()?;
            let name = entry.name().to_string();
            self.register_active(key);
            self.events.push(AudioEvent::SoundStarted { category, name });
        } else {
            tracing::info!("Playing {}: {} after {:?}", category, entry.name(), delay);
            entry.device.play_delayed(delay)?;
            self.delayed.push(DelayedStart::new(key, delay, entry.generation));
        }
        Ok(())
    }

    fn register_active(&mut self, key: SoundKey) {
        if !key.category.uses_active_list() {
            return;
        }
        match key.category {
            SoundCategory::Voice => self.active_voices.push(key.index),
            _ => self.active_sfx.push(key.index),
        }
    }

    /// Resolve, reporting misses as a warning and a `LookupFailed` event
    fn lookup(&mut self, category: SoundCategory, selector: &SoundSelector) -> Result<SoundKey, AudioError> {
        self.resolve(category, selector).map_err(|e| {
            tracing::warn!("Didn't find {} sound {}: {}", category, selector, e);
            self.events.push(AudioEvent::LookupFailed {
                category,
                selector: selector.to_string(),
            });
            e
        })
    }

    /// Advance fades and delayed starts by one scheduler tick
    pub fn tick(&mut self, interval: Duration) {
        for entries in &mut self.collections {
            for entry in entries.iter_mut() {
                let live = entry.device.volume();
                let target = entry.effective_volume();
                let Some(step) = entry.fade.step(live, target) else {
                    continue;
                };
                match step {
                    FadeStep::Ramp(volume) => entry.device.set_volume(volume),
                    FadeStep::InFinished(last) => {
                        if let Some(volume) = last {
                            entry.device.set_volume(volume);
                        }
                        self.events.push(AudioEvent::FadeFinished {
                            name: entry.name().to_string(),
                            phase: FadePhase::FadingIn,
                        });
                    }
                    FadeStep::OutFinished => {
                        entry.device.set_volume(0.0);
                        entry.device.stop();
                        let volume = entry.effective_volume();
                        entry.device.set_volume(volume);
                        tracing::debug!("Faded out {}", entry.name());
                        self.events.push(AudioEvent::FadeFinished {
                            name: entry.name().to_string(),
                            phase: FadePhase::FadingOut,
                        });
                    }
                }
            }
        }

        let mut started = Vec::new();
        self.delayed.retain_mut(|pending| {
            if pending.advance(interval) {
                started.push(*pending);
                false
            } else {
                true
            }
        });

        for pending in started {
            let key = pending.key();
            let entry = &self.collections[slot(key.category)][key.index];
            if !pending.is_current(entry.generation) {
                continue;
            }
            let name = entry.name().to_string();
            self.register_active(key);
            self.events.push(AudioEvent::SoundStarted {
                category: key.category,
                name,
            });
        }
    }

    /// Stop current music, every active voice/SFX and every pending delayed start
    pub fn stop_all(&mut self) {
        if let Some(i) = self.current_music {
            self.collections[0][i].halt();
        }
        if let Some(i) = self.previous_music {
            if self.collections[0][i].is_playing() {
                self.collections[0][i].halt();
            }
        }
        for i in self.active_voices.drain(..) {
            self.collections[2][i].halt();
        }
        for i in self.active_sfx.drain(..) {
            self.collections[1][i].halt();
        }
        for pending in self.delayed.drain(..) {
            let key = pending.key();
            self.collections[slot(key.category)][key.index].halt();
        }
        tracing::debug!("Stopped all sounds");
    }

    /// Toggle pause on current music and every active voice/SFX
    ///
    /// Each entry is toggled once even when it is listed several times.
    pub fn pause_resume_all(&mut self) {
        let mut keys: Vec<SoundKey> = Vec::new();
        if let Some(index) = self.current_music {
            keys.push(SoundKey {
                category: SoundCategory::Music,
                index,
            });
        }
        keys.extend(self.active_voices.iter().map(|&index| SoundKey {
            category: SoundCategory::Voice,
            index,
        }));
        keys.extend(self.active_sfx.iter().map(|&index| SoundKey {
            category: SoundCategory::Sfx,
            index,
        }));

        let mut seen = HashSet::new();
        for key in keys {
            if !seen.insert(key) {
                continue;
            }
            let device = &mut self.collections[slot(key.category)][key.index].device;
            if device.is_playing() {
                device.pause();
            } else {
                device.unpause();
            }
        }
    }

    pub fn current_music(&self) -> Option<&SoundEntry> {
        self.current_music.map(|i| &self.collections[0][i])
    }

    pub fn previous_music(&self) -> Option<&SoundEntry> {
        self.previous_music.map(|i| &self.collections[0][i])
    }

    /// Entries in the SFX or voice active list, duplicates included
    pub fn active(&self, category: SoundCategory) -> Vec<&SoundEntry> {
        let (indices, entries) = match category {
            SoundCategory::Music => return self.current_music().into_iter().collect(),
            SoundCategory::Sfx => (&self.active_sfx, &self.collections[1]),
            SoundCategory::Voice => (&self.active_voices, &self.collections[2]),
        };
        indices.iter().map(|&i| &entries[i]).collect()
    }

    pub fn pending_delayed_starts(&self) -> usize {
        self.delayed.len()
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<AudioEvent> {
        std::mem::take(&mut self.events)
    }
}

fn build_collection(
    backend: &mut dyn OutputBackend,
    category: SoundCategory,
    definitions: &[SoundDefinition],
    mixer: &VolumeMixer,
) -> Result<Vec<SoundEntry>, AudioError> {
    definitions
        .iter()
        .map(|definition| {
            let label = format!("{}/{}", category.label_prefix(), definition.name);
            let device = backend.open(&label, &definition.clip)?;
            Ok(SoundEntry::new(definition, category, device, mixer))
        })
        .collect()
}
