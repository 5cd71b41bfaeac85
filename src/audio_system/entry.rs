/// Sound entries
///
/// Static configuration of one sound plus its live output device.
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::device::OutputDevice;
use super::effects::{Fade, FadePhase, VolumeMixer};
use super::source::SoundCategory;
use crate::error::AudioError;

pub const PITCH_RANGE: (f32, f32) = (0.3, 3.0);
pub const PAN_RANGE: (f32, f32) = (-1.0, 1.0);
pub const MAX_PRIORITY: u16 = 256;

/// Opaque handle to an audio asset with a known duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    pub path: PathBuf,

    #[serde(rename = "duration_secs", with = "duration_secs")]
    pub duration: Duration,
}

impl AudioClip {
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

mod duration_secs {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(duration.as_secs_f32())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f32::deserialize(deserializer)?;
        Duration::try_from_secs_f32(secs).map_err(D::Error::custom)
    }
}

/// Author-set playback settings of a sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    /// Base (pre-cascade) volume, 0.0-1.0
    pub volume: f32,

    /// Pitch multiplier, 0.3-3.0
    pub pitch: f32,

    /// Stereo pan, -1.0 (left) to 1.0 (right)
    pub pan: f32,

    /// 0.0 = pure 2D, 1.0 = fully positioned
    pub spatial_blend: f32,

    /// 0 (highest) to 256 (lowest)
    pub priority: u16,

    pub looping: bool,

    /// Start delay in seconds
    pub delay_secs: f32,

    pub randomize_volume: bool,
    pub randomize_pitch: bool,
    pub randomize_delay: bool,

    /// Volume units added per scheduler tick while fading in
    pub fade_in_rate: f32,

    /// Volume units removed per scheduler tick while fading out
    pub fade_out_rate: f32,

    /// Cross-fade on music transitions
    pub fade_enabled: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            pan: 0.0,
            spatial_blend: 0.0,
            priority: 128,
            looping: false,
            delay_secs: 0.0,
            randomize_volume: false,
            randomize_pitch: false,
            randomize_delay: false,
            fade_in_rate: 0.1,
            fade_out_rate: 0.1,
            fade_enabled: false,
        }
    }
}

impl SoundSettings {
    /// Clamp every field into its documented range
    pub fn sanitized(mut self) -> Self {
        self.volume = self.volume.clamp(0.0, 1.0);
        self.pitch = self.pitch.clamp(PITCH_RANGE.0, PITCH_RANGE.1);
        self.pan = self.pan.clamp(PAN_RANGE.0, PAN_RANGE.1);
        self.spatial_blend = self.spatial_blend.clamp(0.0, 1.0);
        self.priority = self.priority.min(MAX_PRIORITY);
        self.delay_secs = self.delay_secs.max(0.0);
        self.fade_in_rate = self.fade_in_rate.max(0.0);
        self.fade_out_rate = self.fade_out_rate.max(0.0);
        self
    }

    /// Configured start delay
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.delay_secs).unwrap_or_default()
    }
}

/// Configuration form of a sound, as stored in the catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDefinition {
    pub name: String,
    pub clip: AudioClip,

    #[serde(flatten)]
    pub settings: SoundSettings,
}

impl SoundDefinition {
    pub fn new(name: impl Into<String>, clip: AudioClip) -> Self {
        Self {
            name: name.into(),
            clip,
            settings: SoundSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SoundSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Stable handle to an entry slot inside a bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundKey {
    pub category: SoundCategory,
    pub index: usize,
}

/// Full-field update (`updateSoundConfig` with every parameter)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundParams {
    pub volume: f32,
    pub pitch: f32,
    pub looping: bool,
    pub pan: f32,
    pub spatial_blend: f32,
    pub priority: u16,
    pub delay_secs: f32,
}

/// Runtime overwrite of an entry's static configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundConfigUpdate {
    All(SoundParams),
    Volume(f32),
    VolumeAndPitch { volume: f32, pitch: f32 },
}

impl SoundConfigUpdate {
    fn volume(&self) -> f32 {
        match self {
            SoundConfigUpdate::All(params) => params.volume,
            SoundConfigUpdate::Volume(volume) => *volume,
            SoundConfigUpdate::VolumeAndPitch { volume, .. } => *volume,
        }
    }
}

/// One configured sound and its live playback handle
pub struct SoundEntry {
    name: String,
    category: SoundCategory,
    clip: AudioClip,
    settings: SoundSettings,
    effective_volume: f32,
    pub(crate) device: Box<dyn OutputDevice>,
    pub(crate) fade: Fade,
    /// Bumped whenever the entry is stopped; stale delayed starts compare against it
    pub(crate) generation: u64,
}

impl SoundEntry {
    /// Build an entry and push its whole configuration to the device
    pub(crate) fn new(
        definition: &SoundDefinition,
        category: SoundCategory,
        device: Box<dyn OutputDevice>,
        mixer: &VolumeMixer,
    ) -> Self {
        let mut entry = Self {
            name: definition.name.clone(),
            category,
            clip: definition.clip.clone(),
            settings: definition.settings.clone().sanitized(),
            effective_volume: 0.0,
            device,
            fade: Fade::default(),
            generation: 0,
        };
        entry.apply_settings(mixer);
        entry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> SoundCategory {
        self.category
    }

    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn settings(&self) -> &SoundSettings {
        &self.settings
    }

    /// Author-set volume before the cascade
    pub fn base_volume(&self) -> f32 {
        self.settings.volume
    }

    /// Cascade result: base × category × master
    pub fn effective_volume(&self) -> f32 {
        self.effective_volume
    }

    /// Volume the device is currently using (differs from the cascade during fades)
    pub fn live_volume(&self) -> f32 {
        self.device.volume()
    }

    pub fn is_playing(&self) -> bool {
        self.device.is_playing()
    }

    pub fn fade_phase(&self) -> FadePhase {
        self.fade.phase()
    }

    /// Push every setting to the device and recompute the cascade
    pub(crate) fn apply_settings(&mut self, mixer: &VolumeMixer) {
        self.device.set_clip(&self.clip);
        self.device.set_pitch(self.settings.pitch);
        self.device.set_looping(self.settings.looping);
        self.device.set_pan(self.settings.pan);
        self.device.set_spatial_blend(self.settings.spatial_blend);
        self.device.set_priority(self.settings.priority);
        self.recascade(mixer);
    }

    /// Recompute the effective volume and write it to the device
    pub(crate) fn recascade(&mut self, mixer: &VolumeMixer) {
        self.effective_volume = mixer.cascade(self.settings.volume, self.category);
        self.device.set_volume(self.effective_volume);
    }

    /// Overwrite static fields; zero mutation when the volume is invalid
    pub(crate) fn apply_update(
        &mut self,
        update: SoundConfigUpdate,
        mixer: &VolumeMixer,
    ) -> Result<(), AudioError> {
        let volume = update.volume();
        if !(0.0..=1.0).contains(&volume) {
            return Err(AudioError::InvalidVolume(volume));
        }

        self.settings.volume = volume;
        match update {
            SoundConfigUpdate::All(params) => {
                self.settings.pitch = params.pitch.clamp(PITCH_RANGE.0, PITCH_RANGE.1);
                self.settings.looping = params.looping;
                self.settings.pan = params.pan.clamp(PAN_RANGE.0, PAN_RANGE.1);
                self.settings.spatial_blend = params.spatial_blend.clamp(0.0, 1.0);
                self.settings.priority = params.priority.min(MAX_PRIORITY);
                self.settings.delay_secs = params.delay_secs.max(0.0);
                self.device.set_pitch(self.settings.pitch);
                self.device.set_looping(self.settings.looping);
                self.device.set_pan(self.settings.pan);
                self.device.set_spatial_blend(self.settings.spatial_blend);
                self.device.set_priority(self.settings.priority);
            }
            SoundConfigUpdate::Volume(_) => {}
            SoundConfigUpdate::VolumeAndPitch { pitch, .. } => {
                self.settings.pitch = pitch.clamp(PITCH_RANGE.0, PITCH_RANGE.1);
                self.device.set_pitch(self.settings.pitch);
            }
        }

        self.recascade(mixer);
        Ok(())
    }

    /// Stop output, drop any fade and invalidate pending delayed starts
    pub(crate) fn halt(&mut self) {
        self.device.stop();
        self.generation += 1;
        if self.fade.is_active() {
            self.fade.cancel();
            self.device.set_volume(self.effective_volume);
        }
    }
}

impl std::fmt::Debug for SoundEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("base_volume", &self.settings.volume)
            .field("effective_volume", &self.effective_volume)
            .field("fade", &self.fade.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::headless::HeadlessBackend;
    use crate::audio_system::OutputBackend;

    fn entry(volume: f32, mixer: &VolumeMixer) -> (SoundEntry, HeadlessBackend) {
        let mut backend = HeadlessBackend::new();
        let clip = AudioClip::new("hit.wav", Duration::from_secs(1));
        let definition = SoundDefinition::new("Hit", clip.clone()).with_settings(SoundSettings {
            volume,
            ..SoundSettings::default()
        });
        let device = backend.open("sfx/Hit", &clip).unwrap();
        (
            SoundEntry::new(&definition, SoundCategory::Sfx, device, mixer),
            backend,
        )
    }

    #[test]
    fn test_settings_sanitized() {
        let settings = SoundSettings {
            volume: 1.4,
            pitch: 5.0,
            pan: -3.0,
            priority: 900,
            delay_secs: -1.0,
            ..SoundSettings::default()
        }
        .sanitized();
        assert_eq!(settings.volume, 1.0);
        assert_eq!(settings.pitch, 3.0);
        assert_eq!(settings.pan, -1.0);
        assert_eq!(settings.priority, 256);
        assert_eq!(settings.delay_secs, 0.0);
    }

    #[test]
    fn test_new_entry_applies_cascade_to_device() {
        let mut mixer = VolumeMixer::default();
        mixer.set_master(0.5).unwrap();
        let (entry, backend) = entry(0.8, &mixer);

        assert!((entry.effective_volume() - 0.4).abs() < 1e-6);
        assert_eq!(entry.base_volume(), 0.8);
        let probe = backend.probe("sfx/Hit").unwrap();
        assert!((probe.volume - 0.4).abs() < 1e-6);
        assert_eq!(probe.clip.as_deref(), Some(std::path::Path::new("hit.wav")));
    }

    #[test]
    fn test_invalid_update_leaves_entry_untouched() {
        let mixer = VolumeMixer::default();
        let (mut entry, _backend) = entry(0.6, &mixer);

        let result = entry.apply_update(SoundConfigUpdate::VolumeAndPitch { volume: 1.2, pitch: 2.0 }, &mixer);
        assert!(matches!(result, Err(AudioError::InvalidVolume(_))));
        assert_eq!(entry.base_volume(), 0.6);
        assert_eq!(entry.settings().pitch, 1.0);
    }

    #[test]
    fn test_volume_and_pitch_update() {
        let mixer = VolumeMixer::default();
        let (mut entry, backend) = entry(0.6, &mixer);

        entry
            .apply_update(SoundConfigUpdate::VolumeAndPitch { volume: 0.3, pitch: 1.5 }, &mixer)
            .unwrap();
        assert_eq!(entry.base_volume(), 0.3);
        assert_eq!(entry.settings().pitch, 1.5);
        let probe = backend.probe("sfx/Hit").unwrap();
        assert_eq!(probe.pitch, 1.5);
        assert!((probe.volume - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_definition_json_flattens_settings() {
        let json = r#"{"name":"Theme","clip":{"path":"theme.ogg","duration_secs":30.0},"volume":0.5,"fade_enabled":true}"#;
        let definition: SoundDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.clip.duration, Duration::from_secs(30));
        assert_eq!(definition.settings.volume, 0.5);
        assert!(definition.settings.fade_enabled);
        assert_eq!(definition.settings.pitch, 1.0);
    }
}
