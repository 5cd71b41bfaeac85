/// Volume cascade
///
/// Global category and master multipliers, and the pure cascade computation
/// `effective = base × category × master`.
use serde::{Deserialize, Serialize};

use crate::audio_system::source::SoundCategory;
use crate::error::AudioError;

/// Process-wide volume multipliers (each 0.0-1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeMixer {
    music: f32,
    sfx: f32,
    voice: f32,
    master: f32,
}

impl VolumeMixer {
    pub fn new(music: f32, sfx: f32, voice: f32, master: f32) -> Result<Self, AudioError> {
        let mut mixer = Self::default();
        mixer.set_category(SoundCategory::Music, music)?;
        mixer.set_category(SoundCategory::Sfx, sfx)?;
        mixer.set_category(SoundCategory::Voice, voice)?;
        mixer.set_master(master)?;
        Ok(mixer)
    }

    /// Reject anything outside 0.0-1.0 (NaN included)
    pub fn validate(volume: f32) -> Result<f32, AudioError> {
        if (0.0..=1.0).contains(&volume) {
            Ok(volume)
        } else {
            Err(AudioError::InvalidVolume(volume))
        }
    }

    pub fn category(&self, category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Music => self.music,
            SoundCategory::Sfx => self.sfx,
            SoundCategory::Voice => self.voice,
        }
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    /// Set a category multiplier; the prior value is kept on rejection
    pub fn set_category(&mut self, category: SoundCategory, volume: f32) -> Result<(), AudioError> {
        let volume = Self::validate(volume)?;
        match category {
            SoundCategory::Music => self.music = volume,
            SoundCategory::Sfx => self.sfx = volume,
            SoundCategory::Voice => self.voice = volume,
        }
        Ok(())
    }

    /// Set the master multiplier; the prior value is kept on rejection
    pub fn set_master(&mut self, volume: f32) -> Result<(), AudioError> {
        self.master = Self::validate(volume)?;
        Ok(())
    }

    /// Effective output volume for a base volume in `category`
    pub fn cascade(&self, base_volume: f32, category: SoundCategory) -> f32 {
        base_volume * self.category(category) * self.master
    }

    /// Check values that bypassed the setters (deserialized configs)
    pub fn validate_all(&self) -> Result<(), AudioError> {
        for volume in [self.music, self.sfx, self.voice, self.master] {
            Self::validate(volume)?;
        }
        Ok(())
    }
}

impl Default for VolumeMixer {
    fn default() -> Self {
        Self {
            music: 1.0,
            sfx: 1.0,
            voice: 1.0,
            master: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mixer_is_unity() {
        let mixer = VolumeMixer::default();
        for category in SoundCategory::all() {
            assert_eq!(mixer.category(category), 1.0);
        }
        assert_eq!(mixer.master(), 1.0);
    }

    #[test]
    fn test_cascade_multiplies_chain() {
        let mixer = VolumeMixer::new(0.5, 1.0, 1.0, 0.8).unwrap();
        assert!((mixer.cascade(0.5, SoundCategory::Music) - 0.2).abs() < 1e-6);
        assert!((mixer.cascade(0.5, SoundCategory::Sfx) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_out_of_range_and_keeps_prior_value() {
        let mut mixer = VolumeMixer::default();
        mixer.set_master(0.4).unwrap();

        assert!(mixer.set_master(-0.1).is_err());
        assert!(mixer.set_master(1.1).is_err());
        assert!(mixer.set_master(f32::NAN).is_err());
        assert_eq!(mixer.master(), 0.4);

        assert!(mixer.set_category(SoundCategory::Voice, 2.0).is_err());
        assert_eq!(mixer.category(SoundCategory::Voice), 1.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut mixer = VolumeMixer::default();
        assert!(mixer.set_master(0.0).is_ok());
        assert!(mixer.set_master(1.0).is_ok());
    }

    #[test]
    fn test_validate_all_catches_deserialized_values() {
        let mixer: VolumeMixer = serde_json::from_str(r#"{"music": 3.0}"#).unwrap();
        assert!(mixer.validate_all().is_err());
    }
}
