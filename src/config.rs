use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio_system::{PlayMode, RandomRanges, SoundCategory, SoundDefinition, VolumeMixer};
use crate::error::ConfigError;

/// The three sound catalogs, fixed at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundCatalog {
    pub music: Vec<SoundDefinition>,
    pub sfx: Vec<SoundDefinition>,
    pub voice: Vec<SoundDefinition>,
}

impl SoundCatalog {
    pub fn definitions(&self, category: SoundCategory) -> &[SoundDefinition] {
        match category {
            SoundCategory::Music => &self.music,
            SoundCategory::Sfx => &self.sfx,
            SoundCategory::Voice => &self.voice,
        }
    }

    fn definitions_mut(&mut self) -> impl Iterator<Item = &mut SoundDefinition> {
        self.music
            .iter_mut()
            .chain(self.sfx.iter_mut())
            .chain(self.voice.iter_mut())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JukeboxConfig {
    #[serde(default)]
    pub play_mode: PlayMode,

    /// Start the playlist as soon as the manager is built
    #[serde(default = "default_true")]
    pub autoplay: bool,

    pub playlist: Vec<SoundDefinition>,
}

fn default_true() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    100
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Category and master multipliers (0.0-1.0)
    #[serde(default)]
    pub volumes: VolumeMixer,

    /// Ranges for randomised one-shot volume and pitch
    #[serde(default)]
    pub random_ranges: RandomRanges,

    /// Scheduler step for fades, delays and the jukebox timer
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(flatten)]
    pub catalog: SoundCatalog,

    /// Optional autonomous playlist
    #[serde(default)]
    pub jukebox: Option<JukeboxConfig>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volumes: VolumeMixer::default(),
            random_ranges: RandomRanges::default(),
            tick_interval_ms: default_tick_interval_ms(),
            catalog: SoundCatalog::default(),
            jukebox: None,
        }
    }
}

impl AudioConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        let config: AudioConfig = serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        config.validate()?;

        tracing::info!("Loaded audio config from: {}", path.display());
        Ok(config)
    }

    /// Load from the default location, creating a default file if missing
    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = AudioConfig::default();
            config.save(&config_path)?;
            tracing::info!("Created default audio config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let save_failed = |e: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: e,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::LoadFailed {
            path: "<current exe>".to_string(),
            source: Box::new(e),
        })?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| ConfigError::Invalid("Could not determine executable directory".to_string()))?;

        Ok(exe_dir.join("config").join("audio.json"))
    }

    /// Make relative clip paths relative to `base` (usually the config file's directory)
    pub fn resolve_clip_paths(&mut self, base: &Path) {
        let playlist = self.jukebox.iter_mut().flat_map(|j| j.playlist.iter_mut());
        for definition in self.catalog.definitions_mut().chain(playlist) {
            if definition.clip.path.is_relative() {
                definition.clip.path = base.join(&definition.clip.path);
            }
        }
    }

    /// Check volumes, ranges and name uniqueness
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.volumes
            .validate_all()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".to_string()));
        }

        let [min, max] = self.random_ranges.volume;
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(ConfigError::Invalid(format!("Invalid random volume range [{}, {}]", min, max)));
        }
        let [min, max] = self.random_ranges.pitch;
        if min <= 0.0 || min > max {
            return Err(ConfigError::Invalid(format!("Invalid random pitch range [{}, {}]", min, max)));
        }

        for category in SoundCategory::all() {
            check_unique_names(&category.to_string(), self.catalog.definitions(category))?;
        }

        if let Some(jukebox) = &self.jukebox {
            if jukebox.playlist.is_empty() {
                return Err(ConfigError::Invalid("Jukebox playlist is empty".to_string()));
            }
            check_unique_names("playlist", &jukebox.playlist)?;
        }

        Ok(())
    }
}

fn check_unique_names(label: &str, definitions: &[SoundDefinition]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for definition in definitions {
        if !seen.insert(definition.name.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Duplicate {} sound name '{}'",
                label, definition.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::AudioClip;

    fn definition(name: &str) -> SoundDefinition {
        SoundDefinition::new(name, AudioClip::new(format!("{}.ogg", name), Duration::from_secs(5)))
    }

    #[test]
    fn test_default_config() {
        let config = AudioConfig::default();
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.volumes.master(), 1.0);
        assert!(config.jukebox.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{"music":[{"name":"Theme","clip":{"path":"theme.ogg","duration_secs":60.0}}]}"#;
        let config: AudioConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.catalog.music.len(), 1);
        assert!(config.catalog.sfx.is_empty());
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.random_ranges, RandomRanges::default());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut config = AudioConfig::default();
        config.catalog.sfx = vec![definition("Hit"), definition("Hit")];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // Same name in different categories is fine
        config.catalog.sfx = vec![definition("Hit")];
        config.catalog.voice = vec![definition("Hit")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_playlist_rejected() {
        let config = AudioConfig {
            jukebox: Some(JukeboxConfig {
                play_mode: PlayMode::Random,
                autoplay: true,
                playlist: Vec::new(),
            }),
            ..AudioConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_volume_in_file_rejected() {
        let json = r#"{"volumes":{"master":1.5}}"#;
        let config: AudioConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_clip_paths() {
        let mut config = AudioConfig::default();
        config.catalog.music = vec![definition("Theme")];
        config.jukebox = Some(JukeboxConfig {
            play_mode: PlayMode::Sequential,
            autoplay: false,
            playlist: vec![definition("A")],
        });

        config.resolve_clip_paths(Path::new("/srv/audio"));

        assert_eq!(config.catalog.music[0].clip.path, PathBuf::from("/srv/audio/Theme.ogg"));
        let jukebox = config.jukebox.as_ref().unwrap();
        assert_eq!(jukebox.playlist[0].clip.path, PathBuf::from("/srv/audio/A.ogg"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("layered_audio_config_test");
        let path = dir.join("audio.json");

        let mut config = AudioConfig::default();
        config.catalog.sfx = vec![definition("Hit")];
        config.volumes.set_master(0.75).unwrap();
        config.save(&path).unwrap();

        let loaded = AudioConfig::load(&path).unwrap();
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AudioConfig::load(Path::new("/definitely/missing/audio.json"));
        assert!(matches!(result, Err(ConfigError::LoadFailed { .. })));
    }
}
