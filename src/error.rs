use thiserror::Error;

use crate::audio_system::SoundCategory;

/// Playback errors using thiserror for structured error handling.
///
/// Lookup failures (`NotFound`, `OutOfRange`) and `InvalidVolume` are local:
/// the operation that produced them performed no mutation and everything
/// else keeps playing.

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No {category} sound named '{name}'")]
    NotFound { category: SoundCategory, name: String },

    #[error("{category} index {index} out of range (0..{len})")]
    OutOfRange {
        category: SoundCategory,
        index: isize,
        len: usize,
    },

    #[error("Invalid volume: {0} (must be 0.0-1.0)")]
    InvalidVolume(f32),

    #[error("Jukebox has no active track")]
    NoActiveTrack,

    #[error("Failed to load audio file: {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to decode audio format")]
    DecodeFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Failed to initialize audio output stream")]
    StreamInitFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Audio playback failed")]
    PlaybackFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AudioError {
    /// Lookup misses are expected at runtime and only logged by callers.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, AudioError::NotFound { .. } | AudioError::OutOfRange { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
