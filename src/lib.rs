//! Layered audio playback manager.
//!
//! Music, SFX and voice catalogs under a multiplicative volume cascade, with
//! delayed starts, cross-fades and an autonomous playlist jukebox driven by a
//! fixed-interval scheduler.

pub mod audio_system;
pub mod config;
pub mod error;
pub mod messaging;
pub mod state;

pub use audio_system::{AudioManager, SoundBank, SoundCategory};
pub use config::AudioConfig;
pub use error::{AppResult, AudioError, ConfigError};
