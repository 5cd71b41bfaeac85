/// Output device capability
///
/// The bank never touches samples. Every entry owns one device and drives it
/// through this trait; `RodioDevice` plays through the sound card and
/// `HeadlessDevice` only records what it was told.
use std::time::Duration;

use super::entry::AudioClip;
use crate::error::AudioError;

/// World-space position forwarded opaquely to the device
pub type Position = [f32; 3];

/// Per-sound playback handle
pub trait OutputDevice {
    /// Start the clip from the beginning
    fn play(&mut self) -> Result<(), AudioError>;

    /// Start the clip after `delay`; returns immediately
    fn play_delayed(&mut self, delay: Duration) -> Result<(), AudioError>;

    fn stop(&mut self);

    fn pause(&mut self);

    fn unpause(&mut self);

    fn is_playing(&self) -> bool;

    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    fn set_pitch(&mut self, pitch: f32);

    fn set_pan(&mut self, pan: f32);

    fn set_spatial_blend(&mut self, blend: f32);

    fn set_priority(&mut self, priority: u16);

    fn set_looping(&mut self, looping: bool);

    fn set_clip(&mut self, clip: &AudioClip);

    fn set_position(&mut self, position: Position);
}

/// Factory for per-entry devices
pub trait OutputBackend {
    /// Open a device for one entry. `label` is unique per bank/playlist slot.
    fn open(&mut self, label: &str, clip: &AudioClip) -> Result<Box<dyn OutputDevice>, AudioError>;
}
