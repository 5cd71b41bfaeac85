/// Headless output backend
///
/// Records every device call instead of producing sound. Used on hosts
/// without audio hardware and throughout the test suite.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::device::{OutputBackend, OutputDevice, Position};
use super::entry::AudioClip;
use crate::error::AudioError;

/// Snapshot of everything a headless device has been told
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceProbe {
    pub volume: f32,
    pub pitch: f32,
    pub pan: f32,
    pub spatial_blend: f32,
    pub priority: u16,
    pub looping: bool,
    pub clip: Option<PathBuf>,
    pub position: Option<Position>,
    pub playing: bool,
    pub paused: bool,
    pub last_delay: Option<Duration>,
    pub play_count: usize,
    pub stop_count: usize,
    /// Every value passed to `set_volume`, in order
    pub volume_writes: Vec<f32>,
}

type SharedProbe = Arc<Mutex<DeviceProbe>>;

/// Backend handing out recording devices
///
/// Clones share the same device table, so a test can keep one clone and
/// inspect devices owned by a bank.
#[derive(Clone, Default)]
pub struct HeadlessBackend {
    devices: Arc<Mutex<HashMap<String, SharedProbe>>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the device opened under `label`
    pub fn probe(&self, label: &str) -> Option<DeviceProbe> {
        self.devices
            .lock()
            .get(label)
            .map(|probe| probe.lock().clone())
    }

    /// Simulate the clip reaching its end
    pub fn finish(&self, label: &str) {
        if let Some(probe) = self.devices.lock().get(label) {
            let mut probe = probe.lock();
            probe.playing = false;
            probe.paused = false;
        }
    }

    /// Number of devices opened so far
    pub fn device_count(&self) -> usize {
        self.devices.lock().len()
    }
}

impl OutputBackend for HeadlessBackend {
    fn open(&mut self, label: &str, clip: &AudioClip) -> Result<Box<dyn OutputDevice>, AudioError> {
        let probe = Arc::new(Mutex::new(DeviceProbe {
            volume: 1.0,
            pitch: 1.0,
            clip: Some(clip.path.clone()),
            ..DeviceProbe::default()
        }));
        self.devices.lock().insert(label.to_string(), Arc::clone(&probe));
        tracing::debug!("Opened headless device {}", label);
        Ok(Box::new(HeadlessDevice { probe }))
    }
}

/// Device that only records state
pub struct HeadlessDevice {
    probe: SharedProbe,
}

impl OutputDevice for HeadlessDevice {
    fn play(&mut self) -> Result<(), AudioError> {
        let mut probe = self.probe.lock();
        probe.playing = true;
        probe.paused = false;
        probe.last_delay = None;
        probe.play_count += 1;
        Ok(())
    }

    fn play_delayed(&mut self, delay: Duration) -> Result<(), AudioError> {
        let mut probe = self.probe.lock();
        probe.playing = true;
        probe.paused = false;
        probe.last_delay = Some(delay);
        probe.play_count += 1;
        Ok(())
    }

    fn stop(&mut self) {
        let mut probe = self.probe.lock();
        probe.playing = false;
        probe.paused = false;
        probe.stop_count += 1;
    }

    fn pause(&mut self) {
        let mut probe = self.probe.lock();
        if probe.playing {
            probe.playing = false;
            probe.paused = true;
        }
    }

    fn unpause(&mut self) {
        let mut probe = self.probe.lock();
        if probe.paused {
            probe.playing = true;
            probe.paused = false;
        }
    }

    fn is_playing(&self) -> bool {
        self.probe.lock().playing
    }

    fn volume(&self) -> f32 {
        self.probe.lock().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut probe = self.probe.lock();
        probe.volume = volume;
        probe.volume_writes.push(volume);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.probe.lock().pitch = pitch;
    }

    fn set_pan(&mut self, pan: f32) {
        self.probe.lock().pan = pan;
    }

    fn set_spatial_blend(&mut self, blend: f32) {
        self.probe.lock().spatial_blend = blend;
    }

    fn set_priority(&mut self, priority: u16) {
        self.probe.lock().priority = priority;
    }

    fn set_looping(&mut self, looping: bool) {
        self.probe.lock().looping = looping;
    }

    fn set_clip(&mut self, clip: &AudioClip) {
        self.probe.lock().clip = Some(clip.path.clone());
    }

    fn set_position(&mut self, position: Position) {
        self.probe.lock().position = Some(position);
    }
}
