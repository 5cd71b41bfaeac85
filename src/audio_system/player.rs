/// Rodio output backend
///
/// Preloads each clip into memory and plays it through a `SpatialSink`, one
/// sink per entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Source, SpatialSink};

use super::device::{OutputBackend, OutputDevice, Position};
use super::entry::AudioClip;
use crate::error::AudioError;

const LEFT_EAR: Position = [-1.0, 0.0, 0.0];
const RIGHT_EAR: Position = [1.0, 0.0, 0.0];

/// Backend owning the output stream
///
/// Must outlive every device it opened; devices only hold a stream handle.
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    clips: HashMap<PathBuf, Arc<Vec<u8>>>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn try_default() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            clips: HashMap::new(),
        })
    }

    /// Read a clip into memory once and verify it decodes
    fn preload(&mut self, path: &Path) -> Result<Arc<Vec<u8>>, AudioError> {
        if let Some(data) = self.clips.get(path) {
            return Ok(Arc::clone(data));
        }

        let data = read_clip(path)?;
        self.clips.insert(path.to_path_buf(), Arc::clone(&data));
        Ok(data)
    }
}

fn read_clip(path: &Path) -> Result<Arc<Vec<u8>>, AudioError> {
    let bytes = std::fs::read(path).map_err(|e| AudioError::LoadFailed {
        path: path.display().to_string(),
        source: Box::new(e),
    })?;

    // Note: We must clone here as rodio's Decoder requires owned data with 'static lifetime
    Decoder::new(std::io::Cursor::new(bytes.clone()))
        .map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

    tracing::info!("Preloaded audio clip: {} ({} bytes)", path.display(), bytes.len());
    Ok(Arc::new(bytes))
}

impl OutputBackend for RodioBackend {
    fn open(&mut self, label: &str, clip: &AudioClip) -> Result<Box<dyn OutputDevice>, AudioError> {
        let audio_data = self.preload(&clip.path)?;
        let sink = SpatialSink::try_new(&self.stream_handle, [0.0, 0.0, 1.0], LEFT_EAR, RIGHT_EAR)
            .map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;

        tracing::debug!("Created rodio device for {}", label);

        Ok(Box::new(RodioDevice {
            label: label.to_string(),
            stream_handle: self.stream_handle.clone(),
            sink,
            audio_data,
            clip_path: clip.path.clone(),
            volume: 1.0,
            pitch: 1.0,
            pan: 0.0,
            spatial_blend: 0.0,
            looping: false,
            position: None,
        }))
    }
}

/// One sink with the entry's playback parameters
pub struct RodioDevice {
    label: String,
    stream_handle: OutputStreamHandle,
    sink: SpatialSink,
    audio_data: Arc<Vec<u8>>,
    clip_path: PathBuf,
    volume: f32,
    pitch: f32,
    pan: f32,
    spatial_blend: f32,
    looping: bool,
    position: Option<Position>,
}

impl RodioDevice {
    /// Emitter position blending the 2D pan point with the world position
    fn emitter(&self) -> Position {
        let pan_point = [self.pan, 0.0, 1.0];
        match self.position {
            Some(world) => {
                let t = self.spatial_blend;
                [
                    pan_point[0] + (world[0] - pan_point[0]) * t,
                    pan_point[1] + (world[1] - pan_point[1]) * t,
                    pan_point[2] + (world[2] - pan_point[2]) * t,
                ]
            }
            None => pan_point,
        }
    }

    fn build_source(&self, delay: Option<Duration>) -> Result<Box<dyn Source<Item = i16> + Send>, AudioError> {
        let cursor = std::io::Cursor::new((*self.audio_data).clone());
        let decoder = Decoder::new(cursor).map_err(|e| AudioError::DecodeFailed(Box::new(e)))?;

        // Each transformation returns a different type, so we use dynamic dispatch
        let mut source: Box<dyn Source<Item = i16> + Send> = if self.looping {
            Box::new(decoder.buffered().repeat_infinite())
        } else {
            Box::new(decoder)
        };

        if let Some(delay) = delay {
            source = Box::new(source.delay(delay));
        }

        Ok(source)
    }

    /// Replace the sink so nothing queued survives, then start `source`
    fn start(&mut self, source: Box<dyn Source<Item = i16> + Send>) -> Result<(), AudioError> {
        self.sink.stop();
        self.sink = SpatialSink::try_new(&self.stream_handle, self.emitter(), LEFT_EAR, RIGHT_EAR)
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;
        self.sink.set_volume(self.volume);
        self.sink.set_speed(self.pitch);
        self.sink.append(source);
        self.sink.play();
        Ok(())
    }
}

impl OutputDevice for RodioDevice {
    fn play(&mut self) -> Result<(), AudioError> {
        tracing::debug!("Playing {}", self.label);
        let source = self.build_source(None)?;
        self.start(source)
    }

    fn play_delayed(&mut self, delay: Duration) -> Result<(), AudioError> {
        tracing::debug!("Playing {} after {:?}", self.label, delay);
        let source = self.build_source(Some(delay))?;
        self.start(source)
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn unpause(&mut self) {
        self.sink.play();
    }

    fn is_playing(&self) -> bool {
        !self.sink.empty() && !self.sink.is_paused()
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.max(0.0);
        self.sink.set_volume(self.volume);
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        self.sink.set_speed(pitch);
    }

    fn set_pan(&mut self, pan: f32) {
        self.pan = pan;
        self.sink.set_emitter_position(self.emitter());
    }

    fn set_spatial_blend(&mut self, blend: f32) {
        self.spatial_blend = blend;
        self.sink.set_emitter_position(self.emitter());
    }

    fn set_priority(&mut self, priority: u16) {
        // rodio mixes every sink, nothing to steal voices from
        tracing::trace!("Ignoring priority {} for {}", priority, self.label);
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_clip(&mut self, clip: &AudioClip) {
        if clip.path == self.clip_path {
            return;
        }
        match read_clip(&clip.path) {
            Ok(data) => {
                self.audio_data = data;
                self.clip_path = clip.path.clone();
            }
            Err(e) => tracing::warn!("Keeping previous clip for {}: {}", self.label, e),
        }
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
        self.sink.set_emitter_position(self.emitter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Playback tests need audio hardware; only file handling is covered here

    #[test]
    fn test_missing_clip_fails_to_load() {
        let result = read_clip(Path::new("definitely-missing-clip.ogg"));
        assert!(matches!(result, Err(AudioError::LoadFailed { .. })));
    }

    #[test]
    fn test_garbage_clip_fails_to_decode() {
        let path = std::env::temp_dir().join("layered_audio_garbage_clip.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();

        let result = read_clip(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
    }
}
