/// Audio driver
///
/// Owns the `AudioManager` on a dedicated thread. Commands arrive over a
/// channel; between commands the thread advances the scheduler by the real
/// elapsed time and publishes drained events on the bus. Only this thread
/// touches playback state.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use super::bus::EventBus;
use super::commands::AudioCommand;
use super::events::AudioEvent;
use crate::audio_system::AudioManager;
use crate::error::AudioError;

pub struct AudioDriver {
    command_tx: Sender<AudioCommand>,
    handle: Option<JoinHandle<()>>,
}

impl AudioDriver {
    /// Start the driver thread
    ///
    /// `build` runs on the driver thread because output streams cannot move
    /// between threads. Returns once the manager is built, or with its error.
    pub fn spawn<F>(build: F, event_bus: EventBus) -> Result<Self, AudioError>
    where
        F: FnOnce() -> Result<AudioManager, AudioError> + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("audio-driver".to_string())
            .spawn(move || {
                let manager = match build() {
                    Ok(manager) => {
                        let _ = ready_tx.send(Ok(()));
                        manager
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                run(manager, command_rx, event_bus);
            })
            .map_err(|e| AudioError::PlaybackFailed(Box::new(e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                command_tx,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(e) => Err(AudioError::PlaybackFailed(Box::new(e))),
        }
    }

    /// Get a sender for submitting commands
    pub fn sender(&self) -> Sender<AudioCommand> {
        self.command_tx.clone()
    }

    /// Queue a command; false once the driver has stopped
    pub fn send(&self, command: AudioCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    /// Stop the thread and wait for it
    pub fn shutdown(mut self) {
        self.stop_thread();
    }

    fn stop_thread(&mut self) {
        let _ = self.command_tx.send(AudioCommand::Quit);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Audio driver thread panicked");
            }
        }
    }
}

impl Drop for AudioDriver {
    fn drop(&mut self) {
        self.stop_thread();
    }
}

fn run(mut manager: AudioManager, commands: Receiver<AudioCommand>, event_bus: EventBus) {
    tracing::info!("Audio driver thread started");

    let interval = manager.tick_interval();
    let mut last_update = Instant::now();

    loop {
        match commands.recv_timeout(interval) {
            Ok(AudioCommand::Quit) => {
                tracing::info!("Quit command received, stopping audio driver");
                break;
            }
            Ok(command) => {
                if let Err(e) = manager.execute(command) {
                    if e.is_lookup_miss() {
                        tracing::debug!("Command skipped: {}", e);
                    } else {
                        tracing::warn!("Command failed: {}", e);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        manager.update(now - last_update);
        last_update = now;

        event_bus.publish_all(manager.drain_events());
    }

    manager.stop_all();
    event_bus.publish_all(manager.drain_events());
    event_bus.publish(AudioEvent::Shutdown);
    tracing::info!("Audio driver thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::audio_system::headless::HeadlessBackend;
    use crate::audio_system::{AudioClip, SoundCategory, SoundDefinition};
    use crate::config::AudioConfig;

    fn config() -> AudioConfig {
        let mut config = AudioConfig::default();
        config.catalog.sfx = vec![SoundDefinition::new(
            "Hit",
            AudioClip::new("hit.wav", Duration::from_secs(1)),
        )];
        config
    }

    #[test]
    fn test_driver_executes_commands_and_publishes_events() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();
        let backend = HeadlessBackend::new();
        let probe = backend.clone();

        let driver = AudioDriver::spawn(move || AudioManager::new(&config(), Box::new(backend)), bus).unwrap();
        assert!(driver.send("sfx Hit".parse().unwrap()));

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            event,
            AudioEvent::SoundStarted {
                category: SoundCategory::Sfx,
                name: "Hit".to_string(),
            }
        );
        assert!(probe.probe("sfx/Hit").unwrap().playing);

        driver.shutdown();
        let remaining: Vec<AudioEvent> = rx.try_iter().collect();
        assert_eq!(remaining.last(), Some(&AudioEvent::Shutdown));
        assert!(!probe.probe("sfx/Hit").unwrap().playing);
    }

    #[test]
    fn test_build_failure_is_returned() {
        let result = AudioDriver::spawn(|| Err(AudioError::NoActiveTrack), EventBus::new());
        assert!(matches!(result, Err(AudioError::NoActiveTrack)));
    }
}
