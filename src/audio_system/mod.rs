/// Audio system module
///
/// Layered playback manager supporting:
/// - Music, SFX and voice catalogs with a multiplicative volume cascade
/// - Delayed starts, trigger-time randomisation and music cross-fades
/// - An autonomous playlist jukebox
///
/// ## Architecture
///
/// ```text
/// AudioManager
///   ├── SoundBank
///   │     ├── music[]  ── current / previous (cross-fade)
///   │     ├── sfx[]    ── active list
///   │     ├── voice[]  ── active list
///   │     └── VolumeMixer (category × master)
///   ├── Jukebox (playlist[], cursor, timer)
///   └── Scheduler (delta → fixed ticks)
///
/// Each SoundEntry owns:
///   └── Box<dyn OutputDevice>  (RodioDevice or HeadlessDevice)
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use layered_audio::audio_system::{AudioManager, RodioBackend};
///
/// let backend = RodioBackend::try_default()?;
/// let mut manager = AudioManager::new(&config, Box::new(backend))?;
///
/// manager.play_music("Theme", None)?;
/// manager.play_sfx(0, Some([1.0, 0.0, 2.0]))?;
/// manager.set_master_volume(0.8)?;
///
/// // Once per frame
/// manager.update(frame_delta);
/// ```

pub mod bank;
pub mod device;
pub mod effects;
pub mod entry;
pub mod headless;
pub mod jukebox;
pub mod manager;
pub mod player;
pub mod scheduler;
pub mod source;

// Re-export commonly used types
pub use bank::{SoundBank, SoundSelector};
pub use device::{OutputBackend, OutputDevice, Position};
pub use effects::{FadePhase, RandomRanges, VolumeMixer};
pub use entry::{AudioClip, SoundConfigUpdate, SoundDefinition, SoundEntry, SoundKey, SoundParams, SoundSettings};
pub use headless::{DeviceProbe, HeadlessBackend};
pub use jukebox::{Jukebox, PlayMode};
pub use manager::AudioManager;
pub use player::RodioBackend;
pub use scheduler::Scheduler;
pub use source::SoundCategory;
