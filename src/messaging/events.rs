/// Event types for the audio system
///
/// Events represent things that have happened (past tense).
/// They are queued by the bank and jukebox, then broadcast to all subscribers.
use crate::audio_system::{FadePhase, SoundCategory};
use crate::state::JukeboxState;

/// Audio events
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// A sound became audible (immediately or after its delay)
    SoundStarted { category: SoundCategory, name: String },

    /// Background music was switched
    MusicChanged {
        previous: Option<String>,
        current: String,
    },

    /// A fade-in reached its target or a fade-out stopped its entry
    FadeFinished { name: String, phase: FadePhase },

    /// The jukebox moved to another playlist track
    TrackChanged { index: usize, name: String },

    /// Jukebox lifecycle state changed
    JukeboxStateChanged {
        old_state: JukeboxState,
        new_state: JukeboxState,
    },

    /// A global multiplier changed; `None` is the master volume
    VolumeChanged {
        category: Option<SoundCategory>,
        volume: f32,
    },

    /// A name or index did not resolve to a sound
    LookupFailed {
        category: SoundCategory,
        selector: String,
    },

    /// Audio driver is shutting down
    Shutdown,
}

impl AudioEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            AudioEvent::SoundStarted { category, name } => {
                format!("{} started: {}", category, name)
            }
            AudioEvent::MusicChanged { previous, current } => match previous {
                Some(previous) => format!("Music changed: {} -> {}", previous, current),
                None => format!("Music changed: {}", current),
            },
            AudioEvent::FadeFinished { name, phase } => match phase {
                FadePhase::FadingOut => format!("Faded out: {}", name),
                _ => format!("Faded in: {}", name),
            },
            AudioEvent::TrackChanged { index, name } => {
                format!("Jukebox track {}: {}", index, name)
            }
            AudioEvent::JukeboxStateChanged { new_state, .. } => {
                format!("Jukebox state: {}", new_state.description())
            }
            AudioEvent::VolumeChanged { category, volume } => match category {
                Some(category) => format!("{} volume: {:.2}", category, volume),
                None => format!("Master volume: {:.2}", volume),
            },
            AudioEvent::LookupFailed { category, selector } => {
                format!("No {} sound {}", category, selector)
            }
            AudioEvent::Shutdown => "Shutting down".to_string(),
        }
    }
}
