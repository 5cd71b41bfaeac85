/// Sound categories
///
/// Partitions the catalog; each category carries its own global volume multiplier.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sound catalog categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    /// Background music (one current track, cross-faded on transitions)
    Music,

    /// One-shot sound effects
    Sfx,

    /// Voice lines / dialogue
    Voice,
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundCategory::Music => write!(f, "Music"),
            SoundCategory::Sfx => write!(f, "SFX"),
            SoundCategory::Voice => write!(f, "Voice"),
        }
    }
}

impl SoundCategory {
    /// All categories, in cascade order
    pub const fn all() -> [SoundCategory; 3] {
        [SoundCategory::Music, SoundCategory::Sfx, SoundCategory::Voice]
    }

    /// Prefix used for device labels (`"music/Theme"`)
    pub fn label_prefix(&self) -> &'static str {
        match self {
            SoundCategory::Music => "music",
            SoundCategory::Sfx => "sfx",
            SoundCategory::Voice => "voice",
        }
    }

    /// Whether started sounds are tracked in an active list
    ///
    /// Music uses current/previous slots instead.
    pub fn uses_active_list(&self) -> bool {
        !matches!(self, SoundCategory::Music)
    }
}
