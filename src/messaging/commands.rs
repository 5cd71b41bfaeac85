/// Command types for the audio system
///
/// Commands represent requests to perform actions (imperative).
/// They are applied by `AudioManager::execute`, usually on the driver thread.
use std::str::FromStr;

use thiserror::Error;

use crate::audio_system::{Position, SoundCategory, SoundConfigUpdate, SoundSelector};

/// Audio commands
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    PlayMusic {
        selector: SoundSelector,
        position: Option<Position>,
    },

    PlaySfx {
        selector: SoundSelector,
        position: Option<Position>,
    },

    PlayVoice {
        selector: SoundSelector,
        position: Option<Position>,
    },

    /// Set one category multiplier
    SetCategoryVolume { category: SoundCategory, volume: f32 },

    SetMasterVolume(f32),

    /// Set every multiplier at once
    UpdateGlobalVolumes {
        sfx: f32,
        music: f32,
        voice: f32,
        master: f32,
    },

    /// Overwrite the static configuration of one entry
    UpdateSoundConfig {
        category: SoundCategory,
        index: isize,
        update: SoundConfigUpdate,
    },

    StopAll,

    PauseResumeAll,

    JukeboxPlay,
    JukeboxPause,
    JukeboxStop,
    JukeboxSkipNext,
    JukeboxSkipRandom,

    /// Stop the driver
    Quit,
}

impl AudioCommand {
    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            AudioCommand::PlayMusic { selector, .. } => format!("Play music {}", selector),
            AudioCommand::PlaySfx { selector, .. } => format!("Play SFX {}", selector),
            AudioCommand::PlayVoice { selector, .. } => format!("Play voice {}", selector),
            AudioCommand::SetCategoryVolume { category, volume } => {
                format!("Set {} volume to {:.2}", category, volume)
            }
            AudioCommand::SetMasterVolume(volume) => format!("Set master volume to {:.2}", volume),
            AudioCommand::UpdateGlobalVolumes { .. } => "Update global volumes".to_string(),
            AudioCommand::UpdateSoundConfig { category, index, .. } => {
                format!("Update {} sound #{}", category, index)
            }
            AudioCommand::StopAll => "Stop all sounds".to_string(),
            AudioCommand::PauseResumeAll => "Pause/resume all sounds".to_string(),
            AudioCommand::JukeboxPlay => "Jukebox play".to_string(),
            AudioCommand::JukeboxPause => "Jukebox pause".to_string(),
            AudioCommand::JukeboxStop => "Jukebox stop".to_string(),
            AudioCommand::JukeboxSkipNext => "Jukebox next track".to_string(),
            AudioCommand::JukeboxSkipRandom => "Jukebox random track".to_string(),
            AudioCommand::Quit => "Quit".to_string(),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

fn parse_category(word: &str) -> Result<SoundCategory, ParseCommandError> {
    match word.to_ascii_lowercase().as_str() {
        "music" => Ok(SoundCategory::Music),
        "sfx" => Ok(SoundCategory::Sfx),
        "voice" => Ok(SoundCategory::Voice),
        _ => Err(ParseCommandError::UnknownCategory(word.to_string())),
    }
}

fn parse_number<T: FromStr>(word: Option<&str>, command: &'static str) -> Result<T, ParseCommandError> {
    let word = word.ok_or(ParseCommandError::MissingArgument(command))?;
    word.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(word.to_string()))
}

fn parse_selector(word: &str) -> SoundSelector {
    match word.parse::<isize>() {
        Ok(index) => SoundSelector::Index(index),
        Err(_) => SoundSelector::Name(word.to_string()),
    }
}

/// Optional trailing `x y z`
fn parse_position<'a>(mut words: impl Iterator<Item = &'a str>) -> Result<Option<Position>, ParseCommandError> {
    let Some(x) = words.next() else {
        return Ok(None);
    };
    let x = parse_number(Some(x), "position")?;
    let y = parse_number(words.next(), "position")?;
    let z = parse_number(words.next(), "position")?;
    Ok(Some([x, y, z]))
}

/// Console syntax, one command per line:
///
/// ```text
/// music|sfx|voice <name|index> [x y z]
/// volume <music|sfx|voice|master> <v>
/// volumes <sfx> <music> <voice> <master>
/// config <category> <index> <volume> [pitch]
/// stop | pause | quit
/// jb play|pause|stop|next|random
/// ```
impl FromStr for AudioCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(ParseCommandError::Empty)?;

        match command.to_ascii_lowercase().as_str() {
            "music" | "sfx" | "voice" => {
                let selector = parse_selector(words.next().ok_or(ParseCommandError::MissingArgument("play"))?);
                let position = parse_position(words)?;
                Ok(match parse_category(command)? {
                    SoundCategory::Music => AudioCommand::PlayMusic { selector, position },
                    SoundCategory::Sfx => AudioCommand::PlaySfx { selector, position },
                    SoundCategory::Voice => AudioCommand::PlayVoice { selector, position },
                })
            }
            "volume" => {
                let target = words.next().ok_or(ParseCommandError::MissingArgument("volume"))?;
                let volume = parse_number(words.next(), "volume")?;
                if target.eq_ignore_ascii_case("master") {
                    Ok(AudioCommand::SetMasterVolume(volume))
                } else {
                    Ok(AudioCommand::SetCategoryVolume {
                        category: parse_category(target)?,
                        volume,
                    })
                }
            }
            "volumes" => Ok(AudioCommand::UpdateGlobalVolumes {
                sfx: parse_number(words.next(), "volumes")?,
                music: parse_number(words.next(), "volumes")?,
                voice: parse_number(words.next(), "volumes")?,
                master: parse_number(words.next(), "volumes")?,
            }),
            "config" => {
                let category = parse_category(words.next().ok_or(ParseCommandError::MissingArgument("config"))?)?;
                let index = parse_number(words.next(), "config")?;
                let volume = parse_number(words.next(), "config")?;
                let update = match words.next() {
                    Some(pitch) => SoundConfigUpdate::VolumeAndPitch {
                        volume,
                        pitch: parse_number(Some(pitch), "config")?,
                    },
                    None => SoundConfigUpdate::Volume(volume),
                };
                Ok(AudioCommand::UpdateSoundConfig { category, index, update })
            }
            "stop" => Ok(AudioCommand::StopAll),
            "pause" => Ok(AudioCommand::PauseResumeAll),
            "quit" | "exit" => Ok(AudioCommand::Quit),
            "jb" | "jukebox" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("play") => Ok(AudioCommand::JukeboxPlay),
                Some("pause") => Ok(AudioCommand::JukeboxPause),
                Some("stop") => Ok(AudioCommand::JukeboxStop),
                Some("next") => Ok(AudioCommand::JukeboxSkipNext),
                Some("random") => Ok(AudioCommand::JukeboxSkipRandom),
                Some(other) => Err(ParseCommandError::Unknown(format!("jb {}", other))),
                None => Err(ParseCommandError::MissingArgument("jb")),
            },
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}
