/// Jukebox lifecycle state machine
///
/// `Initializing → Playing ⇄ Paused`, `Playing/Paused → Stopped`,
/// `Stopped → Playing`. There is no terminal state.

use serde::Serialize;

/// Lifecycle state of the jukebox
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JukeboxState {
    /// Playlist not yet started
    #[default]
    Initializing,

    /// Current track audible, timer advancing
    Playing,

    /// Current track paused, timer frozen
    Paused,

    /// Current track stopped, resumes from its start
    Stopped,
}

impl JukeboxState {
    pub fn is_playing(&self) -> bool {
        matches!(self, JukeboxState::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, JukeboxState::Paused)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, JukeboxState::Stopped)
    }

    /// Whether a current track exists
    pub fn is_initialized(&self) -> bool {
        !matches!(self, JukeboxState::Initializing)
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            JukeboxState::Initializing => "Initializing...",
            JukeboxState::Playing => "Playing",
            JukeboxState::Paused => "Paused",
            JukeboxState::Stopped => "Stopped",
        }
    }
}

/// Rejected lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// Playlist has not been started yet
    NotInitialized,

    /// Already initialized; initialization runs once
    AlreadyInitialized,

    AlreadyPlaying,

    /// Only a playing jukebox can pause
    NotPlaying,

    /// Only a paused jukebox can unpause
    NotPaused,

    AlreadyStopped,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::NotInitialized => write!(f, "Jukebox is not initialized"),
            TransitionError::AlreadyInitialized => write!(f, "Jukebox is already initialized"),
            TransitionError::AlreadyPlaying => write!(f, "Jukebox is already playing"),
            TransitionError::NotPlaying => write!(f, "Jukebox is not playing"),
            TransitionError::NotPaused => write!(f, "Jukebox is not paused"),
            TransitionError::AlreadyStopped => write!(f, "Jukebox is already stopped"),
        }
    }
}

impl std::error::Error for TransitionError {}

/// State machine for jukebox lifecycle transitions
#[derive(Debug, Default)]
pub struct JukeboxStateMachine {
    state: JukeboxState,
}

impl JukeboxStateMachine {
    /// Create a new state machine in the Initializing state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> JukeboxState {
        self.state
    }

    /// Initializing → Playing
    pub fn finish_initializing(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JukeboxState::Initializing => {
                self.state = JukeboxState::Playing;
                Ok(())
            }
            _ => Err(TransitionError::AlreadyInitialized),
        }
    }

    /// Playing → Paused
    pub fn pause(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JukeboxState::Playing => {
                self.state = JukeboxState::Paused;
                Ok(())
            }
            JukeboxState::Initializing => Err(TransitionError::NotInitialized),
            _ => Err(TransitionError::NotPlaying),
        }
    }

    /// Paused → Playing
    pub fn unpause(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JukeboxState::Paused => {
                self.state = JukeboxState::Playing;
                Ok(())
            }
            JukeboxState::Initializing => Err(TransitionError::NotInitialized),
            _ => Err(TransitionError::NotPaused),
        }
    }

    /// Playing/Paused → Stopped
    pub fn stop(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JukeboxState::Playing | JukeboxState::Paused => {
                self.state = JukeboxState::Stopped;
                Ok(())
            }
            JukeboxState::Stopped => Err(TransitionError::AlreadyStopped),
            JukeboxState::Initializing => Err(TransitionError::NotInitialized),
        }
    }

    /// Stopped → Playing
    pub fn resume(&mut self) -> Result<(), TransitionError> {
        match self.state {
            JukeboxState::Stopped => {
                self.state = JukeboxState::Playing;
                Ok(())
            }
            JukeboxState::Initializing => Err(TransitionError::NotInitialized),
            _ => Err(TransitionError::AlreadyPlaying),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jukebox_state_predicates() {
        assert!(!JukeboxState::Initializing.is_initialized());
        assert!(JukeboxState::Playing.is_playing());
        assert!(JukeboxState::Paused.is_paused());
        assert!(JukeboxState::Stopped.is_stopped());
        assert!(JukeboxState::Stopped.is_initialized());
        assert_eq!(JukeboxState::default(), JukeboxState::Initializing);
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut sm = JukeboxStateMachine::new();
        assert_eq!(sm.state(), JukeboxState::Initializing);

        // Nothing but initialization is allowed first
        assert_eq!(sm.pause(), Err(TransitionError::NotInitialized));
        assert_eq!(sm.stop(), Err(TransitionError::NotInitialized));

        assert!(sm.finish_initializing().is_ok());
        assert!(sm.state().is_playing());
        assert_eq!(sm.finish_initializing(), Err(TransitionError::AlreadyInitialized));

        assert!(sm.pause().is_ok());
        assert_eq!(sm.pause(), Err(TransitionError::NotPlaying));
        assert!(sm.unpause().is_ok());

        assert!(sm.stop().is_ok());
        assert_eq!(sm.stop(), Err(TransitionError::AlreadyStopped));
        assert_eq!(sm.unpause(), Err(TransitionError::NotPaused));

        assert!(sm.resume().is_ok());
        assert_eq!(sm.resume(), Err(TransitionError::AlreadyPlaying));
    }

    #[test]
    fn test_paused_can_stop() {
        let mut sm = JukeboxStateMachine::new();
        sm.finish_initializing().unwrap();
        sm.pause().unwrap();
        assert!(sm.stop().is_ok());
        assert_eq!(sm.state(), JukeboxState::Stopped);
    }
}
