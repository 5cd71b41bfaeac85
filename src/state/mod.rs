/// State management module
///
/// Lifecycle state of the jukebox with validated transitions.

pub mod jukebox_state;

// Re-export commonly used types
pub use jukebox_state::{JukeboxState, JukeboxStateMachine, TransitionError};
