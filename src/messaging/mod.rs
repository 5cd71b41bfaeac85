/// Messaging module for Event/Command architecture
///
/// This module implements the Event/Command segregation pattern:
/// - **Commands**: Requests to perform actions (imperative, sent to the driver)
/// - **Events**: Notifications of things that happened (past tense, broadcast)
///
/// ## Architecture
///
/// ```text
/// ┌─────────┐   AudioCommand   ┌─────────────┐   AudioEvent   ┌─────────────┐
/// │ Console │ ───────────────> │ AudioDriver │ ─────────────> │  Event Bus  │
/// │  / Host │                  │  (manager,  │                │             │
/// └─────────┘                  │   ticks)    │                └─────────────┘
///                              └─────────────┘                       │
///                                                                    ▼
///                                                              Subscribers
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let event_bus = EventBus::new();
/// let (rx, _id) = event_bus.subscribe();
///
/// let driver = AudioDriver::spawn(move || AudioManager::new(&config, backend), event_bus)?;
/// driver.send(AudioCommand::PlayMusic { selector: "Theme".into(), position: None });
///
/// while let Ok(event) = rx.recv() {
///     println!("{}", event.description());
/// }
/// ```

pub mod bus;
pub mod commands;
pub mod driver;
pub mod events;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use commands::{AudioCommand, ParseCommandError};
pub use driver::AudioDriver;
pub use events::AudioEvent;
