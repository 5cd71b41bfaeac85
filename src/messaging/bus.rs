/// Event bus for pub/sub messaging
///
/// The audio driver publishes every event drained from the manager; hosts
/// subscribe to follow playback without touching playback state.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

use super::events::AudioEvent;

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<AudioEvent>,
}

/// Event bus for broadcasting audio events to subscribers
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<AudioEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender: tx });

        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers, dropping the ones that hung up
    pub fn publish(&self, event: AudioEvent) {
        tracing::debug!("Event: {}", event.description());

        let mut closed = Vec::new();
        for subscriber in self.subscribers.read().iter() {
            if subscriber.sender.try_send(event.clone()).is_err() {
                closed.push(subscriber.id);
            }
        }

        if !closed.is_empty() {
            self.subscribers.write().retain(|s| !closed.contains(&s.id));
        }
    }

    pub fn publish_all(&self, events: impl IntoIterator<Item = AudioEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn clear(&self) {
        self.subscribers.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus_subscribe_unsubscribe() {
        let bus = EventBus::new();
        let (_rx, id) = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new();
        let (rx1, _id1) = bus.subscribe();
        let (rx2, _id2) = bus.subscribe();

        bus.publish(AudioEvent::Shutdown);

        assert_eq!(rx1.try_recv().unwrap(), AudioEvent::Shutdown);
        assert_eq!(rx2.try_recv().unwrap(), AudioEvent::Shutdown);
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();
        let (_kept, _id2) = bus.subscribe();
        drop(rx);

        bus.publish(AudioEvent::Shutdown);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_publish_all_keeps_order() {
        let bus = EventBus::new();
        let (rx, _id) = bus.subscribe();

        bus.publish_all(vec![
            AudioEvent::VolumeChanged { category: None, volume: 0.5 },
            AudioEvent::Shutdown,
        ]);

        assert!(matches!(rx.try_recv().unwrap(), AudioEvent::VolumeChanged { .. }));
        assert_eq!(rx.try_recv().unwrap(), AudioEvent::Shutdown);
    }

    #[test]
    fn test_event_bus_clone_shares_subscribers() {
        let bus1 = EventBus::new();
        let bus2 = bus1.clone();

        let (_rx, _id) = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
