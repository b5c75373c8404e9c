//! Control-room notification

use serde::{Deserialize, Serialize};
use timing::Timestamp;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default feed capacity before slow subscribers start lagging
const DEFAULT_CAPACITY: usize = 64;

/// A driver entered critical status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalTransition {
    pub driver_id: String,
    pub name: String,
    pub vehicle_id: String,
    pub timestamp: Timestamp,
}

/// Receives critical transitions from the fleet engine
pub trait ControlRoomNotifier: Send + Sync {
    fn on_critical_transition(&self, transition: &CriticalTransition);
}

/// Logs critical transitions
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingControlRoom;

impl ControlRoomNotifier for LoggingControlRoom {
    fn on_critical_transition(&self, transition: &CriticalTransition) {
        warn!(
            "Critical Alert: {} ({}) - Drowsiness detected!",
            transition.name, transition.vehicle_id
        );
    }
}

/// Broadcast feed so several control-room consumers see every transition
#[derive(Debug, Clone)]
pub struct ControlRoomFeed {
    sender: broadcast::Sender<CriticalTransition>,
}

impl ControlRoomFeed {
    /// Create a feed buffering up to `capacity` transitions per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to future transitions
    pub fn subscribe(&self) -> broadcast::Receiver<CriticalTransition> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ControlRoomFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ControlRoomNotifier for ControlRoomFeed {
    fn on_critical_transition(&self, transition: &CriticalTransition) {
        if self.sender.send(transition.clone()).is_err() {
            // no subscribers is a normal condition
            debug!("No control-room subscribers for {}", transition.driver_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition() -> CriticalTransition {
        CriticalTransition {
            driver_id: "3".into(),
            name: "David Johnson".into(),
            vehicle_id: "TR-015".into(),
            timestamp: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_every_subscriber_receives() {
        let feed = ControlRoomFeed::default();
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);

        feed.on_critical_transition(&transition());
        assert_eq!(a.try_recv().unwrap(), transition());
        assert_eq!(b.try_recv().unwrap(), transition());
    }

    #[test]
    fn test_send_without_subscribers() {
        let feed = ControlRoomFeed::new(4);
        feed.on_critical_transition(&transition());
        assert_eq!(feed.subscriber_count(), 0);
    }
}
