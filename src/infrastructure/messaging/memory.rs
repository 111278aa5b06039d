//! In-process event publishers

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{EventPublisher, UserEvent};

const DEFAULT_CAPACITY: usize = 256;

/// Keeps every published event in order and fans them out to subscribers.
pub struct InMemoryEventPublisher {
    published: Mutex<Vec<UserEvent>>,
    sender: broadcast::Sender<UserEvent>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self {
            published: Mutex::new(Vec::new()),
            sender,
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<UserEvent>> {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of everything published so far
    pub fn events(&self) -> Vec<UserEvent> {
        self.guard().clone()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UserEvent> {
        self.sender.subscribe()
    }
}

impl Default for InMemoryEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for InMemoryEventPublisher {
    fn publish(&self, event: UserEvent) {
        self.guard().push(event.clone());
        // No subscribers is fine
        let _ = self.sender.send(event);
    }
}

/// Used when events are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    fn publish(&self, event: UserEvent) {
        debug!(
            routing_key = event.routing_key(),
            user_id = %event.user_id(),
            "Events disabled, dropping event"
        );
    }
}
