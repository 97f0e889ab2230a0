//! Subscription channel for state changes and toasts

use std::time::Duration;
use tokio::sync::broadcast;
use tracing::trace;

use crate::types::{LocalEvent, Toast, ToastKind, DEFAULT_TOAST_DURATION};

const CHANNEL_CAPACITY: usize = 64;

/// Broadcast bus shared by everything built from one [`crate::LocalContext`]
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LocalEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LocalEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub fn publish(&self, event: LocalEvent) {
        let name = event.name();
        match self.tx.send(event) {
            Ok(receivers) => trace!(event = name, receivers, "Published local event"),
            Err(_) => trace!(event = name, "No subscribers for local event"),
        }
    }

    pub fn toast(&self, message: impl Into<String>, kind: ToastKind) {
        self.toast_for(message, kind, DEFAULT_TOAST_DURATION);
    }

    pub fn toast_for(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        self.publish(LocalEvent::Toast(Toast {
            message: message.into(),
            kind,
            duration,
        }));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
