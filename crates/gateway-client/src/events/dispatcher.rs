//! Event dispatcher
//!
//! Maps lowercase event names to handlers. Handlers for one event run in
//! registration order and each is awaited before the next starts.

use crate::client::GatewayClient;
use crate::protocol::GatewayMessage;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Boxed event handler
pub type EventHandler =
    Arc<dyn Fn(GatewayClient, GatewayMessage) -> BoxFuture<'static, ()> + Send + Sync>;

/// Registry of event subscriptions
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: DashMap<String, Vec<EventHandler>>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event_name`, matched case-insensitively
    pub fn subscribe(&self, event_name: &str, handler: EventHandler) {
        let key = event_name.to_lowercase();
        tracing::debug!(event = %key, "Subscribed");
        self.subscriptions.entry(key).or_default().push(handler);
    }

    /// Number of handlers registered for `event_name`
    #[must_use]
    pub fn subscriber_count(&self, event_name: &str) -> usize {
        self.subscriptions
            .get(&event_name.to_lowercase())
            .map_or(0, |handlers| handlers.len())
    }

    /// Run every handler subscribed to the message's event; returns how many ran
    pub async fn dispatch(&self, client: &GatewayClient, message: &GatewayMessage) -> usize {
        let Some(key) = message.event_key() else {
            return 0;
        };

        // Clone out so no map guard is held across an await
        let handlers = match self.subscriptions.get(&key) {
            Some(entry) => entry.value().clone(),
            None => {
                tracing::trace!(event = %key, "No subscribers");
                return 0;
            }
        };

        for handler in &handlers {
            handler(client.clone(), message.clone()).await;
        }
        handlers.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("events", &self.subscriptions.len())
            .finish()
    }
}

/// Event name for a handler label such as `on_message_create`
#[must_use]
pub fn event_name_from_label(label: &str) -> &str {
    label.strip_prefix("on_").unwrap_or(label)
}
