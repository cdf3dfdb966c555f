/// Event handler registration methods
use crate::events::{validate_event_type, Event, EventError, EventHandler, FnEventHandler};
use crate::types::{is_wildcard, SubscriptionId, WILDCARD};
use super::core::EventSystem;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl EventSystem {
    /// Registers a handler for an event type, or for every event with `"*"`.
    ///
    /// Registering the same handler twice creates two independent subscriptions,
    /// each invoked once per matching publish. Handlers for one type run in the
    /// order they were subscribed, and always before wildcard handlers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use beacon_event_system::{Event, EventSystem, FnEventHandler};
    /// use serde_json::json;
    /// use std::sync::Arc;
    ///
    /// let events = EventSystem::new();
    /// let id = events.subscribe("order.created", Arc::new(FnEventHandler::new(
    ///     "mailer",
    ///     |event: &Event| {
    ///         println!("order {}", event.data()["id"]);
    ///         Ok(())
    ///     },
    /// )))?;
    ///
    /// events.emit("order.created", json!({"id": 1}))?;
    /// events.unsubscribe(id)?;
    /// # Ok::<(), beacon_event_system::EventError>(())
    /// ```
    pub fn subscribe(
        &self,
        event_type: &str,
        handler: Arc<dyn EventHandler>,
    ) -> Result<SubscriptionId, EventError> {
        if !is_wildcard(event_type) {
            validate_event_type(event_type)?;
        }

        let handler_name = handler.handler_name().to_string();
        let guard = self.state.lock();
        let id = guard.borrow_mut().registry.insert(event_type, handler);

        info!("📝 Registered handler '{}' for {} ({})", handler_name, event_type, id);
        Ok(id)
    }

    /// Registers a closure for an event type.
    pub fn on<F>(&self, event_type: &str, handler: F) -> Result<SubscriptionId, EventError>
    where
        F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let handler_name = format!("{}::{}", event_type, std::any::type_name::<F>());
        self.subscribe(event_type, Arc::new(FnEventHandler::new(handler_name, handler)))
    }

    /// Registers a closure that receives every published event.
    pub fn on_any<F>(&self, handler: F) -> Result<SubscriptionId, EventError>
    where
        F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
    {
        self.on(WILDCARD, handler)
    }

    /// Removes exactly the subscription identified by `id`.
    ///
    /// Unknown or already removed ids yield [`EventError::UnknownSubscription`];
    /// other subscriptions are never touched.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), EventError> {
        let guard = self.state.lock();
        let removed = guard.borrow_mut().registry.remove(id);

        match removed {
            Some(subscription) => {
                info!(
                    "🗑️ Unsubscribed handler '{}' from {} ({})",
                    subscription.handler.handler_name(),
                    subscription.event_type,
                    id
                );
                Ok(())
            }
            None => {
                warn!("⚠️ Unsubscribe for unknown subscription {}", id);
                Err(EventError::UnknownSubscription(id))
            }
        }
    }

    /// Removes every handler registered for `event_type` (`"*"` removes the wildcard handlers).
    pub fn remove_handlers(&self, event_type: &str) -> usize {
        let guard = self.state.lock();
        let removed_count = guard.borrow_mut().registry.remove_type(event_type);

        if removed_count > 0 {
            info!("🗑️ Removed {} handlers for '{}'", removed_count, event_type);
        } else {
            debug!("No handlers to remove for '{}'", event_type);
        }
        removed_count
    }
}
