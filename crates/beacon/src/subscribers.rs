//! Built-in subscribers wired onto the bus before a replay.

use crate::config::SubscriberSettings;
use beacon_event_system::{Event, EventError, EventSystem, FnEventHandler, SubscriptionId, WILDCARD};
use std::sync::Arc;
use tracing::info;

/// Registers the subscribers described by `settings`, returning their ids in registration order.
pub fn register_builtin_subscribers(
    events: &EventSystem,
    settings: &SubscriberSettings,
) -> Result<Vec<SubscriptionId>, EventError> {
    let mut ids = Vec::new();

    for route in &settings.routes {
        let message = route.message.clone();
        let handler = FnEventHandler::new(format!("route:{}", route.event_type), move |event: &Event| {
            info!("📨 {} [{}]", message, event.event_type());
            Ok(())
        });
        ids.push(events.subscribe(&route.event_type, Arc::new(handler))?);
    }

    for fail_type in &settings.fail_types {
        let handler = FnEventHandler::new(format!("fail:{fail_type}"), |event: &Event| {
            Err(EventError::HandlerExecution(format!(
                "configured to fail on '{}' ({})",
                event.event_type(),
                event.id()
            )))
        });
        ids.push(events.subscribe(fail_type, Arc::new(handler))?);
    }

    if settings.activity_log {
        let handler = FnEventHandler::new("activity_log", |event: &Event| {
            info!(
                "📝 {} from {} at {}: {}",
                event.event_type(),
                event.source().unwrap_or("unknown"),
                event.timestamp().to_rfc3339(),
                event.data()
            );
            Ok(())
        });
        ids.push(events.subscribe(WILDCARD, Arc::new(handler))?);
    }

    info!("🔌 Registered {} built-in subscribers", ids.len());
    Ok(ids)
}
