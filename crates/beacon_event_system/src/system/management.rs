/// Event system introspection and history queries
use crate::events::Event;
use super::core::EventSystem;
use super::registry::SubscriptionInfo;
use super::stats::EventSystemStats;
use tracing::{debug, info};

impl EventSystem {
    /// Copy of the published-event history, oldest first.
    ///
    /// With `Some(limit)` only the `limit` most recent events are returned.
    /// Mutating the returned vector never affects the bus.
    pub fn get_history(&self, limit: Option<usize>) -> Vec<Event> {
        let guard = self.state.lock();
        let snapshot = guard.borrow().history.snapshot(limit);
        snapshot
    }

    /// Empties the history buffer.
    pub fn clear_history(&self) {
        let guard = self.state.lock();
        guard.borrow_mut().history.clear();
        debug!("History cleared");
    }

    /// Maximum number of events kept in history
    #[inline]
    pub fn history_capacity(&self) -> usize {
        self.config.history_capacity
    }

    /// Number of subscriptions.
    ///
    /// - `Some("*")`: wildcard subscriptions
    /// - `Some(event_type)`: exact-match subscriptions for that type
    /// - `None`: every subscription, exact and wildcard
    pub fn subscriber_count(&self, event_type: Option<&str>) -> usize {
        let guard = self.state.lock();
        let state = guard.borrow();
        match event_type {
            Some(event_type) => state.registry.exact_count(event_type),
            None => state.registry.total(),
        }
    }

    /// True if publishing `event_type` would reach at least one handler.
    pub fn has_subscribers(&self, event_type: &str) -> bool {
        let guard = self.state.lock();
        let dispatches = guard.borrow().registry.would_dispatch(event_type);
        dispatches
    }

    /// Subscriptions that a publish of `event_type` would invoke, in dispatch order.
    pub fn subscribers_for(&self, event_type: &str) -> Vec<SubscriptionInfo> {
        let guard = self.state.lock();
        let subscribers = guard.borrow().registry.resolve(event_type);
        subscribers.iter().map(|s| s.info()).collect()
    }

    /// Event types with at least one exact-match subscriber, sorted.
    pub fn registered_event_types(&self) -> Vec<String> {
        let guard = self.state.lock();
        let types = guard.borrow().registry.event_types();
        types
    }

    /// Gets the current event system statistics
    pub fn get_stats(&self) -> EventSystemStats {
        let guard = self.state.lock();
        let state = guard.borrow();
        EventSystemStats {
            total_handlers: state.registry.total(),
            wildcard_handlers: state.registry.wildcard_count(),
            history_len: state.history.len(),
            ..state.stats.clone()
        }
    }

    /// Validates internal consistency, returning a description of each problem found.
    pub fn validate(&self) -> Vec<String> {
        let guard = self.state.lock();
        let state = guard.borrow();
        let mut issues = state.registry.issues();

        if state.history.len() > state.history.capacity() {
            issues.push(format!(
                "History holds {} events but capacity is {}",
                state.history.len(),
                state.history.capacity()
            ));
        }

        if !issues.is_empty() {
            info!("🔍 Event system validation found {} issue(s)", issues.len());
        }
        issues
    }
}
