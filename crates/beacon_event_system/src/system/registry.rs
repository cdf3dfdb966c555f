/// Subscription registry: exact-match buckets plus a separate wildcard bucket
use crate::events::EventHandler;
use crate::types::{is_wildcard, SubscriptionId, WILDCARD};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered handler and the type it listens to.
#[derive(Clone)]
pub(super) struct Subscription {
    pub(super) id: SubscriptionId,
    pub(super) event_type: CompactString,
    pub(super) handler: Arc<dyn EventHandler>,
}

impl Subscription {
    pub(super) fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            id: self.id,
            event_type: self.event_type.to_string(),
            handler_name: self.handler.handler_name().to_string(),
            wildcard: is_wildcard(&self.event_type),
        }
    }
}

/// Read-only description of a subscription, returned by introspection queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub id: SubscriptionId,
    pub event_type: String,
    pub handler_name: String,
    /// True when registered against the wildcard marker
    pub wildcard: bool,
}

// Most event types carry only a handful of handlers.
type HandlerBucket = SmallVec<[Subscription; 4]>;

/// Ordered handler storage. Buckets keep subscription order, which is dispatch order.
#[derive(Default)]
pub(super) struct SubscriptionRegistry {
    exact: HashMap<CompactString, HandlerBucket>,
    wildcard: HandlerBucket,
    /// Subscription id -> bucket key (`*` for wildcard entries)
    index: HashMap<SubscriptionId, CompactString>,
}

impl SubscriptionRegistry {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Appends a subscription to the end of its bucket. Buckets are created lazily.
    pub(super) fn insert(&mut self, event_type: &str, handler: Arc<dyn EventHandler>) -> SubscriptionId {
        let id = SubscriptionId::new();
        let key = CompactString::new(event_type);
        let subscription = Subscription {
            id,
            event_type: key.clone(),
            handler,
        };

        if is_wildcard(event_type) {
            self.wildcard.push(subscription);
        } else {
            self.exact.entry(key.clone()).or_default().push(subscription);
        }
        self.index.insert(id, key);
        id
    }

    /// Removes exactly one subscription. Returns `None` if the id is not live.
    pub(super) fn remove(&mut self, id: SubscriptionId) -> Option<Subscription> {
        let key = self.index.remove(&id)?;

        if is_wildcard(&key) {
            let position = self.wildcard.iter().position(|s| s.id == id)?;
            return Some(self.wildcard.remove(position));
        }

        let bucket = self.exact.get_mut(&key)?;
        let position = bucket.iter().position(|s| s.id == id)?;
        let removed = bucket.remove(position);
        if bucket.is_empty() {
            self.exact.remove(&key);
        }
        Some(removed)
    }

    /// Removes every subscription registered against `event_type`.
    pub(super) fn remove_type(&mut self, event_type: &str) -> usize {
        let removed: HandlerBucket = if is_wildcard(event_type) {
            std::mem::take(&mut self.wildcard)
        } else {
            self.exact.remove(event_type).unwrap_or_default()
        };

        for subscription in &removed {
            self.index.remove(&subscription.id);
        }
        removed.len()
    }

    /// Handlers for a publish of `event_type`: exact matches first, then wildcards.
    pub(super) fn resolve(&self, event_type: &str) -> Vec<Subscription> {
        let exact = self.exact.get(event_type).map(|b| b.as_slice()).unwrap_or(&[]);
        exact.iter().chain(self.wildcard.iter()).cloned().collect()
    }

    pub(super) fn exact_count(&self, event_type: &str) -> usize {
        if is_wildcard(event_type) {
            return self.wildcard.len();
        }
        self.exact.get(event_type).map(|b| b.len()).unwrap_or(0)
    }

    pub(super) fn wildcard_count(&self) -> usize {
        self.wildcard.len()
    }

    /// Number of live subscriptions, wildcard included
    pub(super) fn total(&self) -> usize {
        self.index.len()
    }

    pub(super) fn would_dispatch(&self, event_type: &str) -> bool {
        !self.wildcard.is_empty() || self.exact.contains_key(event_type)
    }

    /// Exact-match types with at least one subscriber, sorted.
    pub(super) fn event_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.exact.keys().map(|k| k.to_string()).collect();
        types.sort();
        types
    }

    /// Sanity checks used by `EventSystem::validate`.
    pub(super) fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let bucketed: usize = self.exact.values().map(|b| b.len()).sum::<usize>() + self.wildcard.len();
        if bucketed != self.index.len() {
            issues.push(format!(
                "Registry index tracks {} subscriptions but buckets hold {}",
                self.index.len(),
                bucketed
            ));
        }
        for (key, bucket) in &self.exact {
            if bucket.is_empty() {
                issues.push(format!("Event type '{}' has an empty handler bucket", key));
            }
            if bucket.len() > 100 {
                issues.push(format!("Event type '{}' has excessive handlers: {}", key, bucket.len()));
            }
        }
        if self.wildcard.len() > 100 {
            issues.push(format!("Wildcard '{}' has excessive handlers: {}", WILDCARD, self.wildcard.len()));
        }
        issues
    }
}
