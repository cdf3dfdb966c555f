/// Statistics tracking for the event system
use serde::{Deserialize, Serialize};

/// Event system counters for monitoring and tests
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSystemStats {
    /// Live subscriptions, wildcard included
    pub total_handlers: usize,
    /// Live wildcard subscriptions
    pub wildcard_handlers: usize,
    /// Events accepted by `publish` since the system was created
    pub events_published: u64,
    /// Handler calls made during dispatch
    pub handler_invocations: u64,
    /// Handler calls that returned an error or panicked
    pub handler_failures: u64,
    /// Events currently held in history
    pub history_len: usize,
    /// Events dropped from history to make room for newer ones
    pub history_evictions: u64,
}
