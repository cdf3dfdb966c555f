//! # Core Type Definitions
//!
//! Identifier types and reserved names shared across the Beacon Event System.
//!
//! ## Key Types
//!
//! - [`SubscriptionId`] - Handle returned by `subscribe`, used for precise removal
//! - [`WILDCARD`] - Reserved event type that matches every published event

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved event type used to subscribe to every published event.
pub const WILDCARD: &str = "*";

/// Unique identifier for a single subscription.
///
/// Every call to `subscribe` produces a fresh id, even when the same handler is
/// registered twice, so each registration can be removed independently.
///
/// # Examples
///
/// ```rust
/// use beacon_event_system::SubscriptionId;
///
/// let id = SubscriptionId::new();
/// let parsed = SubscriptionId::from_str(&id.to_string())?;
/// assert_eq!(id, parsed);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Creates a new random subscription ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a subscription ID from its string representation.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns true if `event_type` is the reserved wildcard marker.
#[inline]
pub fn is_wildcard(event_type: &str) -> bool {
    event_type == WILDCARD
}
