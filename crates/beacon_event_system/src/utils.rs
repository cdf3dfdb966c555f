//! # Utility Functions
//!
//! - [`current_timestamp()`] - Process-wide non-decreasing wall-clock timestamps
//! - [`create_event_system()`] - Shared event system factory

use crate::config::EventSystemConfig;
use crate::system::EventSystem;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Last timestamp handed out, in microseconds since the Unix epoch.
static LAST_TIMESTAMP_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Returns the current UTC time, never earlier than a previously returned value.
///
/// The wall clock can step backwards (NTP adjustments, manual changes). Events
/// created in the same process must still be ordered by creation, so when the
/// clock goes backwards the last issued timestamp is reused instead.
pub fn current_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    let now_micros = now.timestamp_micros();

    // Issued values are truncated to microseconds so every caller compares on the same grid.
    let previous = LAST_TIMESTAMP_MICROS.fetch_max(now_micros, Ordering::AcqRel);
    DateTime::<Utc>::from_timestamp_micros(previous.max(now_micros)).unwrap_or(now)
}

/// Creates a new event system with default configuration, ready to share.
///
/// # Examples
///
/// ```rust
/// use beacon_event_system::create_event_system;
///
/// let events = create_event_system();
/// let worker_events = events.clone();
/// assert_eq!(worker_events.subscriber_count(None), 0);
/// ```
pub fn create_event_system() -> Arc<EventSystem> {
    Arc::new(EventSystem::new())
}

/// Creates a new shared event system with the given configuration.
pub fn create_event_system_with_config(config: EventSystemConfig) -> Arc<EventSystem> {
    Arc::new(EventSystem::with_config(config))
}
