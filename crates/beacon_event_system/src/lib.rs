//! # Beacon Event System
//!
//! An in-process publish/subscribe event bus. Callers register handlers for
//! named event types or for every event (`"*"`), publish structured events, and
//! the bus dispatches each event synchronously to all matching handlers.
//!
//! ## Core Features
//!
//! - **Deterministic dispatch**: exact-match handlers in subscription order, then wildcard handlers
//! - **Error isolation**: a handler that fails or panics never stops the others or crashes the publisher
//! - **Bounded history**: the most recent events are kept for inspection, oldest evicted first
//! - **Thread safe**: one re-entrant lock keeps dispatch and history order consistent
//!
//! ## Quick Start Example
//!
//! ```rust
//! use beacon_event_system::*;
//! use serde_json::json;
//!
//! let events = create_event_system();
//!
//! events.on("order.created", |event: &Event| {
//!     println!("new order {}", event.data()["id"]);
//!     Ok(())
//! })?;
//!
//! events.on_any(|event: &Event| {
//!     println!("audit: {}", event.event_type());
//!     Ok(())
//! })?;
//!
//! let report = events.publish(Event::new("order.created", json!({"id": 1}))?)?;
//! assert_eq!(report.handlers_invoked, 2);
//! assert_eq!(events.get_history(None).len(), 1);
//! # Ok::<(), EventError>(())
//! ```
//!
//! ## Failure Handling
//!
//! Handler failures are logged with `tracing`, forwarded to an optional
//! [`ErrorReporter`], and returned in the [`PublishReport`]. With
//! [`ErrorPolicy::Raise`] they are returned as [`EventError::HandlerFailed`]
//! instead, after every handler has run.

pub mod config;
pub mod events;
pub mod system;
pub mod types;
pub mod utils;

pub use config::{ErrorPolicy, EventSystemConfig};
pub use events::{
    validate_event_type, Event, EventError, EventHandler, FailureKind, FnEventHandler,
    HandlerFailure,
};
pub use system::{
    CollectingReporter, ErrorReporter, EventSystem, EventSystemStats, PublishReport,
    SubscriptionInfo,
};
pub use types::{SubscriptionId, WILDCARD};
pub use utils::{create_event_system, create_event_system_with_config, current_timestamp};

/// Returns build info string with the crate version
pub fn beacon_build_info() -> String {
    format!("Beacon Event System v{}", env!("CARGO_PKG_VERSION"))
}
