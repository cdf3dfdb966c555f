//! # Events, Handlers and Errors
//!
//! This module defines the [`Event`] record published on the bus, the
//! [`EventHandler`] capability subscribers implement, and the error taxonomy
//! shared by the whole crate.
//!
//! ## Design Principles
//!
//! - **Value semantics**: an [`Event`] is immutable once built; handlers get `&Event`
//! - **Early validation**: a malformed event type is rejected at construction
//! - **Isolation**: a handler failure becomes a [`HandlerFailure`] record, never a crash

use crate::types::{SubscriptionId, WILDCARD};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

// ============================================================================
// Event
// ============================================================================

/// An immutable record published on the bus.
///
/// # Examples
///
/// ```rust
/// use beacon_event_system::Event;
/// use serde_json::json;
///
/// let event = Event::new("order.created", json!({"id": 1}))?
///     .with_source("checkout");
/// assert_eq!(event.event_type(), "order.created");
/// assert_eq!(event.source(), Some("checkout"));
/// # Ok::<(), beacon_event_system::EventError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: Uuid,
    #[serde(rename = "type")]
    event_type: CompactString,
    data: serde_json::Value,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<CompactString>,
}

impl Event {
    /// Creates an event with a JSON payload.
    ///
    /// Returns [`EventError::InvalidEvent`] if the type is empty or malformed.
    pub fn new(event_type: &str, data: serde_json::Value) -> Result<Self, EventError> {
        validate_event_type(event_type)?;
        Ok(Self {
            id: Uuid::new_v4(),
            event_type: CompactString::new(event_type),
            data,
            timestamp: current_timestamp(),
            source: None,
        })
    }

    /// Creates an event whose payload is the JSON form of `payload`.
    pub fn from_payload<T>(event_type: &str, payload: &T) -> Result<Self, EventError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(payload).map_err(EventError::Serialization)?;
        Self::new(event_type, data)
    }

    /// Sets the origin of this event. Consumes the event; nothing mutates it after publish.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(CompactString::new(source));
        self
    }

    /// Unique id assigned at construction
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The exact-match dispatch key
    #[inline]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    #[inline]
    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Deserializes the payload into a concrete type.
    pub fn payload<T>(&self) -> Result<T, EventError>
    where
        T: DeserializeOwned,
    {
        T::deserialize(&self.data).map_err(|e| {
            tracing::warn!(
                "🟡 Payload of event '{}' ({}) does not match type '{}': {}",
                self.event_type,
                self.id,
                std::any::type_name::<T>(),
                e
            );
            EventError::Deserialization(e)
        })
    }
}

/// Checks that `event_type` can be published.
///
/// A publishable type is non-empty, contains no whitespace or control
/// characters, and is not the reserved wildcard marker.
pub fn validate_event_type(event_type: &str) -> Result<(), EventError> {
    if event_type.is_empty() {
        return Err(EventError::InvalidEvent("event type must not be empty".to_string()));
    }
    if event_type == WILDCARD {
        return Err(EventError::InvalidEvent(format!(
            "'{WILDCARD}' is reserved for wildcard subscriptions"
        )));
    }
    if let Some(c) = event_type.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(EventError::InvalidEvent(format!(
            "event type '{}' contains invalid character {:?}",
            event_type.escape_debug(),
            c
        )));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Capability implemented by subscribers: receive an event, return nothing, may fail.
///
/// Most callers register closures through
/// [`EventSystem::on`](crate::EventSystem::on) instead of implementing this
/// trait directly.
pub trait EventHandler: Send + Sync + 'static {
    /// Handles one published event.
    fn handle(&self, event: &Event) -> Result<(), EventError>;

    /// Human-readable name used in logs and failure reports.
    fn handler_name(&self) -> &str;
}

/// Adapter turning a closure into an [`EventHandler`].
///
/// # Examples
///
/// ```rust
/// use beacon_event_system::{Event, EventHandler, FnEventHandler};
///
/// let handler = FnEventHandler::new("audit", |event: &Event| {
///     println!("saw {}", event.event_type());
///     Ok(())
/// });
/// assert_eq!(handler.handler_name(), "audit");
/// ```
pub struct FnEventHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    handler: F,
    name: String,
}

impl<F> FnEventHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            handler,
            name: name.into(),
        }
    }
}

impl<F> Debug for FnEventHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEventHandler")
            .field("name", &self.name)
            .finish()
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&Event) -> Result<(), EventError> + Send + Sync + 'static,
{
    fn handle(&self, event: &Event) -> Result<(), EventError> {
        (self.handler)(event)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Failures and Errors
// ============================================================================

/// How a handler failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureKind {
    /// The handler returned an error
    Error(String),
    /// The handler panicked; the message is the panic payload when it is a string
    Panic(String),
}

/// A single handler failure captured during dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerFailure {
    pub subscription_id: SubscriptionId,
    pub handler_name: String,
    pub event_type: String,
    pub kind: FailureKind,
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FailureKind::Error(message) => write!(
                f,
                "handler '{}' failed on '{}': {}",
                self.handler_name, self.event_type, message
            ),
            FailureKind::Panic(message) => write!(
                f,
                "handler '{}' panicked on '{}': {}",
                self.handler_name, self.event_type, message
            ),
        }
    }
}

/// Errors produced by the event system.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The event type is empty or malformed
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
    /// Returned by a handler to signal that it could not process an event
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    /// One or more handlers failed while dispatching an event (raise policy only)
    #[error("{} handler(s) failed for event '{event_type}'", failures.len())]
    HandlerFailed {
        event_type: String,
        failures: Vec<HandlerFailure>,
    },
    /// No live subscription has this id
    #[error("Unknown subscription: {0}")]
    UnknownSubscription(SubscriptionId),
    /// Serialization failed when converting a payload to JSON
    #[error("Serialization error: {0}")]
    Serialization(serde_json::Error),
    /// Deserialization failed when reading a payload back
    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),
}
