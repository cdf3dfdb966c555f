/// Event publication and dispatch
use crate::config::ErrorPolicy;
use crate::events::{validate_event_type, Event, EventError, FailureKind, HandlerFailure};
use super::core::EventSystem;
use super::registry::Subscription;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};
use uuid::Uuid;

/// Outcome of a single `publish` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub event_id: Uuid,
    pub event_type: String,
    /// Number of handlers the event was dispatched to
    pub handlers_invoked: usize,
    /// Handlers that returned an error or panicked, in dispatch order
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    /// True when every handler succeeded
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl EventSystem {
    /// Publishes an event to every matching handler.
    ///
    /// Exact-match handlers run first in subscription order, then wildcard
    /// handlers in subscription order, all on the calling thread. A failing or
    /// panicking handler is logged, passed to the error reporter and skipped;
    /// the remaining handlers still run. The event is recorded in history
    /// whatever the handlers did.
    ///
    /// Under [`ErrorPolicy::Report`] failures come back inside the
    /// [`PublishReport`]; under [`ErrorPolicy::Raise`] they come back as
    /// [`EventError::HandlerFailed`] once dispatch is complete.
    pub fn publish(&self, event: Event) -> Result<PublishReport, EventError> {
        // Events deserialized from untrusted input never went through `Event::new`.
        validate_event_type(event.event_type())?;

        let guard = self.state.lock();
        let subscribers = guard.borrow().registry.resolve(event.event_type());

        if subscribers.is_empty() {
            debug!("No subscribers for event: {}", event.event_type());
        } else if cfg!(debug_assertions) {
            debug!("📤 Publishing {} to {} handlers", event.event_type(), subscribers.len());
        }

        let mut failures = Vec::new();
        for subscription in &subscribers {
            if let Err(kind) = self.invoke(subscription, &event) {
                let failure = HandlerFailure {
                    subscription_id: subscription.id,
                    handler_name: subscription.handler.handler_name().to_string(),
                    event_type: event.event_type().to_string(),
                    kind,
                };
                error!("❌ {}", failure);
                self.report_failure(&failure);
                failures.push(failure);
            }
        }

        let report = PublishReport {
            event_id: event.id(),
            event_type: event.event_type().to_string(),
            handlers_invoked: subscribers.len(),
            failures,
        };

        {
            let mut state = guard.borrow_mut();
            if state.history.record(event).is_some() {
                state.stats.history_evictions += 1;
            }
            state.stats.events_published += 1;
            state.stats.handler_invocations += report.handlers_invoked as u64;
            state.stats.handler_failures += report.failures.len() as u64;
        }
        drop(guard);

        match self.config.error_policy {
            ErrorPolicy::Raise if !report.is_success() => Err(EventError::HandlerFailed {
                event_type: report.event_type,
                failures: report.failures,
            }),
            _ => Ok(report),
        }
    }

    /// Builds and publishes an event in one step.
    #[inline]
    pub fn emit(&self, event_type: &str, data: serde_json::Value) -> Result<PublishReport, EventError> {
        self.publish(Event::new(event_type, data)?)
    }

    /// Runs one handler, turning an error or a caught panic into a failure kind.
    fn invoke(&self, subscription: &Subscription, event: &Event) -> Result<(), FailureKind> {
        let handler = &subscription.handler;
        if !self.config.catch_panics {
            return handler.handle(event).map_err(|e| FailureKind::Error(e.to_string()));
        }

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(FailureKind::Error(e.to_string())),
            Err(payload) => Err(FailureKind::Panic(panic_message(payload.as_ref()))),
        }
    }

    fn report_failure(&self, failure: &HandlerFailure) {
        let Some(reporter) = self.error_reporter.as_ref() else {
            return;
        };
        if !self.config.catch_panics {
            reporter.report(failure);
            return;
        }
        if panic::catch_unwind(AssertUnwindSafe(|| reporter.report(failure))).is_err() {
            error!("❌ Error reporter panicked while reporting: {}", failure);
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panicked with unknown payload".to_string()
    }
}
