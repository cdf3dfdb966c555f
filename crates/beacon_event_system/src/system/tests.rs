//! Tests for subscription, dispatch, error isolation and history

#[cfg(test)]
mod tests {
    use crate::config::{ErrorPolicy, EventSystemConfig};
    use crate::events::{Event, EventError, FailureKind, FnEventHandler, HandlerFailure};
    use std::panic::{self, AssertUnwindSafe};
    use crate::system::{CollectingReporter, EventSystem};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use tracing::info;

    type CallLog = Arc<Mutex<Vec<String>>>;

    fn call_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Registers a closure that appends `label` to `log` on every call.
    fn record_into(events: &EventSystem, event_type: &str, label: &str, log: &CallLog) {
        let log = log.clone();
        let label = label.to_string();
        events
            .on(event_type, move |_event: &Event| {
                log.lock().unwrap().push(label.clone());
                Ok(())
            })
            .unwrap();
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn with_capacity(capacity: usize) -> EventSystem {
        EventSystem::with_config(EventSystemConfig::default().with_history_capacity(capacity))
    }

    #[test]
    fn test_event_system_creation() {
        let events = EventSystem::new();
        let stats = events.get_stats();

        assert_eq!(stats.total_handlers, 0);
        assert_eq!(stats.events_published, 0);
        assert_eq!(events.history_capacity(), 100);
        assert!(events.get_history(None).is_empty());
    }

    #[test]
    fn test_order_created_with_wildcard() {
        let events = EventSystem::new();
        let log = call_log();
        record_into(&events, "order.created", "A", &log);
        record_into(&events, "*", "B", &log);

        let report = events
            .publish(Event::new("order.created", json!({"id": 1})).unwrap())
            .unwrap();

        assert_eq!(calls(&log), ["A", "B"]);
        assert_eq!(report.handlers_invoked, 2);
        assert!(report.is_success());

        let history = events.get_history(None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type(), "order.created");
        assert_eq!(history[0].data(), &json!({"id": 1}));
    }

    #[test]
    fn test_dispatch_order_is_registration_order_then_wildcards() {
        let events = EventSystem::new();
        let log = call_log();
        record_into(&events, "*", "w1", &log);
        record_into(&events, "user.login", "a", &log);
        record_into(&events, "user.login", "b", &log);
        record_into(&events, "*", "w2", &log);
        record_into(&events, "user.login", "c", &log);
        record_into(&events, "user.logout", "unrelated", &log);

        for _ in 0..3 {
            events.emit("user.login", json!(null)).unwrap();
        }

        let expected = ["a", "b", "c", "w1", "w2"].repeat(3);
        assert_eq!(calls(&log), expected);

        let wildcard_flags: Vec<bool> = events
            .subscribers_for("user.login")
            .into_iter()
            .map(|s| s.wildcard)
            .collect();
        assert_eq!(wildcard_flags, [false, false, false, true, true]);
    }

    #[test]
    fn test_wildcard_receives_every_type() {
        let events = EventSystem::new();
        let seen = call_log();
        let seen_clone = seen.clone();
        events
            .on_any(move |event: &Event| {
                seen_clone.lock().unwrap().push(event.event_type().to_string());
                Ok(())
            })
            .unwrap();

        events.emit("a", json!(1)).unwrap();
        events.emit("b", json!(2)).unwrap();
        events.emit("c.d", json!(3)).unwrap();

        assert_eq!(calls(&seen), ["a", "b", "c.d"]);
        assert!(events.has_subscribers("never.registered"));
    }

    #[test]
    fn test_duplicate_handler_registration_invoked_per_subscription() {
        let events = EventSystem::new();
        let count = Arc::new(Mutex::new(0u32));
        let count_clone = count.clone();
        let handler = Arc::new(FnEventHandler::new("counter", move |_: &Event| {
            *count_clone.lock().unwrap() += 1;
            Ok(())
        }));

        let first = events.subscribe("tick", handler.clone()).unwrap();
        let second = events.subscribe("tick", handler).unwrap();
        assert_ne!(first, second);

        events.emit("tick", json!(null)).unwrap();
        assert_eq!(*count.lock().unwrap(), 2);

        events.unsubscribe(first).unwrap();
        events.emit("tick", json!(null)).unwrap();
        assert_eq!(*count.lock().unwrap(), 3);
    }

    #[test]
    fn test_history_fifo_eviction() {
        let events = with_capacity(2);
        let e1 = Event::new("e", json!(1)).unwrap();
        let e2 = Event::new("e", json!(2)).unwrap();
        let e3 = Event::new("e", json!(3)).unwrap();

        events.publish(e1).unwrap();
        events.publish(e2.clone()).unwrap();
        events.publish(e3.clone()).unwrap();

        assert_eq!(events.get_history(None), vec![e2, e3.clone()]);
        assert_eq!(events.get_history(Some(1)), vec![e3]);
        assert_eq!(events.get_stats().history_evictions, 1);
    }

    #[test]
    fn test_history_round_trip_in_publish_order() {
        let events = with_capacity(10);
        let published: Vec<Event> = (0..7)
            .map(|n| Event::new("seq", json!(n)).unwrap())
            .collect();

        for event in &published {
            events.publish(event.clone()).unwrap();
        }

        assert_eq!(events.get_history(None), published);
    }

    #[test]
    fn test_history_never_exceeds_capacity() {
        let events = with_capacity(5);
        for n in 0..50 {
            events.emit("load", json!(n)).unwrap();
            assert!(events.get_history(None).len() <= 5);
        }
        let last: Vec<i64> = events
            .get_history(None)
            .iter()
            .map(|e| e.data().as_i64().unwrap())
            .collect();
        assert_eq!(last, [45, 46, 47, 48, 49]);
        assert!(events.validate().is_empty());
    }

    #[test]
    fn test_history_snapshot_is_a_copy() {
        let events = EventSystem::new();
        events.emit("a", json!(null)).unwrap();

        let mut snapshot = events.get_history(None);
        snapshot.clear();
        snapshot.push(Event::new("forged", json!(null)).unwrap());

        let history = events.get_history(None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type(), "a");

        events.clear_history();
        assert!(events.get_history(None).is_empty());
    }

    #[test]
    fn test_failing_handler_does_not_stop_dispatch() {
        let events = EventSystem::new();
        let log = call_log();
        events
            .on("order.created", |_: &Event| {
                Err(EventError::HandlerExecution("inventory offline".to_string()))
            })
            .unwrap();
        record_into(&events, "order.created", "B", &log);

        let report = events.emit("order.created", json!({"id": 9})).unwrap();

        assert_eq!(calls(&log), ["B"]);
        assert_eq!(report.handlers_invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(
            report.failures[0].kind,
            FailureKind::Error("Handler execution error: inventory offline".to_string())
        );
        assert_eq!(events.get_history(None).len(), 1);

        // Later publishes are unaffected
        let report = events.emit("order.created", json!({"id": 10})).unwrap();
        assert_eq!(calls(&log), ["B", "B"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(events.get_stats().handler_failures, 2);
        info!("✅ Error isolation test passed");
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let events = EventSystem::new();
        let log = call_log();
        events
            .on("job.run", |_: &Event| -> Result<(), EventError> {
                panic!("worker exploded");
            })
            .unwrap();
        record_into(&events, "job.run", "after", &log);
        record_into(&events, "*", "audit", &log);

        let report = events.emit("job.run", json!(null)).unwrap();

        assert_eq!(calls(&log), ["after", "audit"]);
        assert_eq!(report.failures[0].kind, FailureKind::Panic("worker exploded".to_string()));

        // The lock and registry survive the panic
        events.emit("job.run", json!(null)).unwrap();
        assert_eq!(events.subscriber_count(None), 3);
        assert_eq!(events.get_history(None).len(), 2);
    }

    #[test]
    fn test_uncaught_panic_leaves_bus_usable() {
        let events = EventSystem::with_config(EventSystemConfig {
            catch_panics: false,
            ..EventSystemConfig::default()
        });
        let log = call_log();
        events
            .on("job.run", |_: &Event| -> Result<(), EventError> {
                panic!("worker exploded");
            })
            .unwrap();
        record_into(&events, "job.run", "after", &log);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| events.emit("job.run", json!(null))));
        assert!(outcome.is_err());

        // The unwound event never reached the later handler or the history
        assert!(calls(&log).is_empty());
        assert!(events.get_history(None).is_empty());
        assert_eq!(events.get_stats().events_published, 0);

        // The lock was released on unwind
        record_into(&events, "job.done", "done", &log);
        events.emit("job.done", json!({"ok": true})).unwrap();
        assert_eq!(calls(&log), ["done"]);
        assert_eq!(events.subscriber_count(None), 3);

        let history = events.get_history(None);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event_type(), "job.done");
    }

    #[test]
    fn test_panicking_reporter_does_not_stop_dispatch() {
        let reporter = |failure: &HandlerFailure| {
            if !failure.handler_name.is_empty() {
                panic!("reporter offline");
            }
        };
        let events = EventSystem::new().with_error_reporter(Arc::new(reporter));
        let log = call_log();
        events
            .on("sync", |_: &Event| Err(EventError::HandlerExecution("timeout".to_string())))
            .unwrap();
        record_into(&events, "sync", "after", &log);
        record_into(&events, "*", "audit", &log);

        let report = events.emit("sync", json!(null)).unwrap();

        assert_eq!(calls(&log), ["after", "audit"]);
        assert_eq!(report.handlers_invoked, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Error("Handler execution error: timeout".to_string()));
        assert_eq!(events.get_history(None).len(), 1);
    }

    #[test]
    fn test_raise_policy_returns_aggregate_after_full_dispatch() {
        let events = EventSystem::with_config(
            EventSystemConfig::default().with_error_policy(ErrorPolicy::Raise),
        );
        let log = call_log();
        events
            .on("payment", |_: &Event| Err(EventError::HandlerExecution("declined".to_string())))
            .unwrap();
        record_into(&events, "payment", "ledger", &log);
        events
            .on_any(|_: &Event| Err(EventError::HandlerExecution("audit down".to_string())))
            .unwrap();

        let err = events.emit("payment", json!({"amount": 5})).unwrap_err();
        match err {
            EventError::HandlerFailed { event_type, failures } => {
                assert_eq!(event_type, "payment");
                assert_eq!(failures.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls(&log), ["ledger"]);
        assert_eq!(events.get_history(None).len(), 1);

        // A clean publish is still Ok under the raise policy
        events.remove_handlers("payment");
        events.remove_handlers("*");
        assert!(events.emit("payment", json!({})).is_ok());
    }

    #[test]
    fn test_error_reporter_receives_failures() {
        let reporter = Arc::new(CollectingReporter::new());
        let events = EventSystem::new().with_error_reporter(reporter.clone());
        events
            .on("sync", |_: &Event| Err(EventError::HandlerExecution("timeout".to_string())))
            .unwrap();
        events.on("sync", |_: &Event| Ok(())).unwrap();

        events.emit("sync", json!(null)).unwrap();
        events.emit("sync", json!(null)).unwrap();

        let failures = reporter.take();
        assert_eq!(failures.len(), 2);
        assert!(failures.iter().all(|f| f.event_type == "sync"));
        assert!(reporter.failures().is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let events = EventSystem::new();
        let log = call_log();
        let log_clone = log.clone();
        let removed = events
            .on("chat", move |_: &Event| {
                log_clone.lock().unwrap().push("removed".to_string());
                Ok(())
            })
            .unwrap();
        record_into(&events, "chat", "kept", &log);

        events.unsubscribe(removed).unwrap();
        events.emit("chat", json!("hi")).unwrap();

        assert_eq!(calls(&log), ["kept"]);
        assert_eq!(events.subscriber_count(Some("chat")), 1);
    }

    #[test]
    fn test_unsubscribe_unknown_id_is_an_error() {
        let events = EventSystem::new();
        let log = call_log();
        record_into(&events, "chat", "kept", &log);
        let id = events.on("chat", |_: &Event| Ok(())).unwrap();

        events.unsubscribe(id).unwrap();
        let again = events.unsubscribe(id);
        assert!(matches!(again, Err(EventError::UnknownSubscription(missing)) if missing == id));

        let never = crate::types::SubscriptionId::new();
        assert!(matches!(events.unsubscribe(never), Err(EventError::UnknownSubscription(_))));

        events.emit("chat", json!(null)).unwrap();
        assert_eq!(calls(&log), ["kept"]);
    }

    #[test]
    fn test_subscriber_queries() {
        let events = EventSystem::new();
        events.on("a", |_: &Event| Ok(())).unwrap();
        events.on("a", |_: &Event| Ok(())).unwrap();
        events.on("b", |_: &Event| Ok(())).unwrap();

        assert_eq!(events.subscriber_count(Some("a")), 2);
        assert_eq!(events.subscriber_count(Some("b")), 1);
        assert_eq!(events.subscriber_count(Some("c")), 0);
        assert_eq!(events.subscriber_count(None), 3);
        assert!(events.has_subscribers("a"));
        assert!(!events.has_subscribers("c"));

        let wildcard = events.on_any(|_: &Event| Ok(())).unwrap();
        assert_eq!(events.subscriber_count(Some("*")), 1);
        assert_eq!(events.subscriber_count(None), 4);
        assert!(events.has_subscribers("c"));
        assert_eq!(events.registered_event_types(), ["a", "b"]);

        events.unsubscribe(wildcard).unwrap();
        assert!(!events.has_subscribers("c"));

        let stats = events.get_stats();
        assert_eq!(stats.total_handlers, 3);
        assert_eq!(stats.wildcard_handlers, 0);
    }

    #[test]
    fn test_handler_removal() {
        let events = EventSystem::new();
        events.on("test1", |_: &Event| Ok(())).unwrap();
        events.on("test1", |_: &Event| Ok(())).unwrap();
        events.on("test2", |_: &Event| Ok(())).unwrap();

        assert_eq!(events.remove_handlers("test1"), 2);
        assert_eq!(events.remove_handlers("test1"), 0);
        assert_eq!(events.get_stats().total_handlers, 1);
    }

    #[test]
    fn test_invalid_subscriptions_rejected() {
        let events = EventSystem::new();
        assert!(matches!(
            events.on("", |_: &Event| Ok(())),
            Err(EventError::InvalidEvent(_))
        ));
        assert!(matches!(
            events.on("two words", |_: &Event| Ok(())),
            Err(EventError::InvalidEvent(_))
        ));
        assert_eq!(events.subscriber_count(None), 0);
    }

    #[test]
    fn test_publish_rejects_malformed_deserialized_event() {
        let events = EventSystem::new();
        let log = call_log();
        record_into(&events, "*", "wildcard", &log);

        let forged: Event = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "",
            "data": null,
            "timestamp": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(matches!(events.publish(forged), Err(EventError::InvalidEvent(_))));
        assert!(calls(&log).is_empty());
        assert!(events.get_history(None).is_empty());
        assert_eq!(events.get_stats().events_published, 0);
    }

    #[test]
    fn test_handler_can_publish_reentrantly() {
        let events = Arc::new(EventSystem::new());
        let log = call_log();
        let inner_events = events.clone();
        events
            .on("order.created", move |event: &Event| {
                inner_events
                    .emit("invoice.requested", event.data().clone())
                    .map(|_| ())
            })
            .unwrap();
        record_into(&events, "invoice.requested", "invoicer", &log);

        events.emit("order.created", json!({"id": 3})).unwrap();

        assert_eq!(calls(&log), ["invoicer"]);
        let types: Vec<String> = events
            .get_history(None)
            .iter()
            .map(|e| e.event_type().to_string())
            .collect();
        assert_eq!(types, ["invoice.requested", "order.created"]);
    }

    #[test]
    fn test_subscribe_during_dispatch_applies_to_next_publish() {
        let events = Arc::new(EventSystem::new());
        let log = call_log();
        let inner_events = events.clone();
        let inner_log = log.clone();
        events
            .on("boot", move |_: &Event| {
                inner_log.lock().unwrap().push("boot".to_string());
                let late_log = inner_log.clone();
                inner_events.on("boot", move |_: &Event| {
                    late_log.lock().unwrap().push("late".to_string());
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();

        events.emit("boot", json!(null)).unwrap();
        assert_eq!(calls(&log), ["boot"]);

        events.emit("boot", json!(null)).unwrap();
        assert_eq!(calls(&log), ["boot", "boot", "late"]);
    }

    #[test]
    fn test_concurrent_publishers() {
        let events = Arc::new(with_capacity(64));
        let count = Arc::new(Mutex::new(0u64));
        let count_clone = count.clone();
        events
            .on_any(move |_: &Event| {
                *count_clone.lock().unwrap() += 1;
                Ok(())
            })
            .unwrap();

        let workers: Vec<_> = (0..4)
            .map(|worker| {
                let events = events.clone();
                thread::spawn(move || {
                    for n in 0..100 {
                        events.emit("work", json!({"worker": worker, "n": n})).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(*count.lock().unwrap(), 400);
        let stats = events.get_stats();
        assert_eq!(stats.events_published, 400);
        assert_eq!(stats.handler_invocations, 400);
        assert_eq!(stats.history_len, 64);
        assert_eq!(stats.history_evictions, 336);
    }

    #[test]
    fn test_zero_capacity_history() {
        let events = with_capacity(0);
        events.emit("a", json!(null)).unwrap();
        assert!(events.get_history(None).is_empty());
        assert_eq!(events.get_stats().events_published, 1);
    }
}
