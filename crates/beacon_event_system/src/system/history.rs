/// Bounded, FIFO-evicting record of published events
use crate::events::Event;
use std::collections::VecDeque;

// Upper bound on the up-front allocation; larger histories grow on demand.
const MAX_PREALLOCATED: usize = 1024;

pub(super) struct EventHistory {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventHistory {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(MAX_PREALLOCATED)),
            capacity,
        }
    }

    /// Appends an event, evicting the oldest entry first when full.
    ///
    /// Returns the evicted event, if any. With a capacity of zero nothing is retained.
    pub(super) fn record(&mut self, event: Event) -> Option<Event> {
        if self.capacity == 0 {
            return None;
        }
        let evicted = if self.events.len() >= self.capacity {
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    /// Copy of the history, oldest first, limited to the `limit` most recent entries.
    pub(super) fn snapshot(&self, limit: Option<usize>) -> Vec<Event> {
        let skip = match limit {
            Some(limit) => self.events.len().saturating_sub(limit),
            None => 0,
        };
        self.events.iter().skip(skip).cloned().collect()
    }

    pub(super) fn clear(&mut self) {
        self.events.clear();
    }

    pub(super) fn len(&self) -> usize {
        self.events.len()
    }

    pub(super) fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(n: u64) -> Event {
        Event::new("tick", json!({ "n": n })).unwrap()
    }

    fn sequence(events: &[Event]) -> Vec<u64> {
        events.iter().map(|e| e.data()["n"].as_u64().unwrap()).collect()
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = EventHistory::new(2);
        assert!(history.record(event(1)).is_none());
        assert!(history.record(event(2)).is_none());

        let evicted = history.record(event(3)).unwrap();
        assert_eq!(evicted.data()["n"], json!(1));
        assert_eq!(sequence(&history.snapshot(None)), [2, 3]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_snapshot_limit_keeps_most_recent() {
        let mut history = EventHistory::new(10);
        for n in 1..=5 {
            history.record(event(n));
        }
        assert_eq!(sequence(&history.snapshot(Some(2))), [4, 5]);
        assert_eq!(sequence(&history.snapshot(Some(50))), [1, 2, 3, 4, 5]);
        assert!(history.snapshot(Some(0)).is_empty());
    }

    #[test]
    fn test_zero_capacity_disables_history() {
        let mut history = EventHistory::new(0);
        assert!(history.record(event(1)).is_none());
        assert_eq!(history.len(), 0);
        assert_eq!(history.capacity(), 0);
    }

    #[test]
    fn test_clear() {
        let mut history = EventHistory::new(3);
        history.record(event(1));
        history.clear();
        assert!(history.snapshot(None).is_empty());
    }
}
