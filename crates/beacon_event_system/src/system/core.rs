/// Core EventSystem implementation
use crate::config::EventSystemConfig;
use super::history::EventHistory;
use super::registry::SubscriptionRegistry;
use super::reporter::ErrorReporter;
use super::stats::EventSystemStats;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::sync::Arc;
use tracing::info;

/// Mutable state guarded by the system lock.
pub(super) struct BusState {
    pub(super) registry: SubscriptionRegistry,
    pub(super) history: EventHistory,
    pub(super) stats: EventSystemStats,
}

/// The event bus: subscription registry, bounded history and the dispatch engine.
///
/// All state sits behind a single re-entrant lock held for the whole of every
/// subscribe, unsubscribe, publish and query. Dispatch order and history order
/// therefore match real invocation order even with several publishing threads,
/// while a handler can still publish or (un)subscribe on the same bus from inside
/// dispatch. The `RefCell` is never borrowed while a handler runs.
pub struct EventSystem {
    pub(super) state: ReentrantMutex<RefCell<BusState>>,
    pub(super) config: EventSystemConfig,
    pub(super) error_reporter: Option<Arc<dyn ErrorReporter>>,
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem")
            .field("state", &"[state]")
            .field("config", &self.config)
            .field("error_reporter", &self.error_reporter.is_some())
            .finish()
    }
}

impl EventSystem {
    /// Creates a new event system with default configuration and no handlers.
    pub fn new() -> Self {
        Self::with_config(EventSystemConfig::default())
    }

    /// Creates a new event system with the given configuration.
    pub fn with_config(config: EventSystemConfig) -> Self {
        info!(
            "🔧 Event system created (history capacity: {}, error policy: {:?})",
            config.history_capacity, config.error_policy
        );
        Self {
            state: ReentrantMutex::new(RefCell::new(BusState {
                registry: SubscriptionRegistry::new(),
                history: EventHistory::new(config.history_capacity),
                stats: EventSystemStats::default(),
            })),
            config,
            error_reporter: None,
        }
    }

    /// Sets the reporter that receives every handler failure
    pub fn set_error_reporter(&mut self, reporter: Arc<dyn ErrorReporter>) {
        self.error_reporter = Some(reporter);
    }

    /// Builder form of [`set_error_reporter`](Self::set_error_reporter)
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = Some(reporter);
        self
    }

    /// Configuration this system was built with
    #[inline]
    pub fn config(&self) -> &EventSystemConfig {
        &self.config
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
