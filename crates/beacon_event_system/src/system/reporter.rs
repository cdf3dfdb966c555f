/// Error reporting hook for handler failures
use crate::events::HandlerFailure;

/// Receives every handler failure captured during dispatch.
///
/// Installed with [`EventSystem::set_error_reporter`](super::EventSystem::set_error_reporter).
/// It runs on the publishing thread right after the failing handler, before the
/// next handler is invoked. Closures taking `&HandlerFailure` implement it directly.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &HandlerFailure);
}

impl<F> ErrorReporter for F
where
    F: Fn(&HandlerFailure) + Send + Sync,
{
    fn report(&self, failure: &HandlerFailure) {
        self(failure)
    }
}

/// Reporter that keeps every failure in memory, for tests and debug tooling.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: parking_lot::Mutex<Vec<HandlerFailure>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, oldest first
    pub fn failures(&self) -> Vec<HandlerFailure> {
        self.failures.lock().clone()
    }

    /// Removes and returns all collected failures.
    pub fn take(&self) -> Vec<HandlerFailure> {
        std::mem::take(&mut *self.failures.lock())
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, failure: &HandlerFailure) {
        self.failures.lock().push(failure.clone());
    }
}
