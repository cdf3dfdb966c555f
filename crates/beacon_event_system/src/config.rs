//! # Event System Configuration
//!
//! Settings fixed when an [`EventSystem`](crate::EventSystem) is constructed.
//! All fields have serde defaults so a partial TOML/JSON table is enough.

use serde::{Deserialize, Serialize};

fn default_history_capacity() -> usize {
    100
}

fn default_catch_panics() -> bool {
    true
}

/// What `publish` does with handler failures once dispatch has finished.
///
/// Failures are always logged and always reach the error reporter if one is
/// installed. The policy only decides how they are handed back to the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Return `Ok(PublishReport)` listing the failures.
    #[default]
    Report,
    /// Return `Err(EventError::HandlerFailed)` when at least one handler failed.
    Raise,
}

/// Construction-time configuration for an event system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSystemConfig {
    /// Maximum number of published events kept in history. `0` disables history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// How handler failures are surfaced to the publisher
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Whether handler panics are caught and reported as failures
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,
}

impl Default for EventSystemConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            error_policy: ErrorPolicy::default(),
            catch_panics: default_catch_panics(),
        }
    }
}

impl EventSystemConfig {
    /// Returns a copy of this configuration with a different history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Returns a copy of this configuration with a different error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
}
