//! Configuration management for the Beacon replay tool.
//!
//! This module handles loading, validation, and conversion of configuration
//! from TOML files and command-line arguments.

use beacon_event_system::{validate_event_type, EventSystemConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Event bus settings, handed to the event system unchanged
    #[serde(default)]
    pub bus: EventSystemConfig,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Built-in subscribers registered before replay
    #[serde(default)]
    pub subscribers: SubscriberSettings,
}

/// Logging system configuration.
///
/// Controls log output format and level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

fn default_activity_log() -> bool {
    true
}

/// Subscribers the application wires onto the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberSettings {
    /// Register a wildcard subscriber that logs every event
    #[serde(default = "default_activity_log")]
    pub activity_log: bool,
    /// Per-type subscribers that log a fixed message
    #[serde(default)]
    pub routes: Vec<RouteSettings>,
    /// Event types whose subscriber always fails, to exercise error isolation
    #[serde(default)]
    pub fail_types: Vec<String>,
}

impl Default for SubscriberSettings {
    fn default() -> Self {
        Self {
            activity_log: default_activity_log(),
            routes: Vec::new(),
            fail_types: Vec::new(),
        }
    }
}

/// A subscriber that logs `message` whenever `event_type` is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSettings {
    /// Event type to subscribe to (`*` for every event)
    pub event_type: String,
    /// Message logged on each delivery
    pub message: String,
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the specified path
    /// and returns the default configuration.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            std::fs::write(path, toml_content)?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Validates the configuration settings.
    pub fn validate(&self) -> Result<(), String> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        for route in &self.subscribers.routes {
            if route.event_type != beacon_event_system::WILDCARD {
                validate_event_type(&route.event_type)
                    .map_err(|e| format!("Invalid route '{}': {e}", route.event_type))?;
            }
        }

        for event_type in &self.subscribers.fail_types {
            validate_event_type(event_type)
                .map_err(|e| format!("Invalid fail type '{event_type}': {e}"))?;
        }

        Ok(())
    }
}
