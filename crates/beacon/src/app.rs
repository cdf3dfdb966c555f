//! Main application logic and lifecycle management.
//!
//! The `Application` loads configuration, builds the event bus, registers the
//! built-in subscribers and replays an event script through it.

use crate::{
    cli::CliArgs,
    config::AppConfig,
    script::{read_script, Rejection},
    subscribers::register_builtin_subscribers,
};
use anyhow::Context;
use beacon_event_system::{
    beacon_build_info, ErrorPolicy, Event, EventError, EventSystem, EventSystemStats,
    HandlerFailure,
};
use serde::Serialize;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{error, info, warn};

/// Everything the replay produced, printed as JSON on stdout.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    /// Events accepted by the bus
    pub published: usize,
    /// Script lines that never became events
    pub rejected: Vec<Rejection>,
    /// Handler failures across the whole replay, in order
    pub failures: Vec<HandlerFailure>,
    /// True when the replay stopped early because of the raise policy
    pub aborted: bool,
    pub stats: EventSystemStats,
    pub history: Vec<Event>,
}

/// Main application struct.
///
/// Owns the merged configuration and the event bus for the lifetime of one replay.
pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    /// Parsed command-line arguments
    args: CliArgs,
    /// Event bus with the built-in subscribers registered
    events: EventSystem,
}

impl Application {
    /// Creates a new application instance.
    ///
    /// # Process
    ///
    /// 1. Load configuration from file (creating default if missing)
    /// 2. Apply command-line argument overrides
    /// 3. Validate merged configuration
    /// 4. Build the event bus and register built-in subscribers
    pub fn new(args: CliArgs) -> anyhow::Result<Self> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let config = AppConfig::load_from_file(&args.config_path)
            .with_context(|| format!("failed to load {}", args.config_path.display()))?;

        Self::with_config(args, config)
    }

    /// Creates an application from an already loaded configuration.
    pub fn with_config(args: CliArgs, mut config: AppConfig) -> anyhow::Result<Self> {
        // Apply CLI overrides
        if let Some(log_level) = &args.log_level {
            config.logging.level = log_level.clone();
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if args.raise_errors {
            config.bus.error_policy = ErrorPolicy::Raise;
        }

        if let Err(e) = config.validate() {
            anyhow::bail!("Configuration validation failed: {e}");
        }
        info!("✅ Configuration loaded and validated successfully");

        let events = EventSystem::with_config(config.bus.clone());
        register_builtin_subscribers(&events, &config.subscribers)
            .context("failed to register built-in subscribers")?;

        Ok(Self { config, args, events })
    }

    /// Replays the script named on the command line (`-` reads stdin).
    pub fn run(&self) -> anyhow::Result<ReplayReport> {
        info!("🌟 {}", beacon_build_info());
        self.log_configuration_summary();

        let path = self.args.events_path.as_path();
        if path == Path::new("-") {
            let stdin = std::io::stdin();
            self.replay(stdin.lock())
        } else {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open event script {}", path.display()))?;
            self.replay(BufReader::new(file))
        }
    }

    /// Publishes every event of a script in order and collects the outcome.
    pub fn replay<R: BufRead>(&self, reader: R) -> anyhow::Result<ReplayReport> {
        let script = read_script(reader).context("failed to read event script")?;
        info!(
            "📜 Script parsed: {} events, {} rejected lines",
            script.events.len(),
            script.rejected.len()
        );

        let mut published = 0;
        let mut failures = Vec::new();
        let mut aborted = false;

        for scripted in script.events {
            match self.events.publish(scripted.event) {
                Ok(report) => {
                    published += 1;
                    failures.extend(report.failures);
                }
                Err(EventError::HandlerFailed { event_type, failures: raised }) => {
                    published += 1;
                    error!(
                        "❌ Stopping replay at line {}: {} handler(s) failed for '{}'",
                        scripted.line,
                        raised.len(),
                        event_type
                    );
                    failures.extend(raised);
                    aborted = true;
                    break;
                }
                Err(e) => return Err(e).context(format!("failed to publish line {}", scripted.line)),
            }
        }

        if !failures.is_empty() {
            warn!("⚠️ {} handler failure(s) during replay", failures.len());
        }

        let stats = self.events.get_stats();
        log_final_statistics(&stats);

        Ok(ReplayReport {
            published,
            rejected: script.rejected,
            failures,
            aborted,
            stats,
            history: self.events.get_history(self.args.history_limit),
        })
    }

    /// Access to the bus, mainly for embedding and tests
    pub fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Logs the configuration summary at startup.
    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  📚 History capacity: {}", self.config.bus.history_capacity);
        info!("  🚨 Error policy: {:?}", self.config.bus.error_policy);
        info!("  🛡️ Catch handler panics: {}", self.config.bus.catch_panics);
        info!("  📂 Events: {}", self.args.events_path.display());
    }
}

/// Logs final statistics after a replay.
fn log_final_statistics(stats: &EventSystemStats) {
    info!("📊 Final Statistics:");
    info!("  - Events published: {}", stats.events_published);
    info!("  - Handler invocations: {}", stats.handler_invocations);
    info!("  - Handler failures: {}", stats.handler_failures);
    info!("  - History: {} held, {} evicted", stats.history_len, stats.history_evictions);
}
