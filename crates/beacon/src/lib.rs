//! # Beacon
//!
//! Command-line front end for the Beacon Event System. It loads a TOML
//! configuration, sets up logging, registers built-in subscribers and replays a
//! JSON-lines event script through the bus, printing a JSON report on stdout.
//!
//! ## Quick Start
//!
//! ```bash
//! # Replay a script with the default configuration (beacon.toml is created if missing)
//! beacon --events events.jsonl
//!
//! # Pipe events in, keep only the last 10 in the report, debug logs as JSON
//! cat events.jsonl | beacon --history-limit 10 --log-level debug --json-logs
//!
//! # Abort at the first event whose handlers fail
//! beacon --events events.jsonl --raise-errors
//! ```
//!
//! ## Exit Codes
//!
//! * **0**: Replay finished
//! * **1**: Error during startup or configuration, or the replay was aborted

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod script;
pub mod subscribers;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Runs the complete application lifecycle and returns the process exit code.
///
/// 1. Command-line argument parsing
/// 2. Configuration loading and logging initialization
/// 3. Application creation and replay
/// 4. Report output
pub fn init() -> i32 {
    let args = CliArgs::parse();

    // Logging needs the configured level before the application loads anything else.
    let mut logging_settings = AppConfig::load_from_file(&args.config_path)
        .unwrap_or_default()
        .logging;
    if let Some(level) = &args.log_level {
        logging_settings.level = level.clone();
    }
    if let Err(e) = logging::setup_logging(&logging_settings, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        return 1;
    }

    let app = match Application::new(args) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("❌ Failed to start application: {e:#}");
            return 1;
        }
    };

    match app.run() {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                if report.aborted {
                    1
                } else {
                    0
                }
            }
            Err(e) => {
                tracing::error!("❌ Failed to serialize report: {e}");
                1
            }
        },
        Err(e) => {
            tracing::error!("❌ Application error: {e:#}");
            1
        }
    }
}

// Re-export main types for potential library usage
pub use config::{LoggingSettings, RouteSettings, SubscriberSettings};
