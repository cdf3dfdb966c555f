//! Command-line interface handling for the Beacon replay tool.
//!
//! This module provides command-line argument parsing using the `clap` crate.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// Options here override the matching configuration file settings.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Event script to replay (`-` reads stdin)
    pub events_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional limit on the history included in the report
    pub history_limit: Option<usize>,
    /// Whether handler failures should abort the replay
    pub raise_errors: bool,
}

impl CliArgs {
    /// Builds the clap command definition.
    pub fn command() -> Command {
        Command::new("Beacon")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Replays a JSON-lines event script through an in-process event bus")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (a default file is written here if missing)")
                    .default_value("beacon.toml"),
            )
            .arg(
                Arg::new("events")
                    .short('e')
                    .long("events")
                    .value_name("FILE")
                    .help("Event script (JSON lines), or '-' for stdin")
                    .default_value("-"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("history-limit")
                    .long("history-limit")
                    .value_name("N")
                    .help("Only include the N most recent events in the report")
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("raise-errors")
                    .long("raise-errors")
                    .help("Stop the replay at the first event whose handlers fail")
                    .action(clap::ArgAction::SetTrue),
            )
    }

    /// Parses command line arguments from the process environment.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list, as used by tests.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        // Both paths carry defaults, so `get_one` only misses if the command definition changes.
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("beacon.toml")),
            events_path: matches
                .get_one::<String>("events")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("-")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            history_limit: matches.get_one::<usize>("history-limit").copied(),
            raise_errors: matches.get_flag("raise-errors"),
        }
    }
}
