//! Event script parsing.
//!
//! A script is JSON lines, one event per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! {"type": "order.created", "data": {"id": 1}, "source": "checkout"}
//! {"type": "order.shipped"}
//! ```
//!
//! Lines that are not valid JSON, or whose type is rejected by the event
//! system, are collected as [`Rejection`]s instead of aborting the replay.

use beacon_event_system::Event;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct ScriptLine {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    source: Option<String>,
}

/// A script line that could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// An event built from a script line.
#[derive(Debug, Clone)]
pub struct ScriptedEvent {
    pub line: usize,
    pub event: Event,
}

/// Parsed contents of a script, in file order.
#[derive(Debug, Default)]
pub struct Script {
    pub events: Vec<ScriptedEvent>,
    pub rejected: Vec<Rejection>,
}

/// Reads a whole script. Only I/O errors are fatal; lines that are not
/// UTF-8 are rejected like any other malformed line.
pub fn read_script<R: BufRead>(reader: R) -> std::io::Result<Script> {
    let mut script = Script::default();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_number = index + 1;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(e) => {
                reject(&mut script, line_number, format!("line is not valid UTF-8: {e}"));
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_line(trimmed) {
            Ok(event) => script.events.push(ScriptedEvent {
                line: line_number,
                event,
            }),
            Err(reason) => reject(&mut script, line_number, reason),
        }
    }

    Ok(script)
}

fn reject(script: &mut Script, line: usize, reason: String) {
    warn!("⚠️ Skipping script line {}: {}", line, reason);
    script.rejected.push(Rejection { line, reason });
}

fn parse_line(line: &str) -> Result<Event, String> {
    let parsed: ScriptLine = serde_json::from_str(line).map_err(|e| e.to_string())?;
    let event = Event::new(&parsed.event_type, parsed.data).map_err(|e| e.to_string())?;
    Ok(match parsed.source {
        Some(source) => event.with_source(&source),
        None => event,
    })
}
