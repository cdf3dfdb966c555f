//! # Beacon - Main Entry Point
//!
//! Replays a JSON-lines event script through the Beacon event bus.
//! See the `lib_beacon` crate documentation for usage.

fn main() {
    std::process::exit(lib_beacon::init());
}
