/// Event system module - broken down into manageable components
mod core;
mod emitters;
mod handlers;
mod history;
mod management;
mod registry;
mod reporter;
mod stats;
mod tests;

// Re-export all public items from submodules
pub use core::EventSystem;
pub use emitters::PublishReport;
pub use registry::SubscriptionInfo;
pub use reporter::{CollectingReporter, ErrorReporter};
pub use stats::EventSystemStats;
