//! Observability subsystem for objindex
//!
//! - Structured logging (JSON lines)
//! - Counters
//! - Typed lifecycle and outcome events
//!
//! # Usage
//!
//! ```ignore
//! use objindex::observability::{Event, Logger, MetricsRegistry};
//!
//! Logger::info(Event::IndexCommitted.as_str(), &[("object_key", "a/b.txt")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_entries_indexed();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
