//! Observability for the pruning engine
//!
//! - Structured logging (JSON lines)
//! - Lock-free counters
//! - Typed events
//!
//! Observability is read-only: it never changes a pruning decision.
//!
//! # Usage
//!
//! ```ignore
//! use partition_pruner::observability::{log_event_with_fields, Event, Severity};
//!
//! log_event_with_fields(Severity::Trace, Event::ExtractPruned, &[("table", "orders")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a typed event with fields
pub fn log_event_with_fields(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
