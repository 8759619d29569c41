//! Event Module - audit trail of a pipeline run
//!
//! Key types:
//! - `Event`: Envelope with id + timestamp + kind
//! - `EventKind`: run-level, task-level and fine-grained (template/provider) events
//! - `EventLog`: Thread-safe, append-only log

mod log;

// Re-export all public types
pub use log::{Event, EventKind, EventLog};
