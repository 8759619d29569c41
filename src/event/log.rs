//! EventLog - append-only record of one pipeline run
//!
//! - Event: envelope with id + timestamp + kind
//! - EventKind: run, task and fine-grained (template/provider) events
//! - EventLog: thread-safe, append-only log; clones share storage

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single event in the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since the log was created (ms)
    pub timestamp_ms: u64,
    /// Event type and data
    pub kind: EventKind,
}

/// All event types
///
/// Uses Arc<str> for task_id fields to enable zero-cost cloning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // RUN LEVEL
    // ═══════════════════════════════════════════
    RunStarted {
        task_count: usize,
        /// Planned execution order
        order: Vec<Arc<str>>,
    },
    RunCompleted {
        terminal_task: Arc<str>,
        total_duration_ms: u64,
    },
    RunFailed {
        error: String,
        failed_task: Option<Arc<str>>,
    },

    // ═══════════════════════════════════════════
    // TASK LEVEL
    // ═══════════════════════════════════════════
    TaskScheduled {
        task_id: Arc<str>,
        dependencies: Vec<Arc<str>>,
    },
    TaskCompleted {
        task_id: Arc<str>,
        output: Value,
        duration_ms: u64,
    },
    TaskFailed {
        task_id: Arc<str>,
        error: String,
        /// Raw text, when the provider answered
        raw_text: Option<String>,
        duration_ms: u64,
    },

    // ═══════════════════════════════════════════
    // FINE-GRAINED (template/provider)
    // ═══════════════════════════════════════════
    TemplateResolved {
        task_id: Arc<str>,
        template: String,
        result: String,
    },
    ProviderCalled {
        task_id: Arc<str>,
        provider: String,
        model: String,
        temperature: f32,
        prompt_len: usize,
    },
}

impl EventKind {
    /// Extract task_id if event is task-related
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskScheduled { task_id, .. }
            | Self::TaskCompleted { task_id, .. }
            | Self::TaskFailed { task_id, .. }
            | Self::TemplateResolved { task_id, .. }
            | Self::ProviderCalled { task_id, .. } => Some(task_id),
            Self::RunStarted { .. } | Self::RunCompleted { .. } | Self::RunFailed { .. } => None,
        }
    }

    /// Check if this is a run-level event
    pub fn is_run_event(&self) -> bool {
        matches!(
            self,
            Self::RunStarted { .. } | Self::RunCompleted { .. } | Self::RunFailed { .. }
        )
    }
}

/// Thread-safe, append-only event log
#[derive(Clone)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        };

        self.events.write().push(event);
        id
    }

    /// Get all events (cloned)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Zero-copy access to events via callback
    ///
    /// Holds the read lock for the duration of the callback.
    pub fn with_events<T>(&self, f: impl FnOnce(&[Event]) -> T) -> T {
        f(&self.events.read())
    }

    /// Filter events by task ID
    pub fn filter_task(&self, task_id: &str) -> Vec<Event> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.kind.task_id() == Some(task_id))
                .cloned()
                .collect()
        })
    }

    /// Run-level events only
    pub fn run_events(&self) -> Vec<Event> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.kind.is_run_event())
                .cloned()
                .collect()
        })
    }

    /// Serialize to JSON for `--trace` output
    pub fn to_json(&self) -> Value {
        self.with_events(|events| serde_json::to_value(events).unwrap_or(Value::Null))
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_started(task_count: usize) -> EventKind {
        EventKind::RunStarted {
            task_count,
            order: (0..task_count).map(|i| Arc::from(format!("t{}", i))).collect(),
        }
    }

    fn scheduled(task_id: &str) -> EventKind {
        EventKind::TaskScheduled {
            task_id: task_id.into(),
            dependencies: vec![],
        }
    }

    // ═══════════════════════════════════════════════════════════════
    // EventKind tests
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn eventkind_task_id_extraction() {
        assert_eq!(scheduled("outline").task_id(), Some("outline"));
        assert_eq!(run_started(1).task_id(), None);
        assert!(run_started(1).is_run_event());
        assert!(!scheduled("x").is_run_event());
    }

    #[test]
    fn eventkind_serializes_with_type_tag() {
        let kind = EventKind::ProviderCalled {
            task_id: "scene_shaper".into(),
            provider: "mock".into(),
            model: "gpt-4".into(),
            temperature: 0.5,
            prompt_len: 42,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "provider_called");
        assert_eq!(json["task_id"], "scene_shaper");
        assert_eq!(json["prompt_len"], 42);
    }

    #[test]
    fn eventkind_deserializes_from_tagged_json() {
        let json = json!({
            "type": "task_failed",
            "task_id": "plot",
            "error": "[PLOT-060] Generated output is empty",
            "raw_text": "",
            "duration_ms": 3
        });
        let kind: EventKind = serde_json::from_value(json).unwrap();
        assert_eq!(kind.task_id(), Some("plot"));
    }

    // ═══════════════════════════════════════════════════════════════
    // EventLog tests
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn eventlog_new_starts_empty() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
    }

    #[test]
    fn eventlog_emit_returns_monotonic_ids() {
        let log = EventLog::new();
        assert_eq!(log.emit(run_started(2)), 0);
        assert_eq!(log.emit(scheduled("a")), 1);
        assert_eq!(log.emit(scheduled("b")), 2);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn eventlog_filter_task_and_run_events() {
        let log = EventLog::new();
        log.emit(run_started(2));
        log.emit(scheduled("alpha"));
        log.emit(scheduled("beta"));
        log.emit(EventKind::TaskCompleted {
            task_id: "alpha".into(),
            output: json!("result"),
            duration_ms: 100,
        });
        log.emit(EventKind::RunCompleted {
            terminal_task: "beta".into(),
            total_duration_ms: 120,
        });

        assert_eq!(log.filter_task("alpha").len(), 2);
        assert_eq!(log.filter_task("beta").len(), 1);
        assert_eq!(log.run_events().len(), 2);
    }

    #[test]
    fn eventlog_to_json() {
        let log = EventLog::new();
        log.emit(scheduled("task1"));

        let json = log.to_json();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["kind"]["type"], "task_scheduled");
    }

    #[test]
    fn eventlog_clones_share_storage() {
        let log = EventLog::new();
        log.emit(run_started(1));

        let cloned = log.clone();
        log.emit(scheduled("t1"));
        assert_eq!(cloned.len(), 2);
    }

    #[test]
    fn eventlog_thread_safe_concurrent_emits() {
        use std::thread;

        let log = EventLog::new();
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || log.emit(scheduled(&format!("task{}", i))))
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        let mut ids: Vec<u64> = log.events().iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
