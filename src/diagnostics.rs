//! Diagnostics sink shared by the components of one model evaluation.
//!
//! Each component receives a clone of the sink when it is constructed and
//! records structured events into it. Every event is also forwarded to the
//! `log` facade at the matching level.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Event severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
}

/// A single recorded event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub severity: Severity,
    pub component: String,
    pub message: String,
    pub value: Option<f64>,
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(v) => write!(f, "[{}] {} {}", self.component, self.message, v),
            None => write!(f, "[{}] {}", self.component, self.message),
        }
    }
}

/// Events kept by a sink before new ones are only forwarded to the log
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Cheaply clonable handle to an event collector.
///
/// Clones share the same event list. Independent trials should each build
/// their own sink with [`Diagnostics::new`]. The list holds at most
/// `capacity` events; later events still reach the log and are counted by
/// [`Diagnostics::dropped`]. Repeated evaluations should rewind the sink
/// with [`Diagnostics::mark`] and [`Diagnostics::truncate`].
#[derive(Clone, Debug)]
pub struct Diagnostics {
    events: Arc<Mutex<Vec<Event>>>,
    dropped: Arc<AtomicUsize>,
    capacity: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            dropped: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// A panic while recording leaves the list intact, so keep using it
    fn lock(&self) -> MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|poisoned| {
            log::warn!("diagnostics lock poisoned, recovering recorded events");
            poisoned.into_inner()
        })
    }

    /// Record an event and mirror it to the log
    pub fn record(&self, severity: Severity, component: &str, message: &str, value: Option<f64>) {
        let event = Event {
            severity,
            component: component.to_string(),
            message: message.to_string(),
            value,
        };

        match severity {
            Severity::Debug => log::debug!("{}", event),
            Severity::Info => log::info!("{}", event),
            Severity::Warning => log::warn!("{}", event),
        }

        let mut events = self.lock();
        if events.len() < self.capacity {
            events.push(event);
        } else if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
            log::warn!(
                "diagnostics sink full at {} events, further events are not kept",
                self.capacity
            );
        }
    }

    pub fn debug(&self, component: &str, message: &str) {
        self.record(Severity::Debug, component, message, None);
    }

    pub fn info(&self, component: &str, message: &str, value: f64) {
        self.record(Severity::Info, component, message, Some(value));
    }

    pub fn warn(&self, component: &str, message: &str) {
        self.record(Severity::Warning, component, message, None);
    }

    pub fn warn_value(&self, component: &str, message: &str, value: f64) {
        self.record(Severity::Warning, component, message, Some(value));
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Number of warnings recorded so far
    pub fn warning_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|ev| ev.severity == Severity::Warning)
            .count()
    }

    /// Warnings recorded for one component
    pub fn warnings_for(&self, component: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.severity == Severity::Warning && e.component == component)
            .collect()
    }

    /// Events that did not fit into the sink
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Position to rewind to with [`Diagnostics::truncate`]
    pub fn mark(&self) -> usize {
        self.lock().len()
    }

    /// Forget every event recorded after `mark`
    pub fn truncate(&self, mark: usize) {
        self.lock().truncate(mark);
        self.dropped.store(0, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.truncate(0);
    }
}
