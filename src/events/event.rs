//! # Scheduler events.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Timer events**: the repeating timer starting and stopping
//! - **Round events**: a tick or immediate-trigger starting an invocation round
//! - **Subscription events**: tasks attaching to and detaching from a scheduler
//! - **Task events**: one invocation starting, being skipped, completing or failing
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! scheduler and task names, the subscription id and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use pollvisor::{Event, EventKind, TickSource};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_scheduler("clusters")
//!     .with_task("get-clusters")
//!     .with_subscription(3)
//!     .with_source(TickSource::Timer)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("get-clusters"));
//! assert_eq!(ev.subscription, Some(3));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What started an invocation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSource {
    /// The repeating timer fired.
    Timer,
    /// `schedule_immediate` was called.
    Immediate,
}

impl TickSource {
    /// Short stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TickSource::Timer => "timer",
            TickSource::Immediate => "immediate",
        }
    }
}

impl fmt::Display for TickSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of scheduler events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Observer events ===
    /// Observer panicked during event processing.
    ///
    /// Sets:
    /// - `task`: observer name
    /// - `reason`: panic info/message
    ObserverPanicked,

    /// Observer dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: observer name
    /// - `reason`: reason string (e.g., "full", "closed")
    ObserverOverflow,

    // === Timer events ===
    /// The repeating timer was armed.
    ///
    /// Sets:
    /// - `scheduler`: scheduler name
    /// - `interval_ms`: timer period (ms)
    TimerStarted,

    /// The repeating timer was cancelled.
    ///
    /// Sets:
    /// - `scheduler`: scheduler name
    TimerStopped,

    // === Round events ===
    /// An invocation round started.
    ///
    /// Sets:
    /// - `scheduler`: scheduler name
    /// - `source`: timer tick or immediate-trigger
    /// - `count`: number of subscriptions in the round snapshot
    RoundStarted,

    // === Subscription events ===
    /// A task was attached to the scheduler.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`
    Subscribed,

    /// A task was detached from the scheduler.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`
    Unsubscribed,

    // === Task events ===
    /// An invocation is starting.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`, `source`
    TaskStarting,

    /// The subscription was skipped because its previous invocation is still in flight.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`, `source`
    TaskSkipped,

    /// An invocation resolved successfully.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`, `source`
    TaskCompleted,

    /// An invocation resolved with an error.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`, `source`
    /// - `reason`: failure message
    TaskFailed,

    /// An invocation panicked; the panic was contained.
    ///
    /// Sets:
    /// - `scheduler`, `task`, `subscription`, `source`
    /// - `reason`: panic payload, when it is a string
    TaskPanicked,
}

/// Scheduler event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the scheduler that published the event.
    pub scheduler: Option<Arc<str>>,
    /// Name of the task (or observer, for observer events).
    pub task: Option<Arc<str>>,
    /// Per-scheduler subscription id.
    pub subscription: Option<u64>,
    /// What started the round this event belongs to.
    pub source: Option<TickSource>,
    /// Timer period in milliseconds (compact).
    pub interval_ms: Option<u32>,
    /// Number of subscriptions in a round snapshot.
    pub count: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            scheduler: None,
            task: None,
            subscription: None,
            source: None,
            interval_ms: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches the scheduler name.
    #[inline]
    pub fn with_scheduler(mut self, scheduler: impl Into<Arc<str>>) -> Self {
        self.scheduler = Some(scheduler.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a subscription id.
    #[inline]
    pub fn with_subscription(mut self, id: u64) -> Self {
        self.subscription = Some(id);
        self
    }

    /// Attaches the round source.
    #[inline]
    pub fn with_source(mut self, source: TickSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Attaches a timer interval (stored as milliseconds).
    #[inline]
    pub fn with_interval(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.interval_ms = Some(ms);
        self
    }

    /// Attaches a subscription count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates an observer overflow event.
    #[inline]
    pub fn observer_overflow(observer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ObserverOverflow)
            .with_task(observer)
            .with_reason(format!("observer={observer} reason={reason}"))
    }

    /// Creates an observer panic event.
    #[inline]
    pub fn observer_panicked(observer: &'static str, info: String) -> Self {
        Event::new(EventKind::ObserverPanicked)
            .with_task(observer)
            .with_reason(info)
    }

    /// True for events describing the end of an invocation.
    #[inline]
    pub fn is_task_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TaskCompleted | EventKind::TaskFailed | EventKind::TaskPanicked
        )
    }

    #[inline]
    pub fn is_observer_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ObserverOverflow | EventKind::ObserverPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::RoundStarted);
        let b = Event::new(EventKind::RoundStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_interval_saturates() {
        let ev = Event::new(EventKind::TimerStarted).with_interval(Duration::from_secs(u64::MAX));
        assert_eq!(ev.interval_ms, Some(u32::MAX));
    }

    #[test]
    fn test_terminal_classification() {
        assert!(Event::new(EventKind::TaskPanicked).is_task_terminal());
        assert!(!Event::new(EventKind::TaskSkipped).is_task_terminal());
        assert!(Event::observer_overflow("log", "full").is_observer_event());
    }
}
