//! # Tracing-backed logging observer.
//!
//! [`LogWriter`] renders every scheduler event as a `tracing` record.
//!
//! ## Output (fmt subscriber)
//! ```text
//! INFO  pollvisor: timer started scheduler=clusters interval_ms=180000
//! DEBUG pollvisor: round started scheduler=clusters source=immediate count=1
//! DEBUG pollvisor: task starting scheduler=clusters task=get-clusters subscription=0
//! WARN  pollvisor: task failed scheduler=clusters task=get-clusters reason="execution failed: 503"
//! ```
//!
//! Enabled via the `logging` feature.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Structured logging observer.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let scheduler = e.scheduler.as_deref().unwrap_or("-");
        let task = e.task.as_deref().unwrap_or("-");
        let source = e.source.map(|s| s.as_str()).unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::TimerStarted => {
                tracing::info!(scheduler, interval_ms = ?e.interval_ms, "timer started");
            }
            EventKind::TimerStopped => {
                tracing::info!(scheduler, "timer stopped");
            }
            EventKind::RoundStarted => {
                tracing::debug!(scheduler, source, count = ?e.count, "round started");
            }
            EventKind::Subscribed => {
                tracing::debug!(scheduler, task, subscription = ?e.subscription, "subscribed");
            }
            EventKind::Unsubscribed => {
                tracing::debug!(scheduler, task, subscription = ?e.subscription, "unsubscribed");
            }
            EventKind::TaskStarting => {
                tracing::debug!(scheduler, task, subscription = ?e.subscription, source, "task starting");
            }
            EventKind::TaskSkipped => {
                tracing::debug!(scheduler, task, subscription = ?e.subscription, source, "task still in flight, skipped");
            }
            EventKind::TaskCompleted => {
                tracing::debug!(scheduler, task, subscription = ?e.subscription, "task completed");
            }
            EventKind::TaskFailed => {
                tracing::warn!(scheduler, task, reason, "task failed");
            }
            EventKind::TaskPanicked => {
                tracing::error!(scheduler, task, reason, "task panicked");
            }
            EventKind::ObserverOverflow => {
                tracing::warn!(observer = task, reason, "observer overflow");
            }
            EventKind::ObserverPanicked => {
                tracing::error!(observer = task, reason, "observer panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
