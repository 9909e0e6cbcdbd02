//! # Run a single invocation of a subscribed task.
//!
//! Executes one invocation of a [`Task`](crate::Task) on behalf of a round and
//! publishes lifecycle events to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   task.run() → Ok(())   → clear in-flight → publish TaskCompleted
//!
//! Failure:
//!   task.run() → Err(e)   → clear in-flight → publish TaskFailed
//!
//! Panic:
//!   task.run() → unwind   → clear in-flight → publish TaskPanicked
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event after `TaskStarting`
//! - The in-flight flag is cleared **before** the terminal event is published,
//!   so an observer reacting to it can immediately trigger a new round
//! - Nothing escapes: errors and panics end here

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::{
    events::{Bus, Event, EventKind, TickSource},
    observers::panic_message,
};

use super::subscription::InFlight;

/// Per-round context shared by every invocation the round spawns.
#[derive(Clone)]
pub(crate) struct RoundCtx {
    pub(crate) bus: Bus,
    pub(crate) scheduler: Arc<str>,
    pub(crate) source: TickSource,
}

impl RoundCtx {
    fn event(&self, kind: EventKind, guard: &InFlight) -> Event {
        let slot = guard.slot();
        Event::new(kind)
            .with_scheduler(Arc::clone(&self.scheduler))
            .with_task(Arc::clone(&slot.name))
            .with_subscription(slot.id)
            .with_source(self.source)
    }
}

/// Runs the task owned by `guard` once and reports the outcome.
pub(crate) async fn run_once(guard: InFlight, ctx: RoundCtx) {
    ctx.bus.publish(ctx.event(EventKind::TaskStarting, &guard));

    let task = Arc::clone(&guard.slot().task);
    let res = AssertUnwindSafe(task.run()).catch_unwind().await;

    let done = match res {
        Ok(Ok(())) => ctx.event(EventKind::TaskCompleted, &guard),
        Ok(Err(e)) => ctx
            .event(EventKind::TaskFailed, &guard)
            .with_reason(e.to_string()),
        Err(panic_err) => {
            let info = panic_message(panic_err.as_ref());
            tracing::error!(
                scheduler = %ctx.scheduler,
                task = %guard.slot().name,
                %info,
                "task panicked"
            );
            ctx.event(EventKind::TaskPanicked, &guard).with_reason(info)
        }
    };

    drop(guard);
    ctx.bus.publish(done);
}
