//! # Repeating timer loop.
//!
//! One loop per armed scheduler. The loop only holds a weak reference to the
//! scheduler state, so dropping every [`Scheduler`](crate::Scheduler) handle
//! ends it at the next tick at the latest (and immediately, through the
//! lifetime token).
//!
//! ```text
//! arm() ──► spawn loop ──► interval_at(now + interval, interval)
//!                  │
//!          ┌───────┴─────────────────────────┐
//!          ▼                                 ▼
//!   token.cancelled() → exit      ticker.tick() → shared.run_round(Timer)
//! ```
//!
//! ## Rules
//! - The first tick fires one full interval after arming.
//! - Missed ticks are delayed, not bursted.
//! - Cancellation wins over a simultaneously ready tick.

use std::sync::{Arc, Weak};

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::TickSource;

use super::scheduler::Shared;

/// Spawns the timer loop for `shared`, stopped by `token`.
pub(crate) fn arm(shared: &Arc<Shared>, token: CancellationToken) {
    let weak: Weak<Shared> = Arc::downgrade(shared);
    let interval = shared.interval;
    let start = Instant::now() + interval;

    shared.rt.spawn(async move {
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(shared) = weak.upgrade() else { break };
                    shared.run_round(TickSource::Timer);
                }
            }
        }
    });
}
