//! # Scheduler: one repeating timer shared by many periodic tasks.
//!
//! The [`Scheduler`] owns a set of subscriptions and at most one timer loop.
//! Every timer tick, and every [`Scheduler::schedule_immediate`] call, starts a
//! **round**: each attached subscription whose previous invocation has
//! finished gets its task invoked once.
//!
//! ## Architecture
//! ```text
//! subscribe(task) ──► slots (BTreeMap<id, Arc<Slot>>) ──► arm timer if stopped
//!
//! round(source):
//!   ├─► snapshot = slots.values()            (under the lock, atomic vs unsubscribe)
//!   ├─► publish RoundStarted{ source, count }
//!   └─► for slot in snapshot:
//!         ├─ in flight      ─► publish TaskSkipped
//!         └─ claimed guard  ─► spawn run_once(guard)      (never awaited here)
//!                                  ├─► TaskStarting
//!                                  ├─► task.run()
//!                                  └─► clear in-flight ─► TaskCompleted / TaskFailed / TaskPanicked
//! ```
//!
//! ## Rules
//! - At most one timer loop per scheduler.
//! - One subscription never has two invocations running.
//! - The snapshot taken at the start of a round is authoritative for that round.
//! - An empty scheduler keeps ticking; stopping is always explicit.
//! - `schedule_immediate` does not move the timer's phase.
//! - Locks are never held while user code runs.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{SchedulerFactory, TaskError, TaskFn, TaskRef};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = SchedulerFactory::default().create_scheduler(Duration::from_secs(180))?;
//!
//! let clusters: TaskRef = TaskFn::arc("clusters", || async move {
//!     // fetch clusters...
//!     Ok::<_, TaskError>(())
//! });
//!
//! let sub = scheduler.subscribe(clusters);
//! scheduler.schedule_immediate();
//!
//! // teardown
//! sub.unsubscribe();
//! scheduler.stop();
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::{
    config::SchedulerConfig,
    events::{Bus, Event, EventKind, TickSource},
    tasks::TaskRef,
};

use super::{
    builder::SchedulerBuilder,
    runner::{RoundCtx, run_once},
    subscription::{InFlight, Slot, Subscription},
    timer,
};

/// State shared by every handle of one scheduler, the timer loop and subscriptions.
///
/// Lock order: `slots` before `timer`; neither is held across user code.
pub(crate) struct Shared {
    pub(crate) name: Arc<str>,
    pub(crate) interval: Duration,
    pub(crate) bus: Bus,
    pub(crate) rt: Handle,
    slots: Mutex<BTreeMap<u64, Arc<Slot>>>,
    timer: Mutex<Option<CancellationToken>>,
    next_id: AtomicU64,
    /// Cancelled when the last scheduler handle goes away.
    lifetime: CancellationToken,
}

impl Shared {
    pub(crate) fn new(cfg: &SchedulerConfig, bus: Bus, rt: Handle, lifetime: CancellationToken) -> Self {
        Self {
            name: Arc::from(cfg.name.as_ref()),
            interval: cfg.interval,
            bus,
            rt,
            slots: Mutex::new(BTreeMap::new()),
            timer: Mutex::new(None),
            next_id: AtomicU64::new(0),
            lifetime,
        }
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.slots.lock().contains_key(&id)
    }

    /// Removes a slot; `false` if it was already gone.
    pub(crate) fn remove(&self, id: u64) -> bool {
        let removed = self.slots.lock().remove(&id);
        match removed {
            Some(slot) => {
                self.bus.publish(
                    Event::new(EventKind::Unsubscribed)
                        .with_scheduler(Arc::clone(&self.name))
                        .with_task(Arc::clone(&slot.name))
                        .with_subscription(id),
                );
                true
            }
            None => false,
        }
    }

    /// Starts one invocation round.
    pub(crate) fn run_round(&self, source: TickSource) {
        let snapshot: Vec<Arc<Slot>> = self.slots.lock().values().cloned().collect();
        if snapshot.is_empty() {
            return;
        }

        self.bus.publish(
            Event::new(EventKind::RoundStarted)
                .with_scheduler(Arc::clone(&self.name))
                .with_source(source)
                .with_count(snapshot.len()),
        );

        let ctx = RoundCtx {
            bus: self.bus.clone(),
            scheduler: Arc::clone(&self.name),
            source,
        };

        for slot in &snapshot {
            match InFlight::try_acquire(slot) {
                Some(guard) => {
                    self.rt.spawn(run_once(guard, ctx.clone()));
                }
                None => {
                    self.bus.publish(
                        Event::new(EventKind::TaskSkipped)
                            .with_scheduler(Arc::clone(&self.name))
                            .with_task(Arc::clone(&slot.name))
                            .with_subscription(slot.id)
                            .with_source(source),
                    );
                }
            }
        }
    }

    /// Arms the timer unless it is already running. Returns `true` if it was armed now.
    fn ensure_timer(self: &Arc<Self>) -> bool {
        let mut timer = self.timer.lock();
        if timer.is_some() {
            return false;
        }
        let token = self.lifetime.child_token();
        timer::arm(self, token.clone());
        *timer = Some(token);
        drop(timer);

        tracing::debug!(scheduler = %self.name, interval = ?self.interval, "timer armed");
        self.bus.publish(
            Event::new(EventKind::TimerStarted)
                .with_scheduler(Arc::clone(&self.name))
                .with_interval(self.interval),
        );
        true
    }

    fn stop_timer(&self) -> bool {
        let Some(token) = self.timer.lock().take() else {
            return false;
        };
        token.cancel();

        tracing::debug!(scheduler = %self.name, "timer stopped");
        self.bus.publish(
            Event::new(EventKind::TimerStopped).with_scheduler(Arc::clone(&self.name)),
        );
        true
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.lifetime.cancel();
    }
}

/// A polling scheduler: one repeating timer, many overlap-free subscriptions.
///
/// `Scheduler` is a cheap, cloneable handle. The timer stops when [`stop`](Self::stop)
/// is called or when the last handle is dropped. Subscriptions never keep a
/// scheduler alive.
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

impl Scheduler {
    /// Returns a builder for a scheduler configured by `cfg`.
    pub fn builder(cfg: SchedulerConfig) -> SchedulerBuilder {
        SchedulerBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Registers `task` for every future tick and every immediate round.
    ///
    /// Arms the timer if it is not running (first subscription, or first
    /// subscription after [`stop`](Self::stop)). The task is not invoked until the
    /// next round; call [`schedule_immediate`](Self::schedule_immediate) to run it now.
    pub fn subscribe(&self, task: TaskRef) -> Subscription {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let slot = Arc::new(Slot::new(id, task));
        self.shared.slots.lock().insert(id, Arc::clone(&slot));

        self.shared.bus.publish(
            Event::new(EventKind::Subscribed)
                .with_scheduler(Arc::clone(&self.shared.name))
                .with_task(Arc::clone(&slot.name))
                .with_subscription(id),
        );
        self.shared.ensure_timer();

        Subscription::new(slot, Arc::downgrade(&self.shared))
    }

    /// Detaches `subscription` from this scheduler.
    ///
    /// Idempotent. Returns `false` if the subscription was already removed or
    /// belongs to another scheduler.
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        if !subscription.belongs_to(&self.shared) {
            return false;
        }
        self.shared.remove(subscription.id())
    }

    /// Starts one round now for every subscription that is not in flight.
    ///
    /// Returns as soon as the invocations are spawned; it never waits for them.
    /// The timer keeps its original phase, so a regular tick may follow shortly.
    pub fn schedule_immediate(&self) {
        self.shared.run_round(TickSource::Immediate);
    }

    /// Cancels the repeating timer. In-flight invocations are not cancelled.
    ///
    /// Subscriptions stay attached; the next [`subscribe`](Self::subscribe) rearms
    /// the timer. Returns `true` if a running timer was stopped.
    pub fn stop(&self) -> bool {
        self.shared.stop_timer()
    }

    /// True while the repeating timer is armed.
    pub fn is_running(&self) -> bool {
        self.shared.timer.lock().is_some()
    }

    /// Timer period.
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Scheduler label.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Number of attached subscriptions.
    pub fn len(&self) -> usize {
        self.shared.slots.lock().len()
    }

    /// True if no subscription is attached.
    pub fn is_empty(&self) -> bool {
        self.shared.slots.lock().is_empty()
    }

    /// Handles for every attached subscription, in subscription order.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        let weak = Arc::downgrade(&self.shared);
        self.shared
            .slots
            .lock()
            .values()
            .map(|slot| Subscription::new(Arc::clone(slot), weak.clone()))
            .collect()
    }

    /// New receiver for this scheduler's events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.shared.name)
            .field("interval", &self.shared.interval)
            .field("subscriptions", &self.len())
            .field("running", &self.is_running())
            .finish()
    }
}
