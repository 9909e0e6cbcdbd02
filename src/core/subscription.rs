//! # Subscriptions and in-flight tracking.
//!
//! A [`Subscription`] binds one [`Task`](crate::Task) to one scheduler. The
//! scheduler keeps the shared [`Slot`]; the caller keeps the handle.
//!
//! ## Rules
//! - `in_flight` flips `false → true` with a compare-and-swap when a round
//!   claims the slot, and back to `false` when the invocation resolves.
//! - The flag is cleared by a drop guard ([`InFlight`]), so a panicking task or
//!   an invocation dropped by a shutting-down runtime never wedges the slot.
//! - Unsubscribing only detaches the slot from the scheduler; an invocation
//!   already running keeps its guard and finishes normally.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::tasks::TaskRef;

use super::scheduler::Shared;

/// Scheduler-side state of one subscription.
pub(crate) struct Slot {
    pub(crate) id: u64,
    pub(crate) name: Arc<str>,
    pub(crate) task: TaskRef,
    in_flight: AtomicBool,
}

impl Slot {
    pub(crate) fn new(id: u64, task: TaskRef) -> Self {
        Self {
            id,
            name: Arc::from(task.name()),
            task,
            in_flight: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof that a round owns the slot's single invocation permit.
///
/// Dropping the guard clears the in-flight flag.
pub(crate) struct InFlight {
    slot: Arc<Slot>,
}

impl InFlight {
    /// Claims the slot, or returns `None` if its previous invocation is still running.
    pub(crate) fn try_acquire(slot: &Arc<Slot>) -> Option<Self> {
        slot.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                slot: Arc::clone(slot),
            })
    }

    pub(crate) fn slot(&self) -> &Arc<Slot> {
        &self.slot
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.slot.in_flight.store(false, Ordering::Release);
    }
}

/// Handle returned by [`Scheduler::subscribe`](crate::Scheduler::subscribe).
///
/// Cloning the handle does not create a new subscription; all clones refer to
/// the same slot. Dropping the handle does **not** unsubscribe: detaching is
/// always explicit, like stopping the scheduler.
///
/// The handle holds only a weak reference to its scheduler, so it never keeps
/// a dropped scheduler (and its timer) alive.
#[derive(Clone)]
pub struct Subscription {
    slot: Arc<Slot>,
    scheduler: Weak<Shared>,
}

impl Subscription {
    pub(crate) fn new(slot: Arc<Slot>, scheduler: Weak<Shared>) -> Self {
        Self { slot, scheduler }
    }

    /// Per-scheduler id, unique for the scheduler's lifetime.
    pub fn id(&self) -> u64 {
        self.slot.id
    }

    /// Name of the bound task.
    pub fn name(&self) -> &str {
        &self.slot.name
    }

    /// The bound task.
    pub fn task(&self) -> &TaskRef {
        &self.slot.task
    }

    /// True while an invocation of the task started by this subscription is running.
    pub fn is_in_flight(&self) -> bool {
        self.slot.is_in_flight()
    }

    /// True while the subscription is still attached to a live scheduler.
    pub fn is_active(&self) -> bool {
        self.scheduler
            .upgrade()
            .is_some_and(|s| s.contains(self.slot.id))
    }

    /// Detaches the task from its scheduler.
    ///
    /// Idempotent: returns `true` only for the call that actually removed the
    /// subscription. An in-flight invocation is left to finish.
    pub fn unsubscribe(&self) -> bool {
        match self.scheduler.upgrade() {
            Some(shared) => shared.remove(self.slot.id),
            None => false,
        }
    }

    pub(crate) fn belongs_to(&self, shared: &Arc<Shared>) -> bool {
        std::ptr::eq(self.scheduler.as_ptr(), Arc::as_ptr(shared))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.slot.id)
            .field("task", &self.slot.name)
            .field("in_flight", &self.slot.is_in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskError, TaskFn};

    fn slot() -> Arc<Slot> {
        let task: TaskRef = TaskFn::arc("noop", || async { Ok::<_, TaskError>(()) });
        Arc::new(Slot::new(7, task))
    }

    #[test]
    fn test_single_permit() {
        let s = slot();
        let first = InFlight::try_acquire(&s);
        assert!(first.is_some());
        assert!(s.is_in_flight());
        assert!(InFlight::try_acquire(&s).is_none());

        drop(first);
        assert!(!s.is_in_flight());
        assert!(InFlight::try_acquire(&s).is_some());
    }

    #[test]
    fn test_orphan_handle_is_inert() {
        let sub = Subscription::new(slot(), Weak::new());
        assert!(!sub.is_active());
        assert!(!sub.unsubscribe());
        assert_eq!(sub.name(), "noop");
        assert_eq!(sub.id(), 7);
    }
}
