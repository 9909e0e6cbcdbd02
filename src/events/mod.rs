//! Scheduler events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by a scheduler, its timer loop and the
//! task invocations it spawns.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`TickSource`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Scheduler` (subscribe/unsubscribe/stop), the timer loop,
//!   `runner::run_once` (task lifecycle), `ObserverSet` workers (overflow/panic).
//! - **Consumers**: the scheduler's observer listener, which fans out to
//!   [`ObserverSet`](crate::ObserverSet), plus anyone holding a receiver from
//!   [`Scheduler::events`](crate::Scheduler::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, TickSource};
