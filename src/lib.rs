//! # pollvisor
//!
//! **Pollvisor** is a small polling scheduler for Rust services and dashboards.
//!
//! Several independent features (a clusters view, an executions view, any
//! other periodic refresh) attach their async tasks to one shared
//! [`Scheduler`]. Every consumer can force an out-of-cycle refresh, detach
//! without disturbing the others, and never has two of its own refreshes
//! running at once, even when a refresh takes longer than the interval.
//!
//! Next to it lives a [`NotificationSink`]: a deduplicating, keyed list of
//! notifications observed by a single rendering surface.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │  (clusters)  │   │ (executions) │   │   (other)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ subscribe        ▼ subscribe        ▼ subscribe
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler (shared handle, built by SchedulerFactory)             │
//! │  - slots: id → Slot { task, in_flight }                           │
//! │  - timer: Option<CancellationToken> (one repeating loop)          │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────────────────┬─────────────────────┘
//!        │ tick / schedule_immediate            │ publish
//!        ▼                                      ▼
//!   round: snapshot slots               ┌────────────────────────┐
//!     ├─ in flight ─► TaskSkipped       │  Bus (broadcast)       │
//!     └─ claim ─► spawn run_once ──────►│                        │
//!                                       └───────────┬────────────┘
//!                                                   ▼
//!                                        observer listener ─► ObserverSet
//!                                                   ┌─────────┼─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter  custom    custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! create_scheduler(interval) ──► Scheduler (timer idle)
//!
//! subscribe(task)   ──► slot added, timer armed if idle
//! schedule_immediate ──► one round now, timer phase unchanged
//! every interval    ──► one round
//!   round:
//!     ├─► snapshot slots (atomic vs unsubscribe)
//!     └─► per slot:
//!           ├─ previous invocation running ─► skip
//!           └─ otherwise ─► run task once ─► Completed / Failed / Panicked
//! unsubscribe()     ──► slot removed, in-flight work left alone
//! stop()            ──► timer cancelled, subscriptions kept
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Scheduling**    | Shared timer, overlap-free subscriptions, immediate rounds.   | [`Scheduler`], [`Subscription`]             |
//! | **Construction**  | Independent schedulers per interval, optional observers.      | [`SchedulerFactory`], [`SchedulerBuilder`]  |
//! | **Tasks**         | Async work units as traits or closures.                       | [`Task`], [`TaskFn`], [`TaskRef`]           |
//! | **Refresh state** | Loading/error flags and latest data for a polled view.        | [`RefreshTracker`], [`RefreshState`]        |
//! | **Notifications** | Keyed, deduplicated, observable notification list.            | [`NotificationSink`], [`NotificationMessage`] |
//! | **Observer API**  | Hook into scheduler events (logging, metrics, custom).        | [`Observe`], [`Event`]                      |
//! | **Errors**        | Typed errors for construction and task execution.             | [`SchedulerError`], [`TaskError`]           |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{NotificationMessage, NotificationSink, RefreshTracker, SchedulerFactory, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = SchedulerFactory::default();
//!     let scheduler = factory.create_scheduler(Duration::from_secs(180))?;
//!
//!     let clusters: RefreshTracker<Vec<String>> = RefreshTracker::new();
//!     let sub = scheduler.subscribe(clusters.task("clusters", || async {
//!         Ok::<_, TaskError>(vec!["eu-west-1".to_string()])
//!     }));
//!     scheduler.schedule_immediate();
//!
//!     let sink: NotificationSink = NotificationSink::new();
//!     let _view = sink.subscribe(|list| println!("{} notification(s)", list.len()));
//!     sink.send(NotificationMessage::upsert("maintenance", "Deploys paused"));
//!
//!     // teardown
//!     sub.unsubscribe();
//!     scheduler.stop();
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod notify;
mod observers;
mod refresh;
mod tasks;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use core::{Scheduler, SchedulerBuilder, SchedulerFactory, Subscription, create_scheduler};
pub use error::{SchedulerError, TaskError};
pub use events::{Bus, Event, EventKind, TickSource};
pub use notify::{Notification, NotificationAction, NotificationMessage, NotificationSink, SinkSubscription};
pub use observers::{Observe, ObserverSet};
pub use refresh::{RefreshState, RefreshTracker};
pub use tasks::{Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
