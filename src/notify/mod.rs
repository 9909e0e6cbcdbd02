//! # Keyed notification sink.
//!
//! A [`NotificationSink`] holds the ordered list of notifications a display
//! surface should show. Producers [`send`](NotificationSink::send) messages;
//! the surface observes the list and calls [`dismiss`](NotificationSink::dismiss)
//! when the user closes one.
//!
//! ```text
//! producers ── send(upsert k / remove k) ──► sink (Vec<Notification>, deduped by key)
//!                                               │ every mutation
//!                                  ┌────────────┴─────────────┐
//!                                  ▼                          ▼
//!                     listener(&[Notification])      watch::Receiver (async)
//!                                  │
//!                       surface ── dismiss(k) ──► sink
//! ```
//!
//! ## Rules
//! - At most one notification per key; upserting an existing key replaces its
//!   body and keeps its position.
//! - Removing or dismissing an unknown key is a no-op and notifies nobody.
//! - Listeners always receive the full list, never a diff.

mod message;
mod sink;

pub use message::{Notification, NotificationAction, NotificationMessage};
pub use sink::{NotificationSink, SinkSubscription};
