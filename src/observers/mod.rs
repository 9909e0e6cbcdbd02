//! # Event observers for pollvisor schedulers.
//!
//! This module provides the [`Observe`] trait and the [`ObserverSet`] fan-out
//! used to deliver scheduler events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Scheduler / timer / invocation ── publish(Event) ──► Bus
//!                                                         │
//!                                              observer listener (per scheduler)
//!                                                         │
//!                                                    ObserverSet::emit_arc
//!                                              ┌──────────┼──────────┐
//!                                              ▼          ▼          ▼
//!                                          LogWriter   Metrics    Custom
//! ```
//!
//! ## Implementing custom observers
//! ```no_run
//! use pollvisor::{Observe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Observe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::TaskFailed {
//!             // increment failure counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

mod observe;
mod set;

#[cfg(feature = "logging")]
mod log;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use observe::Observe;
pub use set::ObserverSet;

pub(crate) use set::panic_message;
