//! Scheduling core: timer, rounds and subscriptions.
//!
//! The only public API from this module is [`Scheduler`], its
//! [`Subscription`] handles, the [`SchedulerBuilder`] and the
//! [`SchedulerFactory`].
//!
//! Internal modules:
//! - [`scheduler`]: shared state, rounds, subscribe/unsubscribe/stop;
//! - [`subscription`]: slots, in-flight guard and the public handle;
//! - [`runner`]: executes one invocation and publishes its outcome;
//! - [`timer`]: the repeating timer loop;
//! - [`builder`]: scheduler construction and observer wiring;
//! - [`factory`]: registry-free scheduler factory.

mod builder;
mod factory;
mod runner;
mod scheduler;
mod subscription;
mod timer;

pub use builder::SchedulerBuilder;
pub use factory::{SchedulerFactory, create_scheduler};
pub use scheduler::Scheduler;
pub use subscription::Subscription;
