//! # SchedulerFactory: explicit, registry-free scheduler construction.
//!
//! Every call to [`SchedulerFactory::create_scheduler`] yields an independent
//! [`Scheduler`] with its own timer, event bus and observer workers. The factory
//! keeps no reference to what it creates: callers own the lifetime of their
//! schedulers and stop them on teardown.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::SchedulerFactory;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pollvisor::SchedulerError> {
//! let factory = SchedulerFactory::default();
//! let clusters = factory.create_named("clusters", Duration::from_secs(180))?;
//! let executions = factory.create_named("executions", Duration::from_secs(180))?;
//! assert_ne!(clusters.name(), executions.name());
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::{config::SchedulerConfig, error::SchedulerError, observers::Observe};

use super::scheduler::Scheduler;

/// Constructs schedulers from a shared base configuration.
///
/// The base config's `interval` is ignored; each scheduler gets the interval
/// passed at creation.
#[derive(Clone, Default)]
pub struct SchedulerFactory {
    base: SchedulerConfig,
    observers: Vec<Arc<dyn Observe>>,
    handle: Option<Handle>,
}

impl SchedulerFactory {
    /// Creates a factory using `base` for everything but the interval.
    pub fn new(base: SchedulerConfig) -> Self {
        Self {
            base,
            observers: Vec::new(),
            handle: None,
        }
    }

    /// Attaches `observers` to every scheduler created afterwards.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Runs created schedulers on `handle`.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Creates an independent scheduler ticking every `interval`.
    pub fn create_scheduler(&self, interval: Duration) -> Result<Scheduler, SchedulerError> {
        self.build(self.base.name.clone(), interval)
    }

    /// Creates an independent scheduler with its own label.
    pub fn create_named(
        &self,
        name: impl Into<Cow<'static, str>>,
        interval: Duration,
    ) -> Result<Scheduler, SchedulerError> {
        self.build(name.into(), interval)
    }

    /// Convenience for intervals expressed in milliseconds.
    pub fn create_scheduler_millis(&self, interval_ms: u64) -> Result<Scheduler, SchedulerError> {
        self.create_scheduler(Duration::from_millis(interval_ms))
    }

    fn build(&self, name: Cow<'static, str>, interval: Duration) -> Result<Scheduler, SchedulerError> {
        let cfg = SchedulerConfig {
            name,
            interval,
            ..self.base.clone()
        };

        let mut builder = Scheduler::builder(cfg).with_observers(self.observers.clone());
        if let Some(handle) = &self.handle {
            builder = builder.with_handle(handle.clone());
        }
        builder.build()
    }
}

/// Creates a scheduler with default settings on the current runtime.
///
/// Shorthand for `SchedulerFactory::default().create_scheduler(interval)`.
pub fn create_scheduler(interval: Duration) -> Result<Scheduler, SchedulerError> {
    SchedulerFactory::default().create_scheduler(interval)
}
