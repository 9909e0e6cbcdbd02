//! # SchedulerBuilder: validated construction and observer wiring.
//!
//! [`SchedulerBuilder::build`] checks the config, captures a runtime handle and
//! creates the event bus. With observers attached it also spawns the observer
//! listener, which forwards bus events to the [`ObserverSet`] until the
//! scheduler is dropped.
//!
//! ```text
//! build()
//!   ├─► cfg.validate()            (InvalidInterval)
//!   ├─► Handle::try_current()     (NoRuntime, unless with_handle)
//!   ├─► Bus::new(bus_capacity)
//!   └─► observers? ─► spawn listener: bus ─► ObserverSet ─► workers
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::{
    config::SchedulerConfig,
    error::SchedulerError,
    events::Bus,
    observers::{Observe, ObserverSet},
};
use super::scheduler::{Scheduler, Shared};

/// Builder for constructing a [`Scheduler`] with optional observers.
pub struct SchedulerBuilder {
    cfg: SchedulerConfig,
    observers: Vec<Arc<dyn Observe>>,
    handle: Option<Handle>,
}

impl SchedulerBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            cfg,
            observers: Vec::new(),
            handle: None,
        }
    }

    /// Sets event observers.
    ///
    /// Observers receive scheduler events (rounds, task outcomes, timer changes)
    /// through dedicated workers with bounded queues.
    pub fn with_observers(mut self, observers: Vec<Arc<dyn Observe>>) -> Self {
        self.observers = observers;
        self
    }

    /// Runs the timer, invocations and observers on `handle` instead of the
    /// runtime current at [`build`](Self::build) time.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Builds and returns the Scheduler instance.
    ///
    /// The timer is not armed until the first subscription.
    ///
    /// # Errors
    /// - [`SchedulerError::InvalidInterval`] for a zero interval
    /// - [`SchedulerError::NoRuntime`] when no handle was given and no Tokio runtime is current
    pub fn build(self) -> Result<Scheduler, SchedulerError> {
        self.cfg.validate()?;
        let rt = match self.handle {
            Some(h) => h,
            None => Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?,
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let lifetime = CancellationToken::new();

        if !self.observers.is_empty() {
            let set = ObserverSet::new(self.observers, bus.clone(), &rt);
            spawn_observer_listener(&rt, &bus, set, lifetime.clone());
        }

        let shared = Arc::new(Shared::new(&self.cfg, bus, rt, lifetime));
        Ok(Scheduler::from_shared(shared))
    }
}

/// Forwards bus events to the observer set until the scheduler is dropped,
/// then flushes what is still buffered and shuts the workers down.
fn spawn_observer_listener(rt: &Handle, bus: &Bus, set: ObserverSet, lifetime: CancellationToken) {
    let mut rx = bus.subscribe();

    rt.spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit_arc(Arc::new(ev)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "observer listener lagged behind the event bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit_arc(Arc::new(ev)),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });
}
