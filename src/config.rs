//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the settings for one scheduler instance.
//!
//! Config is used in two ways:
//! 1. **Direct construction**: `Scheduler::builder(config).build()`
//! 2. **Factory defaults**: `SchedulerFactory::new(config)` reuses everything but the
//!    interval for every scheduler it creates.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`SchedulerConfig::bus_capacity_clamped`]
//! - `interval = 0s` → rejected by [`SchedulerConfig::validate`]

use std::borrow::Cow;
use std::time::Duration;

use crate::error::SchedulerError;

/// Configuration for a single scheduler.
///
/// ## Field semantics
/// - `name`: label attached to every event this scheduler publishes
/// - `interval`: period of the repeating timer (must be `> 0`)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
///
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Human-readable scheduler label (for logs/metrics).
    pub name: Cow<'static, str>,

    /// Period between two regular ticks.
    ///
    /// The first regular tick fires one full `interval` after the timer starts;
    /// use `schedule_immediate` to refresh right away.
    pub interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Observers that lag behind more than `bus_capacity` events skip older items.
    pub bus_capacity: usize,
}

impl SchedulerConfig {
    /// Creates a config with the given interval and default everything else.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Returns a copy with a different name.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that the config can drive a scheduler.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.interval.is_zero() {
            return Err(SchedulerError::InvalidInterval {
                interval: self.interval,
            });
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `name = "scheduler"`
    /// - `interval = 180s` (dashboard refresh cadence)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("scheduler"),
            interval: Duration::from_secs(3 * 60),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = SchedulerConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.interval, Duration::from_secs(180));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let cfg = SchedulerConfig::with_interval(Duration::ZERO);
        assert_eq!(
            cfg.validate(),
            Err(SchedulerError::InvalidInterval {
                interval: Duration::ZERO
            })
        );
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let mut cfg = SchedulerConfig::default();
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_named_keeps_interval() {
        let cfg = SchedulerConfig::with_interval(Duration::from_millis(100)).named("clusters");
        assert_eq!(cfg.name, "clusters");
        assert_eq!(cfg.interval, Duration::from_millis(100));
    }
}
