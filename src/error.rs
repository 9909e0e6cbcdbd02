//! Error types used by the pollvisor scheduler and its tasks.
//!
//! This module defines two main error enums:
//!
//! - [`SchedulerError`]: errors raised while constructing a scheduler.
//! - [`TaskError`]: errors raised by individual task invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//! A [`TaskError`] never escapes a scheduling round: it is reported as an
//! [`EventKind::TaskFailed`](crate::EventKind::TaskFailed) event and the
//! subscription keeps its place on the timer.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while building a scheduler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The polling interval must be strictly positive.
    #[error("invalid polling interval {interval:?}: must be greater than zero")]
    InvalidInterval {
        /// The rejected interval.
        interval: Duration,
    },

    /// No Tokio runtime was available to drive the timer and task invocations.
    #[error("no tokio runtime available; create schedulers from within a runtime or pass a handle")]
    NoRuntime,
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::SchedulerError;
    /// use std::time::Duration;
    ///
    /// let err = SchedulerError::InvalidInterval { interval: Duration::ZERO };
    /// assert_eq!(err.as_label(), "scheduler_invalid_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::InvalidInterval { .. } => "scheduler_invalid_interval",
            SchedulerError::NoRuntime => "scheduler_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::InvalidInterval { interval } => {
                format!("interval {interval:?} is not positive")
            }
            SchedulerError::NoRuntime => "no tokio runtime".to_string(),
        }
    }
}

/// # Errors produced by task invocations.
///
/// Tasks return these to signal that a refresh did not succeed. The scheduler
/// only reports them; it never retries or backs off.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task gave up waiting on its own deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The invocation failed; the next round will invoke the task again.
    #[error("execution failed: {reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// ```
    /// use pollvisor::TaskError;
    ///
    /// let err = TaskError::fail("upstream returned 503");
    /// assert_eq!(err.to_string(), "execution failed: upstream returned 503");
    /// ```
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fail { reason } => format!("error: {reason}"),
        }
    }
}
