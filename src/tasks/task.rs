//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: a zero-argument async unit of work
//! that resolves to success or failure. The common handle type is [`TaskRef`],
//! an `Arc<dyn Task>` shared between the caller and the scheduler.
//!
//! The scheduler consumes nothing from a task but its outcome. Anything the
//! task produces (loaded data, error flags shown to a view) is the task's own
//! business; see [`RefreshTracker`](crate::RefreshTracker) for the usual pattern.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;

/// # Shared handle to a task object.
///
/// The caller keeps ownership; a subscription only holds another reference.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous unit of periodic work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run) method.
/// One subscription never runs two invocations of its task at the same time,
/// but the same `Task` subscribed twice (or to two schedulers) may.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use pollvisor::{Task, TaskError};
///
/// struct Heartbeat;
///
/// #[async_trait]
/// impl Task for Heartbeat {
///     fn name(&self) -> &str { "heartbeat" }
///
///     async fn run(&self) -> Result<(), TaskError> {
///         // ping something...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Performs one invocation.
    ///
    /// Cancellation and timeouts are the task's own concern: the scheduler
    /// never aborts an invocation that has started.
    async fn run(&self) -> Result<(), TaskError>;
}
