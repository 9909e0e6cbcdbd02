//! # Refresh status tracking for polled features.
//!
//! A polled view usually wants more than "the task ran": it shows a spinner
//! while the first load is pending, a subtle indicator during background
//! refreshes, an error banner when the last fetch failed, and the time of the
//! last successful load. [`RefreshTracker`] keeps that status next to the
//! latest data and hands out a [`Task`] that records each fetch's outcome.
//!
//! ```text
//! run() ─► error = false, refreshing = true
//!            │
//!            ├─ fetch Ok(data)  ─► data = Some(data), loaded = true,
//!            │                     initializing = false, refreshing = false,
//!            │                     last_refresh = now
//!            │
//!            └─ fetch Err(e)    ─► initializing = false, refreshing = false,
//!                                  error = true, return Err(e)
//! ```
//!
//! A fetch that panics is recorded like a failed one before the panic goes on
//! to the scheduler, which reports it as `TaskPanicked`. Data from the previous
//! successful fetch is kept when a later fetch fails.

use std::borrow::Cow;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;

use crate::error::TaskError;
use crate::tasks::{Task, TaskRef};

/// Observable refresh status of one feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshState {
    /// True until the first fetch resolves, successfully or not.
    pub initializing: bool,
    /// True while a fetch is running.
    pub refreshing: bool,
    /// True once any fetch has succeeded.
    pub loaded: bool,
    /// True if the most recent fetch failed.
    pub error: bool,
    /// Wall-clock time of the last successful fetch.
    pub last_refresh: Option<SystemTime>,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            initializing: true,
            refreshing: false,
            loaded: false,
            error: false,
            last_refresh: None,
        }
    }
}

struct Tracked<T> {
    state: RefreshState,
    data: Option<T>,
}

/// Shared refresh status plus the latest loaded data.
///
/// Clones share the same state.
///
/// # Example
/// ```no_run
/// use pollvisor::{RefreshTracker, TaskError, create_scheduler};
/// use std::time::Duration;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let clusters: RefreshTracker<Vec<String>> = RefreshTracker::new();
/// let scheduler = create_scheduler(Duration::from_secs(180))?;
///
/// let sub = scheduler.subscribe(clusters.task("clusters", || async {
///     Ok::<_, TaskError>(vec!["eu-west".to_string()])
/// }));
/// scheduler.schedule_immediate();
///
/// // later, from the view
/// if clusters.state().initializing {
///     println!("loading...");
/// }
/// # sub.unsubscribe();
/// # Ok(())
/// # }
/// ```
pub struct RefreshTracker<T> {
    inner: Arc<Mutex<Tracked<T>>>,
}

impl<T> RefreshTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a tracker in the initializing state with no data.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Tracked {
                state: RefreshState::default(),
                data: None,
            })),
        }
    }

    /// Current status.
    pub fn state(&self) -> RefreshState {
        self.inner.lock().state
    }

    /// Latest successfully fetched data.
    pub fn data(&self) -> Option<T> {
        self.inner.lock().data.clone()
    }

    /// Wraps `fetch` into a task that records its outcome in this tracker.
    ///
    /// A failed fetch is returned from the task as-is, so scheduler observers
    /// still see it as `TaskFailed`.
    pub fn task<F, Fut>(&self, name: impl Into<Cow<'static, str>>, fetch: F) -> TaskRef
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Arc::new(RefreshTask {
            name: name.into(),
            tracker: self.clone(),
            fetch,
        })
    }

    fn begin(&self) {
        let mut t = self.inner.lock();
        t.state.error = false;
        t.state.refreshing = true;
    }

    fn finish(&self, data: Option<T>) {
        let mut t = self.inner.lock();
        t.state.initializing = false;
        t.state.refreshing = false;
        match data {
            Some(data) => {
                t.data = Some(data);
                t.state.loaded = true;
                t.state.last_refresh = Some(SystemTime::now());
            }
            None => t.state.error = true,
        }
    }
}

impl<T> Default for RefreshTracker<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RefreshTracker<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct RefreshTask<T, F> {
    name: Cow<'static, str>,
    tracker: RefreshTracker<T>,
    fetch: F,
}

#[async_trait]
impl<T, F, Fut> Task for RefreshTask<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<(), TaskError> {
        self.tracker.begin();
        let res = match AssertUnwindSafe(async { (self.fetch)().await })
            .catch_unwind()
            .await
        {
            Ok(res) => res,
            Err(panic) => {
                self.tracker.finish(None);
                std::panic::resume_unwind(panic);
            }
        };

        match res {
            Ok(data) => {
                self.tracker.finish(Some(data));
                Ok(())
            }
            Err(e) => {
                self.tracker.finish(None);
                tracing::debug!(task = %self.name, error = %e, "refresh failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_initial_state() {
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let st = tracker.state();
        assert!(st.initializing);
        assert!(!st.refreshing && !st.loaded && !st.error);
        assert!(st.last_refresh.is_none());
        assert!(tracker.data().is_none());
    }

    #[tokio::test]
    async fn test_success_loads_data() {
        let tracker: RefreshTracker<Vec<&'static str>> = RefreshTracker::new();
        let task = tracker.task("clusters", || async { Ok(vec!["a", "b"]) });

        task.run().await.unwrap();

        let st = tracker.state();
        assert!(!st.initializing && !st.refreshing && !st.error);
        assert!(st.loaded);
        assert!(st.last_refresh.is_some());
        assert_eq!(tracker.data(), Some(vec!["a", "b"]));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let fail = Arc::new(AtomicBool::new(false));
        let f = Arc::clone(&fail);
        let task = tracker.task("executions", move || {
            let fail = f.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(TaskError::fail("503"))
                } else {
                    Ok(7)
                }
            }
        });

        task.run().await.unwrap();
        let loaded_at = tracker.state().last_refresh;

        fail.store(true, Ordering::SeqCst);
        let err = task.run().await.unwrap_err();
        assert_eq!(err, TaskError::fail("503"));

        let st = tracker.state();
        assert!(st.error && st.loaded);
        assert!(!st.refreshing);
        assert_eq!(st.last_refresh, loaded_at);
        assert_eq!(tracker.data(), Some(7));

        fail.store(false, Ordering::SeqCst);
        task.run().await.unwrap();
        assert!(!tracker.state().error);
    }

    #[tokio::test]
    async fn test_first_failure_ends_initializing() {
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let task = tracker.task("bad", || async {
            Err(TaskError::Timeout { timeout: std::time::Duration::from_secs(5) })
        });

        assert!(task.run().await.is_err());

        let st = tracker.state();
        assert!(!st.initializing && !st.loaded);
        assert!(st.error);
    }

    #[tokio::test]
    async fn test_refreshing_while_running() {
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let gate = Arc::new(tokio::sync::Notify::new());
        let g = Arc::clone(&gate);
        let task = tracker.task("slow", move || {
            let g = Arc::clone(&g);
            async move {
                g.notified().await;
                Ok(1)
            }
        });

        let handle = tokio::spawn({
            let task = Arc::clone(&task);
            async move { task.run().await }
        });
        tokio::task::yield_now().await;
        while !tracker.state().refreshing {
            tokio::task::yield_now().await;
        }
        assert!(tracker.state().initializing);

        gate.notify_one();
        handle.await.unwrap().unwrap();
        assert!(!tracker.state().refreshing);
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_recorded_as_error() {
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let task = tracker.task("explodes", || async {
            if true {
                panic!("decoder crashed");
            }
            Ok(1)
        });

        let caught = AssertUnwindSafe(task.run()).catch_unwind().await;
        assert!(caught.is_err());

        let st = tracker.state();
        assert!(!st.initializing && !st.refreshing);
        assert!(st.error);
        assert!(!st.loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fetch_in_scheduled_round() {
        let sched = crate::create_scheduler(std::time::Duration::from_millis(100)).unwrap();
        let tracker: RefreshTracker<u32> = RefreshTracker::new();
        let panics = Arc::new(AtomicBool::new(true));
        let p = Arc::clone(&panics);
        let sub = sched.subscribe(tracker.task("flaky", move || {
            let panics = p.load(Ordering::SeqCst);
            async move {
                if panics {
                    panic!("decoder crashed");
                }
                Ok(3)
            }
        }));

        sched.schedule_immediate();
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        let st = tracker.state();
        assert!(st.error && !st.refreshing && !st.initializing);
        assert!(!sub.is_in_flight());

        panics.store(false, Ordering::SeqCst);
        sched.schedule_immediate();
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
        let st = tracker.state();
        assert!(st.loaded && !st.error);
        assert_eq!(tracker.data(), Some(3));
    }
}
