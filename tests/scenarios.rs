use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pollvisor::{
    Event, EventKind, NotificationMessage, NotificationSink, Observe, RefreshTracker, SchedulerError,
    SchedulerFactory, TaskError, TaskFn, TaskRef, create_scheduler,
};
use tokio::sync::Notify;

const TICK: Duration = Duration::from_millis(100);

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

fn counting(name: &'static str, calls: &Arc<AtomicUsize>) -> TaskRef {
    let calls = Arc::clone(calls);
    TaskFn::arc(name, move || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, TaskError>(()) }
    })
}

#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Observe for Recorder {
    async fn on_event(&self, event: &Event) {
        self.kinds.lock().push(event.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test(start_paused = true)]
async fn immediate_round_runs_once_and_clears_in_flight() {
    let sched = create_scheduler(TICK).unwrap();
    let gate = Arc::new(Notify::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let (g, c) = (Arc::clone(&gate), Arc::clone(&calls));
    let sub = sched.subscribe(TaskFn::arc("a", move || {
        let g = Arc::clone(&g);
        c.fetch_add(1, Ordering::SeqCst);
        async move {
            g.notified().await;
            Ok::<_, TaskError>(())
        }
    }));

    sched.schedule_immediate();
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sub.is_in_flight());

    gate.notify_one();
    settle().await;
    assert!(!sub.is_in_flight());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn only_remaining_subscription_runs_after_unsubscribe() {
    let sched = create_scheduler(TICK).unwrap();
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));
    let sub_a = sched.subscribe(counting("a", &a));
    let _sub_b = sched.subscribe(counting("b", &b));

    sub_a.unsubscribe();
    sched.schedule_immediate();
    settle().await;

    assert_eq!(a.load(Ordering::SeqCst), 0);
    assert_eq!(b.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn timer_ticks_at_interval_until_stopped() {
    let sched = create_scheduler(TICK).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    sched.subscribe(counting("a", &calls));

    tokio::time::advance(TICK / 2).await;
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    for expected in 1..=3 {
        tokio::time::advance(TICK / 2).await;
        settle().await;
        assert_eq!(calls.load(Ordering::SeqCst), expected);
        tokio::time::advance(TICK / 2).await;
        settle().await;
    }

    sched.stop();
    tokio::time::advance(TICK * 5).await;
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn factory_schedulers_are_independent() {
    let factory = SchedulerFactory::default();
    let clusters = factory.create_named("clusters", TICK).unwrap();
    let executions = factory.create_named("executions", TICK * 2).unwrap();
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));
    clusters.subscribe(counting("a", &a));
    executions.subscribe(counting("b", &b));

    clusters.stop();
    executions.schedule_immediate();
    tokio::time::advance(TICK * 2).await;
    settle().await;

    assert_eq!(a.load(Ordering::SeqCst), 0);
    assert_eq!(b.load(Ordering::SeqCst), 2);
    assert!(executions.is_running());
}

#[tokio::test(start_paused = true)]
async fn observers_receive_task_outcomes() {
    let recorder = Arc::new(Recorder::default());
    let observers: Vec<Arc<dyn Observe>> = vec![recorder.clone()];
    let factory = SchedulerFactory::default().with_observers(observers);
    let sched = factory.create_scheduler(TICK).unwrap();

    sched.subscribe(TaskFn::arc("bad", || async { Err::<(), _>(TaskError::fail("boom")) }));
    sched.schedule_immediate();
    settle().await;

    let kinds = recorder.kinds.lock().clone();
    assert!(kinds.contains(&EventKind::Subscribed));
    assert!(kinds.contains(&EventKind::TaskStarting));
    assert!(kinds.contains(&EventKind::TaskFailed));
    assert!(sched.is_running());
}

#[test]
fn zero_interval_is_rejected() {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let res = rt.block_on(async { create_scheduler(Duration::ZERO) });
    assert!(matches!(res, Err(SchedulerError::InvalidInterval { .. })));
}

#[test]
fn creating_outside_runtime_fails() {
    assert!(matches!(create_scheduler(TICK), Err(SchedulerError::NoRuntime)));
}

#[tokio::test(start_paused = true)]
async fn refresh_tracker_follows_scheduled_fetches() {
    let sched = create_scheduler(TICK).unwrap();
    let tracker: RefreshTracker<u32> = RefreshTracker::new();
    let n = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&n);
    sched.subscribe(tracker.task("count", move || {
        let v = c.fetch_add(1, Ordering::SeqCst) as u32;
        async move { Ok(v) }
    }));

    assert!(tracker.state().initializing);
    sched.schedule_immediate();
    settle().await;
    assert_eq!(tracker.data(), Some(0));

    tokio::time::advance(TICK).await;
    settle().await;
    assert_eq!(tracker.data(), Some(1));
    assert!(tracker.state().loaded);
}

#[test]
fn sink_upsert_then_remove() {
    let sink: NotificationSink = NotificationSink::new();
    sink.send(NotificationMessage::upsert("a", "hello"));
    assert!(sink.get("a").is_some());

    sink.send(NotificationMessage::remove("a"));
    assert!(sink.get("a").is_none());
    assert!(sink.is_empty());
}
