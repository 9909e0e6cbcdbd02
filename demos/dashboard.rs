//! # Project Dashboard Example
//!
//! A project page polls two independent feeds (clusters and executions) on
//! their own schedulers, forces a first load right away, shows loading and
//! error flags, and surfaces problems through the notification sink.
//!
//! The executions feed fails every third call to show failure isolation: the
//! clusters feed and later executions refreshes carry on. The clusters fetch
//! runs under a deadline and reports `TaskError::Timeout` when it misses it.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example dashboard --features logging
//! ```

use std::{
    sync::Arc,
    sync::atomic::{AtomicU32, Ordering},
    time::Duration,
};

use pollvisor::{
    LogWriter, NotificationMessage, NotificationSink, Observe, RefreshTracker, SchedulerConfig,
    SchedulerFactory, TaskError,
};
use tracing_subscriber::EnvFilter;

const FETCH_DEADLINE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
struct Cluster {
    name: &'static str,
    region: &'static str,
}

#[derive(Clone, Debug)]
struct Execution {
    id: u32,
    status: &'static str,
}

async fn fetch_clusters() -> Result<Vec<Cluster>, TaskError> {
    tokio::time::sleep(Duration::from_millis(80)).await;
    Ok(vec![
        Cluster { name: "prod-a", region: "eu-west-1" },
        Cluster { name: "prod-b", region: "us-east-1" },
    ])
}

async fn fetch_executions(call: u32) -> Result<Vec<Execution>, TaskError> {
    tokio::time::sleep(Duration::from_millis(120)).await;
    if call % 3 == 2 {
        return Err(TaskError::fail("executions API returned 503"));
    }
    Ok((0..call + 1)
        .map(|id| Execution { id, status: if id == call { "running" } else { "succeeded" } })
        .collect())
}

fn render(page: &str, clusters: &RefreshTracker<Vec<Cluster>>, executions: &RefreshTracker<Vec<Execution>>) {
    let cs = clusters.state();
    let es = executions.state();
    println!();
    println!("Dashboard ({page}):");
    println!(
        " ├─► Clusters:   {:>2} loaded={} refreshing={} error={}",
        clusters.data().map(|v| v.len()).unwrap_or(0),
        cs.loaded,
        cs.refreshing,
        cs.error
    );
    if let Some(list) = clusters.data() {
        for c in list {
            println!(" │     {} ({})", c.name, c.region);
        }
    }
    println!(
        " └─► Executions: {:>2} loaded={} refreshing={} error={}",
        executions.data().map(|v| v.len()).unwrap_or(0),
        es.loaded,
        es.refreshing,
        es.error
    );
    if let Some(list) = executions.data() {
        for e in list {
            println!("       #{} {}", e.id, e.status);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // The real page polls every 3 minutes; the demo compresses that to 1s.
    let observers: Vec<Arc<dyn Observe>> = vec![Arc::new(LogWriter)];
    let factory = SchedulerFactory::new(SchedulerConfig::default()).with_observers(observers);
    let cluster_scheduler = factory.create_named("clusters", Duration::from_secs(1))?;
    let execution_scheduler = factory.create_named("executions", Duration::from_secs(1))?;

    let notifications: NotificationSink = NotificationSink::new();
    let _toasts = notifications.subscribe(|list| {
        for n in list {
            println!(" !  [{}] {}", n.key, n.body);
        }
    });

    let clusters: RefreshTracker<Vec<Cluster>> = RefreshTracker::new();
    let executions: RefreshTracker<Vec<Execution>> = RefreshTracker::new();

    let cluster_sub = cluster_scheduler.subscribe(clusters.task("get-clusters", || async {
        tokio::time::timeout(FETCH_DEADLINE, fetch_clusters())
            .await
            .map_err(|_| TaskError::Timeout { timeout: FETCH_DEADLINE })
            .and_then(|res| res)
    }));

    let calls = Arc::new(AtomicU32::new(0));
    let sink = notifications.clone();
    let execution_sub = execution_scheduler.subscribe(executions.task("get-executions", move || {
        let call = calls.fetch_add(1, Ordering::Relaxed);
        let sink = sink.clone();
        async move {
            let res = fetch_executions(call).await;
            match &res {
                Ok(_) => sink.send(NotificationMessage::remove("executions")),
                Err(e) => sink.send(NotificationMessage::upsert(
                    "executions",
                    format!("Could not refresh executions: {e}"),
                )),
            };
            res
        }
    }));

    // First load without waiting a full interval.
    cluster_scheduler.schedule_immediate();
    execution_scheduler.schedule_immediate();
    render("initial", &clusters, &executions);

    for i in 1..=4 {
        tokio::time::sleep(Duration::from_millis(1100)).await;
        render(&format!("t+{i}s"), &clusters, &executions);
    }

    // Page teardown.
    cluster_sub.unsubscribe();
    execution_sub.unsubscribe();
    cluster_scheduler.stop();
    execution_scheduler.stop();
    notifications.dismiss("executions");

    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}
