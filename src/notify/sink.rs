//! # NotificationSink: deduplicating, observable notification list.
//!
//! ## Delivery model
//! ```text
//! send(msg)
//!   ├─► state lock: apply upsert/remove, bump revision, rebuild snapshot, update watch
//!   └─► delivery lock (reentrant): for each listener
//!         ├─ listener already saw this revision or newer ─► skip
//!         └─ otherwise ─► listener(&latest snapshot)
//! ```
//!
//! ## Rules
//! - The state lock is never held while a listener runs, so listeners may call
//!   back into the sink (`dismiss` from a close button handler).
//! - Deliveries are serialized across threads; a listener never observes an
//!   older revision after a newer one.
//! - A reentrant mutation delivers the newer list immediately; the outer
//!   delivery then skips listeners that are already up to date.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex};
use tokio::sync::watch;

use super::message::{Notification, NotificationAction, NotificationMessage};

type Callback<B> = Box<dyn Fn(&[Notification<B>]) + Send + Sync>;

struct Listener<B> {
    id: u64,
    seen: AtomicU64,
    callback: Callback<B>,
}

struct State<B> {
    messages: Vec<Notification<B>>,
    revision: u64,
    snapshot: Arc<[Notification<B>]>,
    listeners: Vec<Arc<Listener<B>>>,
}

struct Inner<B> {
    state: Mutex<State<B>>,
    delivery: ReentrantMutex<()>,
    watch: watch::Sender<Arc<[Notification<B>]>>,
    next_listener: AtomicU64,
}

/// Ordered, key-deduplicated list of visible notifications.
///
/// Cheap to clone; clones share the same list and listeners.
///
/// # Example
/// ```
/// use pollvisor::{NotificationMessage, NotificationSink};
///
/// let sink: NotificationSink = NotificationSink::new();
/// sink.send(NotificationMessage::upsert("deploy", "Deploying v1"));
/// sink.send(NotificationMessage::upsert("deploy", "Deploying v2"));
///
/// let shown = sink.snapshot();
/// assert_eq!(shown.len(), 1);
/// assert_eq!(shown[0].body, "Deploying v2");
///
/// sink.dismiss("deploy");
/// assert!(sink.is_empty());
/// ```
pub struct NotificationSink<B = String> {
    inner: Arc<Inner<B>>,
}

impl<B> NotificationSink<B>
where
    B: Clone + Send + Sync + 'static,
{
    /// Creates an empty sink.
    pub fn new() -> Self {
        let empty: Arc<[Notification<B>]> = Arc::from(Vec::new());
        let (watch, _rx) = watch::channel(Arc::clone(&empty));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    messages: Vec::new(),
                    revision: 0,
                    snapshot: empty,
                    listeners: Vec::new(),
                }),
                delivery: ReentrantMutex::new(()),
                watch,
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Applies a producer message.
    ///
    /// Returns `true` if the visible list changed (and listeners were notified).
    pub fn send(&self, message: NotificationMessage<B>) -> bool {
        let NotificationMessage { key, action } = message;
        tracing::trace!(key = %key, action = action.as_str(), "notification received");
        let changed = self.apply(key, action);
        if changed {
            self.deliver();
        }
        changed
    }

    /// Removes the notification under `key` on behalf of the user.
    ///
    /// Same effect as sending [`NotificationMessage::remove`]; unknown keys are ignored.
    pub fn dismiss(&self, key: &str) -> bool {
        let changed = self.apply(key.to_string(), NotificationAction::Remove);
        if changed {
            tracing::debug!(key, "notification dismissed");
            self.deliver();
        }
        changed
    }

    /// Registers a listener.
    ///
    /// The listener is called right away with the current list, then after
    /// every mutation. Detach it with [`SinkSubscription::unsubscribe`].
    pub fn subscribe<F>(&self, listener: F) -> SinkSubscription<B>
    where
        F: Fn(&[Notification<B>]) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        let listener = Arc::new(Listener {
            id,
            seen: AtomicU64::new(0),
            callback: Box::new(listener),
        });

        let _delivery = self.inner.delivery.lock();
        let (revision, snapshot) = {
            let mut state = self.inner.state.lock();
            state.listeners.push(Arc::clone(&listener));
            (state.revision, Arc::clone(&state.snapshot))
        };
        listener.seen.store(revision, Ordering::Release);
        (listener.callback)(&snapshot);

        SinkSubscription {
            id,
            sink: Arc::downgrade(&self.inner),
        }
    }

    /// Async view of the list with latest-value semantics.
    pub fn watch(&self) -> watch::Receiver<Arc<[Notification<B>]>> {
        self.inner.watch.subscribe()
    }

    /// Current list, in display order.
    pub fn snapshot(&self) -> Arc<[Notification<B>]> {
        Arc::clone(&self.inner.state.lock().snapshot)
    }

    /// The notification shown under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Notification<B>> {
        self.inner
            .state
            .lock()
            .messages
            .iter()
            .find(|m| m.key == key)
            .cloned()
    }

    /// Number of visible notifications.
    pub fn len(&self) -> usize {
        self.inner.state.lock().messages.len()
    }

    /// True if nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().messages.is_empty()
    }

    fn apply(&self, key: String, action: NotificationAction<B>) -> bool {
        let mut state = self.inner.state.lock();
        let pos = state.messages.iter().position(|m| m.key == key);

        match (action, pos) {
            (NotificationAction::Upsert(body), Some(i)) => state.messages[i].body = body,
            (NotificationAction::Upsert(body), None) => state.messages.push(Notification { key, body }),
            (NotificationAction::Remove, Some(i)) => {
                state.messages.remove(i);
            }
            (NotificationAction::Remove, None) => return false,
        }

        state.revision += 1;
        state.snapshot = Arc::from(state.messages.clone());
        self.inner.watch.send_replace(Arc::clone(&state.snapshot));
        true
    }

    fn deliver(&self) {
        let _delivery = self.inner.delivery.lock();
        let listeners = self.inner.state.lock().listeners.clone();

        for listener in listeners {
            let (revision, snapshot) = {
                let state = self.inner.state.lock();
                (state.revision, Arc::clone(&state.snapshot))
            };
            if listener.seen.fetch_max(revision, Ordering::AcqRel) >= revision {
                continue;
            }
            (listener.callback)(&snapshot);
        }
    }
}

impl<B> Default for NotificationSink<B>
where
    B: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for NotificationSink<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: fmt::Debug> fmt::Debug for NotificationSink<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("NotificationSink")
            .field("messages", &state.messages)
            .field("revision", &state.revision)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Disposer returned by [`NotificationSink::subscribe`].
///
/// Dropping it does not detach the listener; call [`unsubscribe`](Self::unsubscribe).
pub struct SinkSubscription<B = String> {
    id: u64,
    sink: Weak<Inner<B>>,
}

impl<B> SinkSubscription<B> {
    /// Detaches the listener. Idempotent; returns `true` only when it was removed.
    pub fn unsubscribe(&self) -> bool {
        let Some(inner) = self.sink.upgrade() else {
            return false;
        };
        let mut state = inner.state.lock();
        let before = state.listeners.len();
        state.listeners.retain(|l| l.id != self.id);
        state.listeners.len() != before
    }
}

impl<B> fmt::Debug for SinkSubscription<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkSubscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Seen = Arc<Mutex<Vec<Vec<(String, String)>>>>;

    fn record(sink: &NotificationSink) -> (Seen, SinkSubscription) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let sub = sink.subscribe(move |list: &[Notification]| {
            s.lock().push(
                list.iter()
                    .map(|n| (n.key.clone(), n.body.clone()))
                    .collect(),
            );
        });
        (seen, sub)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, b)| (k.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let sink: NotificationSink = NotificationSink::new();
        sink.send(NotificationMessage::upsert("x", "v1"));
        sink.send(NotificationMessage::upsert("y", "other"));
        sink.send(NotificationMessage::upsert("x", "v2"));

        let shown = sink.snapshot();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0], Notification { key: "x".into(), body: "v2".into() });
        assert_eq!(shown[1].key, "y");
    }

    #[test]
    fn test_remove_after_upsert() {
        let sink: NotificationSink = NotificationSink::new();
        sink.send(NotificationMessage::upsert("a", "hello"));
        assert!(sink.send(NotificationMessage::remove("a")));
        assert!(sink.get("a").is_none());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_listener_sees_full_list_after_each_mutation() {
        let sink: NotificationSink = NotificationSink::new();
        let (seen, _sub) = record(&sink);

        sink.send(NotificationMessage::upsert("a", "1"));
        sink.send(NotificationMessage::upsert("b", "2"));
        sink.send(NotificationMessage::upsert("a", "3"));
        sink.dismiss("b");

        assert_eq!(
            *seen.lock(),
            vec![
                pairs(&[]),
                pairs(&[("a", "1")]),
                pairs(&[("a", "1"), ("b", "2")]),
                pairs(&[("a", "3"), ("b", "2")]),
                pairs(&[("a", "3")]),
            ]
        );
    }

    #[test]
    fn test_unknown_key_removal_is_silent() {
        let sink: NotificationSink = NotificationSink::new();
        let (seen, _sub) = record(&sink);

        assert!(!sink.send(NotificationMessage::remove("ghost")));
        assert!(!sink.dismiss("ghost"));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let sink: NotificationSink = NotificationSink::new();
        let (seen, sub) = record(&sink);

        assert!(sub.unsubscribe());
        assert!(!sub.unsubscribe());
        sink.send(NotificationMessage::upsert("a", "1"));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_listener_can_dismiss_reentrantly() {
        let sink: NotificationSink = NotificationSink::new();
        let handle = sink.clone();
        let _auto = sink.subscribe(move |list: &[Notification]| {
            if list.iter().any(|n| n.key == "flash") {
                handle.dismiss("flash");
            }
        });
        let (seen, _sub) = record(&sink);

        sink.send(NotificationMessage::upsert("flash", "saved"));

        assert!(sink.is_empty());
        assert_eq!(seen.lock().last(), Some(&pairs(&[])));
    }

    #[test]
    fn test_concurrent_producers_never_regress() {
        let sink: NotificationSink = NotificationSink::new();
        let lengths = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&lengths);
        let _sub = sink.subscribe(move |list: &[Notification]| l.lock().push(list.len()));

        let producers: Vec<_> = (0..8)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        sink.send(NotificationMessage::upsert(format!("{t}-{i}"), "x"));
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        assert_eq!(sink.len(), 400);
        let lengths = lengths.lock();
        assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(lengths.last(), Some(&400));
    }

    #[tokio::test]
    async fn test_watch_tracks_latest() {
        let sink: NotificationSink = NotificationSink::new();
        let mut rx = sink.watch();

        sink.send(NotificationMessage::upsert("a", "1"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        sink.dismiss("a");
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}
