use std::fmt;

/// One visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification<B = String> {
    /// Identity; unique within a sink.
    pub key: String,
    /// Display payload, opaque to the sink.
    pub body: B,
}

/// What a message does to the notification with its key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NotificationAction<B = String> {
    /// Insert, or replace the body in place if the key is already shown.
    Upsert(B),
    /// Remove the notification if it is shown.
    Remove,
}

/// Producer-side message sent to a [`NotificationSink`](crate::NotificationSink).
///
/// ```
/// use pollvisor::{NotificationAction, NotificationMessage};
///
/// let msg: NotificationMessage = NotificationMessage::upsert("maintenance", "Deploys paused until 14:00");
/// assert_eq!(msg.key, "maintenance");
/// assert!(matches!(msg.action, NotificationAction::Upsert(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationMessage<B = String> {
    pub key: String,
    pub action: NotificationAction<B>,
}

impl<B> NotificationMessage<B> {
    /// Shows `body` under `key`.
    pub fn upsert(key: impl Into<String>, body: impl Into<B>) -> Self {
        Self {
            key: key.into(),
            action: NotificationAction::Upsert(body.into()),
        }
    }

    /// Hides the notification shown under `key`.
    pub fn remove(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action: NotificationAction::Remove,
        }
    }
}

impl<B> NotificationAction<B> {
    /// Short stable label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationAction::Upsert(_) => "upsert",
            NotificationAction::Remove => "remove",
        }
    }
}

impl<B> fmt::Display for NotificationAction<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
