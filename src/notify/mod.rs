//! User-facing notifications and the table-level change feed.
//!
//! Notifications are short-lived toasts: celebrations when the leader
//! changes, undo prompts after a delete. Each expires independently; expired
//! ones are pruned whenever the collection is read.
//!
//! The change feed is the subscription primitive for store mutations. Events
//! carry only the collection and operation, never a row payload, so consumers
//! react by reloading and recomputing, which stays idempotent under
//! duplicate or reordered deliveries.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

/// How long a celebration toast stays visible.
pub const CELEBRATION_DURATION_MS: u32 = 4_000;

/// How long an undo prompt stays visible (and its snapshot stays restorable).
pub const UNDO_DURATION_MS: u32 = 5_000;

/// Notification flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Undo,
    Celebration,
}

/// An invokable action attached to a notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAction {
    pub label: String,
    /// Opaque token the client posts back to trigger the effect.
    pub token: String,
}

/// A timed, dismissible user-facing notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
    pub display_duration_ms: u32,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.created_at + Duration::milliseconds(i64::from(self.display_duration_ms))
    }
}

/// The single active notification collection.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    active: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a celebration toast naming the new leader.
    pub async fn push_celebration(&self, message: String) -> Notification {
        self.push(message, NotificationKind::Celebration, None, CELEBRATION_DURATION_MS)
            .await
    }

    /// Push an undo prompt whose action carries the restore token.
    pub async fn push_undo(&self, message: String, token: String) -> Notification {
        let action = NotificationAction {
            label: "Undo".to_string(),
            token,
        };
        self.push(message, NotificationKind::Undo, Some(action), UNDO_DURATION_MS)
            .await
    }

    async fn push(
        &self,
        message: String,
        kind: NotificationKind,
        action: Option<NotificationAction>,
        display_duration_ms: u32,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            message,
            kind,
            action,
            display_duration_ms,
            created_at: Utc::now(),
        };
        self.active.lock().await.push(notification.clone());
        notification
    }

    /// The still-active notifications; expired ones are pruned on the way.
    pub async fn active(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut active = self.active.lock().await;
        active.retain(|n| !n.expired(now));
        active.clone()
    }

    /// Dismiss a notification by id. Returns whether it was present.
    pub async fn dismiss(&self, id: &str) -> bool {
        let mut active = self.active.lock().await;
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() < before
    }
}

/// Store collection a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Entries,
    Users,
}

/// Kind of store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// A table-level change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub collection: Collection,
    pub op: ChangeOp,
    pub revision_id: i64,
}

/// Broadcast-based change feed.
///
/// Slow receivers that fall behind get a `Lagged` error and miss events;
/// consumers reload from the store on every delivery, so a missed event only
/// delays convergence until the next one.
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    /// Create a feed with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit a change to all subscribers; dropped silently when nobody listens.
    pub fn emit(&self, collection: Collection, op: ChangeOp, revision_id: i64) {
        let event = ChangeEvent {
            collection,
            op,
            revision_id,
        };
        tracing::debug!(?event, subscribers = self.tx.receiver_count(), "change feed emit");
        let _ = self.tx.send(event);
    }

    /// Subscribe to change events. Each subscriber gets an independent stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_and_dismiss() {
        let center = NotificationCenter::new();
        let n = center
            .push_celebration("Alex takes the lead!".to_string())
            .await;

        let active = center.active(Utc::now()).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Celebration);
        assert_eq!(active[0].display_duration_ms, CELEBRATION_DURATION_MS);

        assert!(center.dismiss(&n.id).await);
        assert!(!center.dismiss(&n.id).await);
        assert!(center.active(Utc::now()).await.is_empty());
    }

    #[tokio::test]
    async fn test_undo_notification_carries_action() {
        let center = NotificationCenter::new();
        center
            .push_undo("Entry deleted".to_string(), "token-1".to_string())
            .await;

        let active = center.active(Utc::now()).await;
        let action = active[0].action.as_ref().expect("undo action");
        assert_eq!(action.label, "Undo");
        assert_eq!(action.token, "token-1");
        assert_eq!(active[0].display_duration_ms, UNDO_DURATION_MS);
    }

    #[tokio::test]
    async fn test_expired_notifications_are_pruned() {
        let center = NotificationCenter::new();
        center
            .push_undo("Entry deleted".to_string(), "token-1".to_string())
            .await;

        let later = Utc::now() + Duration::milliseconds(i64::from(UNDO_DURATION_MS) + 1);
        assert!(center.active(later).await.is_empty());
    }

    #[tokio::test]
    async fn test_change_feed_emit_subscribe() {
        let feed = ChangeFeed::new(32);
        let mut rx = feed.subscribe();

        feed.emit(Collection::Entries, ChangeOp::Insert, 7);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, Collection::Entries);
        assert_eq!(event.op, ChangeOp::Insert);
        assert_eq!(event.revision_id, 7);
    }

    #[tokio::test]
    async fn test_change_feed_no_subscribers_ok() {
        let feed = ChangeFeed::new(32);
        // Should not panic with nobody listening
        feed.emit(Collection::Users, ChangeOp::Update, 1);
    }
}
