//! Reversible-delete protocol over the entry log.
//!
//! Deleting an entry captures its full snapshot before the store delete and
//! keeps it restorable for a short window. Restoring re-inserts the snapshot
//! under a fresh identity (a re-creation, not a rollback), so it works no
//! matter how the store mints ids. Once the window lapses the snapshot is
//! discarded and the deletion is permanent; there is no server-side trash.
//!
//! Store failures are logged and swallowed: callers always get the latest
//! successfully reloaded state, never a locally fabricated one.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{catalog, task_name, PointEntry, CUSTOM_TASK_ID};
use crate::notify::{ChangeFeed, ChangeOp, Collection, NotificationCenter, UNDO_DURATION_MS};
use crate::score::UNKNOWN_MEMBER_NAME;

struct PendingRestore {
    snapshot: PointEntry,
    expires_at: DateTime<Utc>,
}

/// Result of a delete: the refreshed entry list, plus the undo token when the
/// delete actually went through.
pub struct DeleteOutcome {
    pub entries: Vec<PointEntry>,
    pub undo_token: Option<String>,
}

/// Result of a restore: the refreshed entry list, plus the re-created entry
/// when the insert went through.
pub struct RestoreOutcome {
    pub entries: Vec<PointEntry>,
    pub entry: Option<PointEntry>,
}

/// Short-lived snapshot holder backing the undo prompts.
#[derive(Default)]
pub struct UndoCoordinator {
    pending: Mutex<HashMap<String, PendingRestore>>,
}

impl UndoCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete an entry, keeping its snapshot restorable until the undo
    /// prompt expires.
    pub async fn delete(
        &self,
        repo: &Repository,
        notifications: &NotificationCenter,
        feed: &ChangeFeed,
        entry_id: &str,
    ) -> Result<DeleteOutcome, AppError> {
        let snapshot = repo
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", entry_id)))?;

        let undo_token = match repo.delete_entry(entry_id).await {
            Ok(()) => {
                let revision_id = repo.get_revision_id().await.unwrap_or(0);
                feed.emit(Collection::Entries, ChangeOp::Delete, revision_id);

                let message = describe_deleted(repo, &snapshot).await;
                let token = self.register_snapshot(snapshot, Utc::now()).await;
                notifications.push_undo(message, token.clone()).await;
                Some(token)
            }
            Err(e) => {
                tracing::warn!("Delete of entry {} failed: {}", entry_id, e);
                None
            }
        };

        Ok(DeleteOutcome {
            entries: repo.list_entries().await?,
            undo_token,
        })
    }

    /// Restore a deleted entry from its snapshot before the window lapses.
    pub async fn restore(
        &self,
        repo: &Repository,
        feed: &ChangeFeed,
        token: &str,
    ) -> Result<RestoreOutcome, AppError> {
        let snapshot = self
            .take_snapshot(token, Utc::now())
            .await
            .ok_or_else(|| AppError::NotFound("Undo window expired".to_string()))?;

        let entry = match repo.insert_entry_snapshot(&snapshot).await {
            Ok(entry) => {
                let revision_id = repo.get_revision_id().await.unwrap_or(0);
                feed.emit(Collection::Entries, ChangeOp::Insert, revision_id);
                Some(entry)
            }
            Err(e) => {
                tracing::warn!("Restore of deleted entry failed: {}", e);
                None
            }
        };

        Ok(RestoreOutcome {
            entries: repo.list_entries().await?,
            entry,
        })
    }

    async fn register_snapshot(&self, snapshot: PointEntry, now: DateTime<Utc>) -> String {
        let token = Uuid::new_v4().to_string();
        let mut pending = self.pending.lock().await;
        pending.retain(|_, p| p.expires_at > now);
        pending.insert(
            token.clone(),
            PendingRestore {
                snapshot,
                expires_at: now + Duration::milliseconds(i64::from(UNDO_DURATION_MS)),
            },
        );
        token
    }

    async fn take_snapshot(&self, token: &str, now: DateTime<Utc>) -> Option<PointEntry> {
        let mut pending = self.pending.lock().await;
        pending.retain(|_, p| p.expires_at > now);
        pending.remove(token).map(|p| p.snapshot)
    }
}

/// Human-readable undo prompt for a deleted entry.
async fn describe_deleted(repo: &Repository, snapshot: &PointEntry) -> String {
    let cat = catalog();
    let members = repo.list_members().await.unwrap_or_default();

    let member_name = members
        .iter()
        .find(|m| m.id == snapshot.member_id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|| UNKNOWN_MEMBER_NAME.to_string());
    let task_label = if snapshot.task_id == CUSTOM_TASK_ID {
        snapshot
            .custom_task_name
            .clone()
            .unwrap_or_else(|| "Custom task".to_string())
    } else {
        task_name(&cat, &snapshot.task_id).unwrap_or_else(|| "Unknown task".to_string())
    };

    format!(
        "Deleted {} for {} ({} pts)",
        task_label,
        member_name,
        snapshot.effective_points(&cat)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PointEntry {
        PointEntry {
            id: "e1".to_string(),
            member_id: "alex@example.com".to_string(),
            task_id: "4".to_string(),
            quantity: 2,
            timestamp: Utc::now(),
            daily_bonus: true,
            custom_task_name: None,
            custom_task_points: None,
        }
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let undo = UndoCoordinator::new();
        let now = Utc::now();

        let token = undo.register_snapshot(snapshot(), now).await;
        let restored = undo.take_snapshot(&token, now).await.expect("snapshot");

        assert_eq!(restored.member_id, "alex@example.com");
        assert_eq!(restored.quantity, 2);
        assert!(restored.daily_bonus);

        // A token is single-use
        assert!(undo.take_snapshot(&token, now).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_gone() {
        let undo = UndoCoordinator::new();
        let now = Utc::now();

        let token = undo.register_snapshot(snapshot(), now).await;
        let later = now + Duration::milliseconds(i64::from(UNDO_DURATION_MS) + 1);

        assert!(undo.take_snapshot(&token, later).await.is_none());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let undo = UndoCoordinator::new();
        assert!(undo.take_snapshot("bogus", Utc::now()).await.is_none());
    }
}
