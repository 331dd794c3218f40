//! Database repository for CRUD operations.
//!
//! Uses prepared statements for data integrity. Every committed write bumps
//! the revision counter so clients can cheaply detect remote changes.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::avatar;
use crate::errors::AppError;
use crate::models::{
    catalog, CreateEntryRequest, Datastore, PointEntry, RevisionInfo, TeamMember,
    UpdateEntryRequest, UpdateProfileRequest,
};
use crate::score::window;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let members = self.list_members().await?;
        let entries = self.list_entries().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            members,
            tasks: catalog(),
            entries,
        })
    }

    // ==================== MEMBER OPERATIONS ====================

    /// List all members in creation order.
    pub async fn list_members(&self) -> Result<Vec<TeamMember>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, avatar, color, face, created_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(member_from_row).collect())
    }

    /// Get a member by ID.
    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        let row =
            sqlx::query("SELECT id, name, avatar, color, face, created_at FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(member_from_row))
    }

    /// Upsert a member on sign-in.
    ///
    /// First registration assigns a color and avatar face from the fixed
    /// palette; re-registration only refreshes the display name. Returns the
    /// member and whether it was newly created.
    pub async fn register_member(
        &self,
        id: &str,
        name: &str,
    ) -> Result<(TeamMember, bool), AppError> {
        if let Some(existing) = self.get_member(id).await? {
            if existing.name == name {
                return Ok((existing, false));
            }
            sqlx::query("UPDATE users SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&self.pool)
                .await?;
            self.increment_revision().await?;
            return Ok((
                TeamMember {
                    name: name.to_string(),
                    ..existing
                },
                false,
            ));
        }

        // Round-robin allocation reads the full directory; fine for small teams.
        let members = self.list_members().await?;
        let (color, face) = avatar::assign(&members);
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, name, avatar, color, face, created_at) VALUES (?, ?, NULL, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(&color)
        .bind(face as i64)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok((
            TeamMember {
                id: id.to_string(),
                name: name.to_string(),
                avatar: None,
                color: Some(color),
                face: Some(face),
                created_at: now,
            },
            true,
        ))
    }

    /// Update a member's avatar customization (color/face only).
    pub async fn update_profile(
        &self,
        id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<TeamMember, AppError> {
        let existing = self
            .get_member(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        let color = request.color.clone().or(existing.color.clone());
        let face = request.face.or(existing.face);

        sqlx::query("UPDATE users SET color = ?, face = ? WHERE id = ?")
            .bind(&color)
            .bind(face.map(|f| f as i64))
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;

        Ok(TeamMember {
            color,
            face,
            ..existing
        })
    }

    // ==================== ENTRY OPERATIONS ====================

    /// List all entries, newest first.
    pub async fn list_entries(&self) -> Result<Vec<PointEntry>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, member_id, task_id, quantity, timestamp, daily_bonus,
                      custom_task_name, custom_task_points
               FROM entries ORDER BY timestamp DESC, id DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Get an entry by ID.
    pub async fn get_entry(&self, id: &str) -> Result<Option<PointEntry>, AppError> {
        let row = sqlx::query(
            r#"SELECT id, member_id, task_id, quantity, timestamp, daily_bonus,
                      custom_task_name, custom_task_points
               FROM entries WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(entry_from_row))
    }

    /// Create a new entry, flagging the daily bonus at write time.
    ///
    /// The first-entry-of-the-day check is a read followed by a write with no
    /// lock in between. Two near-simultaneous submissions by the same member
    /// can both earn the bonus; accepted for small-team usage.
    pub async fn insert_entry(&self, request: &CreateEntryRequest) -> Result<PointEntry, AppError> {
        let timestamp = request.timestamp.unwrap_or_else(Utc::now);
        let daily_bonus = !self
            .member_has_entry_on_day(&request.member_id, timestamp)
            .await?;

        let entry = PointEntry {
            id: Uuid::now_v7().to_string(),
            member_id: request.member_id.clone(),
            task_id: request.task_id.clone(),
            quantity: request.quantity,
            timestamp,
            daily_bonus,
            custom_task_name: request.custom_task_name.clone(),
            custom_task_points: request.custom_task_points,
        };

        self.write_entry(&entry).await?;
        self.increment_revision().await?;

        Ok(entry)
    }

    /// Re-insert a deleted entry from its snapshot under a fresh identity.
    ///
    /// Every field except the id is preserved, including the original
    /// timestamp and daily-bonus flag; the bonus check is not re-run.
    pub async fn insert_entry_snapshot(
        &self,
        snapshot: &PointEntry,
    ) -> Result<PointEntry, AppError> {
        let entry = PointEntry {
            id: Uuid::now_v7().to_string(),
            ..snapshot.clone()
        };

        self.write_entry(&entry).await?;
        self.increment_revision().await?;

        Ok(entry)
    }

    /// Update an entry in place (member/task/quantity only).
    pub async fn update_entry(
        &self,
        id: &str,
        request: &UpdateEntryRequest,
    ) -> Result<PointEntry, AppError> {
        let existing = self
            .get_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", id)))?;

        let member_id = request.member_id.as_ref().unwrap_or(&existing.member_id);
        let task_id = request.task_id.as_ref().unwrap_or(&existing.task_id);
        let quantity = request.quantity.unwrap_or(existing.quantity);

        sqlx::query("UPDATE entries SET member_id = ?, task_id = ?, quantity = ? WHERE id = ?")
            .bind(member_id)
            .bind(task_id)
            .bind(quantity as i64)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;

        Ok(PointEntry {
            member_id: member_id.clone(),
            task_id: task_id.clone(),
            quantity,
            ..existing
        })
    }

    /// Delete an entry.
    pub async fn delete_entry(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Entry {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Whether the member already has an entry on the given timestamp's day.
    async fn member_has_entry_on_day(
        &self,
        member_id: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let (day_start, day_end) = window::day_bounds(at);
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM entries WHERE member_id = ? AND timestamp >= ? AND timestamp < ?",
        )
        .bind(member_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        let n: i64 = row.get("n");
        Ok(n > 0)
    }

    async fn write_entry(&self, entry: &PointEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO entries (
                id, member_id, task_id, quantity, timestamp, daily_bonus,
                custom_task_name, custom_task_points
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&entry.id)
        .bind(&entry.member_id)
        .bind(&entry.task_id)
        .bind(entry.quantity as i64)
        .bind(entry.timestamp)
        .bind(entry.daily_bonus as i32)
        .bind(&entry.custom_task_name)
        .bind(entry.custom_task_points.map(|p| p as i64))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// Helper functions for row conversion

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    let face: Option<i64> = row.get("face");
    TeamMember {
        id: row.get("id"),
        name: row.get("name"),
        avatar: row.get("avatar"),
        color: row.get("color"),
        face: face.map(|f| f as u32),
        created_at: row.get("created_at"),
    }
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> PointEntry {
    let quantity: i64 = row.get("quantity");
    let daily_bonus: i32 = row.get("daily_bonus");
    let custom_task_points: Option<i64> = row.get("custom_task_points");
    PointEntry {
        id: row.get("id"),
        member_id: row.get("member_id"),
        task_id: row.get("task_id"),
        quantity: quantity as u32,
        timestamp: row.get("timestamp"),
        daily_bonus: daily_bonus != 0,
        custom_task_name: row.get("custom_task_name"),
        custom_task_points: custom_task_points.map(|p| p as u32),
    }
}
