//! SQLite persistence: pool setup and embedded schema migration.
//!
//! The database is the store of record; everything the service shows is
//! recomputed from it on read.

mod repository;

pub use repository::*;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

/// Open (or create) the database and bring the schema up to date.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", db_path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Schema statements, applied in order; each is idempotent.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS meta (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        schema_version INTEGER NOT NULL DEFAULT 1,
        revision_id INTEGER NOT NULL DEFAULT 0,
        generated_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
     VALUES (1, 1, 0, datetime('now'))",
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        avatar TEXT,
        color TEXT,
        face INTEGER,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        member_id TEXT NOT NULL,
        task_id TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 1,
        timestamp TEXT NOT NULL,
        daily_bonus INTEGER NOT NULL DEFAULT 0,
        custom_task_name TEXT,
        custom_task_points INTEGER
    )",
    "CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_entries_member_id ON entries(member_id)",
    "CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at)",
];

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
