//! Database module for SQLite persistence.
//!
//! SQLite backs the two logical document collections, `builds` and `users`.
//! The [`BuildStore`] and [`UserDirectory`] traits are the seams between the
//! controllers and the store: the editor and viewer hold `Arc<dyn …>` so
//! tests can substitute in-memory fakes.

#[cfg(test)]
pub mod memory;
mod repository;

pub use repository::*;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{Build, CreateBuildRequest, PublicUser, UpdateBuildRequest};

/// CRUD over the `builds` collection.
///
/// No transactions and no concurrency tokens: two concurrent updates to the
/// same build silently overwrite each other, last write wins.
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Persist a new build owned by `user_id`; returns it with the
    /// store-assigned id and creation timestamp.
    async fn create_build(
        &self,
        user_id: &str,
        request: &CreateBuildRequest,
    ) -> Result<Build, AppError>;

    /// All builds owned by `user_id`, oldest first (created_at, then id).
    async fn list_builds_for_user(&self, user_id: &str) -> Result<Vec<Build>, AppError>;

    /// Fetch a single build by id.
    async fn get_build(&self, id: &str) -> Result<Option<Build>, AppError>;

    /// Merge the provided fields into an existing build. Performs no cap
    /// validation; the caller is responsible for the skill point invariants.
    async fn update_build(&self, id: &str, request: &UpdateBuildRequest) -> Result<(), AppError>;

    /// Delete a build by id.
    async fn delete_build(&self, id: &str) -> Result<(), AppError>;
}

/// CRUD over the `users` collection.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Idempotent merge-write keyed by uid, invoked once per sign-in.
    async fn upsert_user(&self, user: &PublicUser) -> Result<(), AppError>;

    /// Full unpaginated scan, ordered by display name. Fine at the scale of
    /// the viewer's user selector.
    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError>;
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run embedded migrations
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create tables if they don't exist. The structured build fields
    // (skill points, gear, active gear) are stored as JSON text columns,
    // keeping each build a single atomic document.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS builds (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            character_id TEXT NOT NULL,
            skill_points TEXT NOT NULL DEFAULT '{}',
            gear TEXT NOT NULL DEFAULT '{}',
            active_gear TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            uid TEXT PRIMARY KEY,
            display_name TEXT,
            email TEXT,
            photo_url TEXT,
            last_sign_in_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Index for the per-user listing, which is the hot query
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_builds_user_id ON builds(user_id, created_at, id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
