//! SQLite repository implementing the store traits.
//!
//! Uses prepared statements throughout. Documents are flat rows with JSON
//! text columns for the structured build fields.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{BuildStore, UserDirectory};
use crate::errors::AppError;
use crate::models::{Build, CreateBuildRequest, PublicUser, UpdateBuildRequest};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildStore for Repository {
    async fn create_build(
        &self,
        user_id: &str,
        request: &CreateBuildRequest,
    ) -> Result<Build, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let skill_points_json = serde_json::to_string(&request.skill_points)?;
        let gear_json = serde_json::to_string(&request.gear)?;
        let active_gear_json = serde_json::to_string(&request.active_gear)?;

        sqlx::query(
            "INSERT INTO builds (id, user_id, name, character_id, skill_points, gear, active_gear, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(user_id)
        .bind(&request.name)
        .bind(&request.character_id)
        .bind(&skill_points_json)
        .bind(&gear_json)
        .bind(&active_gear_json)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Build {
            id,
            user_id: user_id.to_string(),
            name: request.name.clone(),
            character_id: request.character_id.clone(),
            skill_points: request.skill_points.clone(),
            gear: request.gear.clone(),
            active_gear: request.active_gear.clone(),
            created_at: now,
        })
    }

    async fn list_builds_for_user(&self, user_id: &str) -> Result<Vec<Build>, AppError> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, character_id, skill_points, gear, active_gear, created_at \
             FROM builds WHERE user_id = ? ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(build_from_row).collect())
    }

    async fn get_build(&self, id: &str) -> Result<Option<Build>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, name, character_id, skill_points, gear, active_gear, created_at \
             FROM builds WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(build_from_row))
    }

    async fn update_build(&self, id: &str, request: &UpdateBuildRequest) -> Result<(), AppError> {
        let existing = self
            .get_build(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))?;

        // Field-level merge: provided fields replace, omitted fields stay.
        let name = request.name.as_ref().unwrap_or(&existing.name);
        let character_id = request
            .character_id
            .as_ref()
            .unwrap_or(&existing.character_id);
        let skill_points = request
            .skill_points
            .as_ref()
            .unwrap_or(&existing.skill_points);
        let gear = request.gear.as_ref().unwrap_or(&existing.gear);
        let active_gear = request.active_gear.as_ref().unwrap_or(&existing.active_gear);

        let skill_points_json = serde_json::to_string(skill_points)?;
        let gear_json = serde_json::to_string(gear)?;
        let active_gear_json = serde_json::to_string(active_gear)?;

        sqlx::query(
            "UPDATE builds SET name = ?, character_id = ?, skill_points = ?, gear = ?, active_gear = ? WHERE id = ?"
        )
        .bind(name)
        .bind(character_id)
        .bind(&skill_points_json)
        .bind(&gear_json)
        .bind(&active_gear_json)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_build(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM builds WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Build {} not found", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl UserDirectory for Repository {
    async fn upsert_user(&self, user: &PublicUser) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO users (uid, display_name, email, photo_url, last_sign_in_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(uid) DO UPDATE SET
                   display_name = excluded.display_name,
                   email = excluded.email,
                   photo_url = excluded.photo_url,
                   last_sign_in_at = excluded.last_sign_in_at"#,
        )
        .bind(&user.uid)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(&user.photo_url)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        let rows = sqlx::query(
            "SELECT uid, display_name, email, photo_url FROM users \
             ORDER BY COALESCE(display_name, uid)",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PublicUser {
                uid: row.get("uid"),
                display_name: row.get("display_name"),
                email: row.get("email"),
                photo_url: row.get("photo_url"),
            })
            .collect())
    }
}

fn build_from_row(row: &SqliteRow) -> Build {
    let skill_points_json: String = row.get("skill_points");
    let gear_json: String = row.get("gear");
    let active_gear_json: String = row.get("active_gear");

    Build {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        character_id: row.get("character_id"),
        skill_points: serde_json::from_str(&skill_points_json).unwrap_or_default(),
        gear: serde_json::from_str(&gear_json).unwrap_or_default(),
        active_gear: serde_json::from_str(&active_gear_json).unwrap_or_default(),
        created_at: row.get("created_at"),
    }
}
