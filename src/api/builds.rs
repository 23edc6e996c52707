//! Build API endpoints.
//!
//! Mutations require a verified identity and operate only on the caller's
//! own builds. Reads are public so the viewer works for signed-out visitors.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::auth::Identity;
use crate::db::BuildStore;
use crate::errors::AppError;
use crate::models::{Build, CreateBuildRequest, UpdateBuildRequest};
use crate::AppState;

/// GET /api/builds - List the caller's builds.
pub async fn list_builds(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<Build>> {
    let builds = state.repo.list_builds_for_user(&identity.uid).await?;
    success(builds)
}

/// GET /api/builds/:id - Get a single build. Public.
pub async fn get_build(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Build> {
    match state.repo.get_build(&id).await? {
        Some(build) => success(build),
        None => Err(AppError::NotFound(format!("Build {} not found", id))),
    }
}

/// POST /api/builds - Create a new build owned by the caller.
pub async fn create_build(
    State(state): State<AppState>,
    identity: Identity,
    Json(mut request): Json<CreateBuildRequest>,
) -> ApiResult<Build> {
    // Per-skill caps are enforced at save time by clamping, the only
    // validation this system does.
    state
        .catalog
        .clamp_skill_points(&request.character_id, &mut request.skill_points);

    let build = state.repo.create_build(&identity.uid, &request).await?;

    tracing::info!(user = %identity.uid, build = %build.id, "build created");
    success(build)
}

/// PUT /api/builds/:id - Merge-update one of the caller's builds.
pub async fn update_build(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(mut request): Json<UpdateBuildRequest>,
) -> ApiResult<()> {
    let existing = state
        .repo
        .get_build(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))?;

    if existing.user_id != identity.uid {
        return Err(AppError::Forbidden(
            "Builds can only be modified by their owner".to_string(),
        ));
    }

    if let Some(points) = request.skill_points.as_mut() {
        // Clamp against the character the document will have after the merge.
        let character_id = request
            .character_id
            .as_deref()
            .unwrap_or(&existing.character_id);
        state.catalog.clamp_skill_points(character_id, points);
    }

    state.repo.update_build(&id, &request).await?;

    tracing::info!(user = %identity.uid, build = %id, "build updated");
    success(())
}

/// DELETE /api/builds/:id - Delete one of the caller's builds.
pub async fn delete_build(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let existing = state
        .repo
        .get_build(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))?;

    if existing.user_id != identity.uid {
        return Err(AppError::Forbidden(
            "Builds can only be deleted by their owner".to_string(),
        ));
    }

    state.repo.delete_build(&id).await?;

    tracing::info!(user = %identity.uid, build = %id, "build deleted");
    success(())
}
