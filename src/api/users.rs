//! User directory API endpoints. Public; they feed the read-only viewer.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::db::{BuildStore, UserDirectory};
use crate::models::{Build, PublicUser};
use crate::AppState;

/// GET /api/users - List all users who have ever signed in.
///
/// Unpaginated full scan; it populates the viewer's user selector and the
/// directory stays small.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<PublicUser>> {
    let users = state.repo.list_users().await?;
    success(users)
}

/// GET /api/users/:uid/builds - List a user's builds, oldest first.
pub async fn list_user_builds(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> ApiResult<Vec<Build>> {
    let builds = state.repo.list_builds_for_user(&uid).await?;
    success(builds)
}
