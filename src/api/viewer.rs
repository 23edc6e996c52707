//! Catalog and read-only build view endpoints. Public.

use axum::extract::{Path, State};

use super::{success, ApiResult};
use crate::catalog::Catalog;
use crate::db::BuildStore;
use crate::errors::AppError;
use crate::viewer::{resolve_view, BuildView};
use crate::AppState;

/// GET /api/catalog - The full static skill catalog.
pub async fn get_catalog(State(state): State<AppState>) -> ApiResult<Catalog> {
    success(state.catalog.as_ref().clone())
}

/// GET /api/builds/:id/view - A build resolved for read-only display:
/// active gear slots with named items, and skills with nonzero points.
pub async fn view_build(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BuildView> {
    let build = state
        .repo
        .get_build(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Build {} not found", id)))?;

    success(resolve_view(&state.catalog, &build))
}
