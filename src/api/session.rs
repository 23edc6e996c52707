//! Session API endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::auth::Identity;
use crate::db::UserDirectory;
use crate::models::PublicUser;
use crate::AppState;

/// POST /api/session - Sign-in hook.
///
/// Called by the client once per successful sign-in at the identity
/// provider; merge-writes the caller's public profile into the `users`
/// collection so the viewer can list them. Idempotent.
pub async fn sign_in(State(state): State<AppState>, identity: Identity) -> ApiResult<PublicUser> {
    let user = identity.to_public_user();
    state.repo.upsert_user(&user).await?;

    tracing::info!(user = %user.uid, "signed in");
    success(user)
}
