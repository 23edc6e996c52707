//! Vault Hunter Build Planner Backend
//!
//! REST backend for a character build planner: users manage skill-point and
//! gear-loadout builds tied to their account, and anyone can browse saved
//! builds read-only. SQLite persistence, bearer-token identity.
//!
//! The [`editor`] and [`viewer`] modules are the client-side state
//! controllers, exposed as library API over the same store traits the
//! server implements.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod editor;
pub mod errors;
pub mod models;
pub mod viewer;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenVerifier;
use catalog::Catalog;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub catalog: Arc<Catalog>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let verifier = Arc::new(TokenVerifier::new(state.config.auth_secret.clone()));

    // API routes. Reads are public (the viewer works signed-out); the
    // identity layer attaches the caller's identity where a valid bearer
    // token is present, and mutating handlers require it.
    let api_routes = Router::new()
        // Session
        .route("/session", post(api::sign_in))
        // Builds
        .route("/builds", get(api::list_builds))
        .route("/builds", post(api::create_build))
        .route("/builds/{id}", get(api::get_build))
        .route("/builds/{id}", put(api::update_build))
        .route("/builds/{id}", delete(api::delete_build))
        .route("/builds/{id}/view", get(api::view_build))
        // Users (viewer directory)
        .route("/users", get(api::list_users))
        .route("/users/{uid}/builds", get(api::list_user_builds))
        // Catalog
        .route("/catalog", get(api::get_catalog))
        // Apply identity middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::identity_layer(verifier.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
