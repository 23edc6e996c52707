use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use planner_backend::catalog::Catalog;
use planner_backend::config::Config;
use planner_backend::db::{self, Repository};
use planner_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Build Planner Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if token verification is not configured
    if config.auth_secret.is_none() {
        tracing::warn!(
            "No auth secret configured (PLANNER_AUTH_SECRET). Identity tokens are not verified!"
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Build the static skill catalog once; persisted builds reference
    // skills by generated id, so generation must stay deterministic
    let catalog = Arc::new(Catalog::generate());
    tracing::info!(
        "Skill catalog generated for {} characters",
        catalog.characters.len()
    );

    // Create application state
    let state = AppState {
        repo,
        catalog,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
