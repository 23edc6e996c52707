//! Configuration module for the planner backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HS256 secret for verifying identity tokens (required in production)
    pub auth_secret: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let auth_secret = env::var("PLANNER_AUTH_SECRET").ok();

        let db_path = env::var("PLANNER_DB_PATH")
            .unwrap_or_else(|_| "./data/planner.sqlite".to_string())
            .into();

        let bind_addr = env::var("PLANNER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PLANNER_BIND_ADDR format");

        let log_level = env::var("PLANNER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            auth_secret,
            db_path,
            bind_addr,
            log_level,
        }
    }
}
