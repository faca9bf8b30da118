// src/config/db.rs
// DOCUMENTATION: Database connection pool initialization
// PURPOSE: Setup PostgreSQL connection pool and apply schema migrations

use crate::config::Config;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Initialize PostgreSQL connection pool
/// DOCUMENTATION: Creates connection pool with optimal settings
/// Called once during application startup in main.rs
/// Applies embedded migrations from ./migrations when RUN_MIGRATIONS is set
pub async fn init_db_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    log::info!("Initializing database pool");

    let pool = PgPoolOptions::new()
        // Maximum concurrent connections
        .max_connections(config.db_max_connections)
        // Timeout waiting for connection from pool
        .acquire_timeout(Duration::from_secs(config.db_connection_timeout))
        // Connection idle timeout (5 minutes)
        .idle_timeout(Duration::from_secs(300))
        // Connection lifetime (30 minutes before recycle)
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    if config.run_migrations {
        log::info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    log::info!("Database pool initialized successfully");
    Ok(pool)
}
