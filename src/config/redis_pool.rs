// src/config/redis_pool.rs
// DOCUMENTATION: Redis connection initialization
// PURPOSE: Build the shared connection manager used by the key-value store

use crate::config::Config;
use redis::aio::ConnectionManager;

/// Connect to Redis when REDIS_URL is configured
/// DOCUMENTATION: Returns None (in-memory fallback) when unconfigured or unreachable,
/// so the API keeps serving without Redis
pub async fn init_redis(config: &Config) -> Option<ConnectionManager> {
    let url = config.redis_url.as_deref()?;

    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Invalid REDIS_URL: {}", e);
            return None;
        }
    };

    match client.get_connection_manager().await {
        Ok(manager) => {
            log::info!("Connected to Redis");
            Some(manager)
        }
        Err(e) => {
            log::warn!("Redis unavailable, using in-memory store: {}", e);
            None
        }
    }
}
