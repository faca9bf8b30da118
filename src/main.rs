// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, shared services and start the HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod middleware;
mod models;
mod services;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use errors::{json_error_handler, path_error_handler, query_error_handler};
use handlers::ServerStart;
use middleware::throttle::{start_prune_task, throttle};
use middleware::IpThrottle;
use services::media_service::start_media_cleanup_task;
use services::{
    start_cleanup_task, JwtService, KvStore, Mailer, ObjectStorage, RateLimiter, SearchIndex,
    TokenBlacklist,
};
use std::io;
use std::time::Instant;

/// Request bodies above this size are rejected with 413
const JSON_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging, then validate configuration
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", config.log_filter());
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        if config.is_production() {
            std::process::exit(1);
        }
    }

    log::info!("Starting koreabiz-directory v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Key-value store (Redis, or in-memory when unavailable)
    let store = KvStore::new(config::init_redis(&config).await);
    start_cleanup_task(store.clone(), 300);
    log::info!(
        "Key-value store ready (backend: {})",
        if store.uses_redis() { "redis" } else { "memory" }
    );

    // 6. Shared services
    let jwt = web::Data::new(JwtService::new(&config));
    let blacklist = web::Data::new(TokenBlacklist::new(store.clone()));
    let limiter = web::Data::new(RateLimiter::new(store.clone()));
    let mailer = web::Data::new(Mailer::new(&config));

    let storage = match ObjectStorage::new(&config) {
        Ok(storage) => web::Data::new(storage),
        Err(e) => {
            log::error!("Failed to initialize object storage: {}", e);
            std::process::exit(1);
        }
    };
    start_media_cleanup_task(pool.clone(), storage.clone().into_inner(), 86_400);
    log::info!("Started media purge task (interval: 24 hours)");

    let index = web::Data::new(SearchIndex::new(&config));
    if let Some(client) = index.client() {
        if let Err(e) = client.configure_index().await {
            log::warn!("Failed to configure search index: {}", e);
        }
    }

    let ip_throttle = web::Data::new(IpThrottle::new(
        config.rate_limit_per_second,
        config.rate_limit_burst,
    ));
    start_prune_task(ip_throttle.clone(), 60);

    let started = web::Data::new(ServerStart(Instant::now()));
    let store = web::Data::new(store);

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_clone = config.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config_clone.frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(store.clone())
            .app_data(jwt.clone())
            .app_data(blacklist.clone())
            .app_data(limiter.clone())
            .app_data(mailer.clone())
            .app_data(storage.clone())
            .app_data(index.clone())
            .app_data(ip_throttle.clone())
            .app_data(started.clone())
            // Extractor error mapping
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_LIMIT_BYTES)
                    .error_handler(json_error_handler),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            // Middleware (last wrap runs first)
            .wrap(actix_web::middleware::from_fn(throttle))
            .wrap(actix_web::middleware::Compress::default())
            .wrap(cors)
            .wrap(Logger::new("%a \"%r\" %s %b %Dms \"%{User-Agent}i\""))
            // Routes
            .service(
                web::scope("/v1")
                    .configure(handlers::health_config)
                    .configure(handlers::auth_config)
                    .configure(handlers::users_config)
                    .configure(handlers::rbac_config)
                    .configure(handlers::taxonomy_config)
                    .configure(handlers::enterprises_config)
                    .configure(handlers::reviews_config)
                    .configure(handlers::claims_config)
                    .configure(handlers::subscriptions_config)
                    .configure(handlers::favorites_config)
                    .configure(handlers::analytics_config)
                    .configure(handlers::media_config)
                    .configure(handlers::search_config)
                    .configure(handlers::audit_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind(&server_addr)?
    .run()
    .await
}
