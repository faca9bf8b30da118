// src/handlers/health.rs
// DOCUMENTATION: Health check handlers
// PURPOSE: Liveness, readiness and dependency status for load balancers and ops

use crate::services::{HealthService, KvStore, SearchIndex};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::time::Instant;

/// Process start time, registered once as app data
pub struct ServerStart(pub Instant);

/// GET /
pub async fn banner() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "service": "koreabiz-directory",
        "message": "KoreaBiz Directory API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /app/version
pub async fn app_version() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "updateRequired": false
    }))
}

/// GET /health
/// DOCUMENTATION: Always 200; `status` is "degraded" when a configured dependency is down
pub async fn health_check(
    pool: web::Data<PgPool>,
    store: web::Data<KvStore>,
    index: web::Data<SearchIndex>,
    start: web::Data<ServerStart>,
) -> impl Responder {
    let report = HealthService::report(pool.get_ref(), store.get_ref(), index.get_ref(), start.0).await;
    HttpResponse::Ok().json(report)
}

/// GET /health/ready
pub async fn readiness(pool: web::Data<PgPool>) -> impl Responder {
    if HealthService::is_ready(pool.get_ref()).await {
        HttpResponse::Ok().json(json!({ "status": "ready" }))
    } else {
        HttpResponse::ServiceUnavailable().json(json!({ "status": "not ready" }))
    }
}

/// GET /health/live
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "alive" }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(banner))
        .route("/app/version", web::get().to(app_version))
        .route("/health", web::get().to(health_check))
        .route("/health/ready", web::get().to(readiness))
        .route("/health/live", web::get().to(liveness));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_liveness_and_version() {
        let app = test::init_service(App::new().configure(config)).await;

        let req = test::TestRequest::get().uri("/health/live").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "alive");

        let req = test::TestRequest::get().uri("/app/version").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["updateRequired"], false);
    }

    #[actix_web::test]
    async fn test_degraded_without_database() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(crate::test_support::lazy_pool()))
                .app_data(web::Data::new(KvStore::in_memory()))
                .app_data(web::Data::new(SearchIndex::disabled()))
                .app_data(web::Data::new(ServerStart(Instant::now())))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["database"]["status"], "down");
        assert_eq!(body["checks"]["redis"]["status"], "disabled");

        let req = test::TestRequest::get().uri("/health/ready").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
