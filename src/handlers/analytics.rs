// src/handlers/analytics.rs
// DOCUMENTATION: Analytics event ingestion and per-enterprise reports
// PURPOSE: Public event recording; reports for owners, staff and admins

use crate::errors::DirectoryError;
use crate::middleware::{AdminUser, AuthUser, ClientInfo};
use crate::models::{AnalyticsRangeQuery, RecordEventRequest};
use crate::services::{AnalyticsService, RateLimiter};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// POST /analytics/events
pub async fn record_event(
    pool: web::Data<PgPool>,
    limiter: web::Data<RateLimiter>,
    client: ClientInfo,
    req: web::Json<RecordEventRequest>,
) -> Result<impl Responder, DirectoryError> {
    AnalyticsService::record(&pool, &limiter, &client, &req).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /analytics/enterprise/{id}
pub async fn enterprise_report(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    query: web::Query<AnalyticsRangeQuery>,
) -> Result<impl Responder, DirectoryError> {
    let report = AnalyticsService::report(&pool, &auth.user, path.into_inner(), &query).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /analytics/enterprise/{id}/dashboard
pub async fn enterprise_dashboard(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let dashboard = AnalyticsService::dashboard(&pool, &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}

/// DELETE /analytics/enterprise/{id}
pub async fn clear_enterprise(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let deleted = AnalyticsService::clear(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/analytics")
            .route("/events", web::post().to(record_event))
            .route("/enterprise/{id}", web::get().to(enterprise_report))
            .route("/enterprise/{id}", web::delete().to(clear_enterprise))
            .route("/enterprise/{id}/dashboard", web::get().to(enterprise_dashboard)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::json_error_handler;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_unknown_event_type_rejected() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/analytics/events")
            .set_json(json!({ "enterpriseId": Uuid::new_v4(), "eventType": "purchase" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_reports_require_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;
        let id = Uuid::new_v4();

        let req = test::TestRequest::get()
            .uri(&format!("/analytics/enterprise/{}/dashboard", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri(&format!("/analytics/enterprise/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
