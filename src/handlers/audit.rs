// src/handlers/audit.rs
// DOCUMENTATION: Audit log browsing and retention (admin only)

use crate::errors::DirectoryError;
use crate::middleware::AdminUser;
use crate::models::{ClearAuditLogsQuery, ListAuditLogsQuery, MessageResponse};
use crate::services::AuditService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// GET /audit/logs
pub async fn list_logs(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<ListAuditLogsQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = AuditService::list(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /audit/logs/{id}
pub async fn get_log(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let log = AuditService::get(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(log))
}

/// DELETE /audit/logs/{id}
pub async fn delete_log(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    AuditService::delete(&pool, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Audit log deleted")))
}

/// DELETE /audit/logs?days=90
pub async fn clear_logs(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
    query: web::Query<ClearAuditLogsQuery>,
) -> Result<impl Responder, DirectoryError> {
    let deleted = AuditService::clear_older_than(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(deleted))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/audit/logs")
            .route("", web::get().to(list_logs))
            .route("", web::delete().to(clear_logs))
            .route("/{id}", web::get().to(get_log))
            .route("/{id}", web::delete().to(delete_log)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_audit_requires_admin() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::delete().uri("/audit/logs?days=30").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
