// src/handlers/subscriptions.rs
// DOCUMENTATION: Subscription plans, per-enterprise status and feature gates

use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::ChangePlanRequest;
use crate::services::SubscriptionService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// GET /subscriptions/plans
pub async fn list_plans(pool: web::Data<PgPool>) -> Result<impl Responder, DirectoryError> {
    let plans = SubscriptionService::plans(&pool).await?;
    Ok(HttpResponse::Ok().json(plans))
}

/// GET /subscriptions/status
pub async fn my_status(
    pool: web::Data<PgPool>,
    auth: AuthUser,
) -> Result<impl Responder, DirectoryError> {
    let statuses = SubscriptionService::status_for_owner(&pool, &auth.user).await?;
    Ok(HttpResponse::Ok().json(statuses))
}

/// POST /subscriptions/enterprise/{id}/change-plan
pub async fn change_plan(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<ChangePlanRequest>,
) -> Result<impl Responder, DirectoryError> {
    let status =
        SubscriptionService::change_plan(&pool, &auth.user, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /subscriptions/enterprise/{id}/status
pub async fn enterprise_status(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let status = SubscriptionService::enterprise_status(&pool, &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /subscriptions/enterprise/{id}/feature/{feature}
pub async fn check_feature(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, String)>,
) -> Result<impl Responder, DirectoryError> {
    let (id, feature) = path.into_inner();
    let access = SubscriptionService::check_feature(&pool, &auth.user, id, &feature).await?;
    Ok(HttpResponse::Ok().json(access))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("/plans", web::get().to(list_plans))
            .route("/status", web::get().to(my_status))
            .route("/enterprise/{id}/change-plan", web::post().to(change_plan))
            .route("/enterprise/{id}/status", web::get().to(enterprise_status))
            .route("/enterprise/{id}/feature/{feature}", web::get().to(check_feature)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_status_requires_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/subscriptions/status").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri(&format!("/subscriptions/enterprise/{}/feature/analytics", Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
