// src/handlers/rbac.rs
// DOCUMENTATION: Role/permission administration

use crate::errors::DirectoryError;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{MessageResponse, RolePermissionRequest};
use crate::services::RbacService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /rbac/permissions
pub async fn list_permissions(
    pool: web::Data<PgPool>,
    _admin: AdminUser,
) -> Result<impl Responder, DirectoryError> {
    let permissions = RbacService::list_permissions(&pool).await?;
    Ok(HttpResponse::Ok().json(permissions))
}

/// POST /rbac/permissions
/// 201 for a new grant, 200 when the role already had it
pub async fn grant_permission(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<RolePermissionRequest>,
) -> Result<impl Responder, DirectoryError> {
    let created = RbacService::grant(&pool, admin.user(), &req).await?;
    let body = MessageResponse::new("Permission granted");
    if created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

/// DELETE /rbac/permissions
pub async fn revoke_permission(
    pool: web::Data<PgPool>,
    admin: AdminUser,
    req: web::Json<RolePermissionRequest>,
) -> Result<impl Responder, DirectoryError> {
    RbacService::revoke(&pool, admin.user(), &req).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Permission revoked")))
}

/// GET /rbac/me
pub async fn my_permissions(
    pool: web::Data<PgPool>,
    auth: AuthUser,
) -> Result<impl Responder, DirectoryError> {
    let response = RbacService::my_permissions(&pool, &auth.user).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/rbac")
            .route("/permissions", web::get().to(list_permissions))
            .route("/permissions", web::post().to(grant_permission))
            .route("/permissions", web::delete().to(revoke_permission))
            .route("/me", web::get().to(my_permissions)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_permissions_require_admin() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/rbac/permissions").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get().uri("/rbac/me").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
