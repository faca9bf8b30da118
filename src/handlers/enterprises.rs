// src/handlers/enterprises.rs
// DOCUMENTATION: HTTP handlers for enterprise operations
// PURPOSE: Public listing and detail, owner/staff management, admin verification

use crate::config::Config;
use crate::errors::DirectoryError;
use crate::middleware::{AdminUser, AuthUser};
use crate::models::{
    AddClosedDayRequest, AssignStaffRequest, CreateEnterpriseRequest, ListEnterprisesQuery,
    MessageResponse, SetHoursRequest, UpdateEnterpriseRequest, VerifyEnterpriseRequest,
};
use crate::services::{EnterpriseService, SearchIndex};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /enterprises
/// Public list of active enterprises
pub async fn list_enterprises(
    pool: web::Data<PgPool>,
    query: web::Query<ListEnterprisesQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = EnterpriseService::list(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /enterprises/{id}
/// Detail with city, categories, hours, closed days, media and open-now flag
pub async fn get_enterprise(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let detail = EnterpriseService::get_detail(&pool, &config, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /enterprises
pub async fn create_enterprise(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    auth: AuthUser,
    req: web::Json<CreateEnterpriseRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let enterprise = EnterpriseService::create(&pool, &index, &auth.user, &req).await?;
    Ok(HttpResponse::Created().json(enterprise))
}

/// PUT /enterprises/{id}
pub async fn update_enterprise(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateEnterpriseRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let enterprise =
        EnterpriseService::update(&pool, &index, &auth.user, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(enterprise))
}

/// PUT /enterprises/{id}/verify
pub async fn verify_enterprise(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<VerifyEnterpriseRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let enterprise = EnterpriseService::verify(
        &pool,
        &index,
        admin.user(),
        path.into_inner(),
        req.verified,
        req.notes.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(enterprise))
}

/// DELETE /enterprises/{id}
pub async fn delete_enterprise(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    EnterpriseService::delete(&pool, &index, admin.user(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Enterprise deleted")))
}

/// GET /enterprises/{id}/staff
pub async fn list_staff(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let staff = EnterpriseService::list_staff(&pool, &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(staff))
}

/// POST /enterprises/{id}/staff
pub async fn assign_staff(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<AssignStaffRequest>,
) -> Result<impl Responder, DirectoryError> {
    let staff = EnterpriseService::assign_staff(&pool, &auth.user, path.into_inner(), &req).await?;
    Ok(HttpResponse::Created().json(staff))
}

/// DELETE /enterprises/{id}/staff/{userId}
pub async fn remove_staff(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, DirectoryError> {
    let (id, user_id) = path.into_inner();
    EnterpriseService::remove_staff(&pool, &auth.user, id, user_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Staff member removed")))
}

/// PUT /enterprises/{id}/hours
/// Replaces the whole weekly schedule
pub async fn set_hours(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<SetHoursRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let hours = EnterpriseService::set_hours(&pool, &auth.user, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(hours))
}

/// POST /enterprises/{id}/closed-days
pub async fn add_closed_day(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<AddClosedDayRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let day = EnterpriseService::add_closed_day(&pool, &auth.user, path.into_inner(), &req).await?;
    Ok(HttpResponse::Created().json(day))
}

/// DELETE /enterprises/{id}/closed-days/{date}
pub async fn remove_closed_day(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(Uuid, NaiveDate)>,
) -> Result<impl Responder, DirectoryError> {
    let (id, date) = path.into_inner();
    EnterpriseService::remove_closed_day(&pool, &auth.user, id, date).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Closed day removed")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/enterprises")
            .route("", web::get().to(list_enterprises))
            .route("", web::post().to(create_enterprise))
            .route("/{id}", web::get().to(get_enterprise))
            .route("/{id}", web::put().to(update_enterprise))
            .route("/{id}", web::delete().to(delete_enterprise))
            .route("/{id}/verify", web::put().to(verify_enterprise))
            .route("/{id}/staff", web::get().to(list_staff))
            .route("/{id}/staff", web::post().to(assign_staff))
            .route("/{id}/staff/{user_id}", web::delete().to(remove_staff))
            .route("/{id}/hours", web::put().to(set_hours))
            .route("/{id}/closed-days", web::post().to(add_closed_day))
            .route("/{id}/closed-days/{date}", web::delete().to(remove_closed_day)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::path_error_handler;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .app_data(web::PathConfig::default().error_handler(path_error_handler))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/enterprises/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_management_requires_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;
        let id = Uuid::new_v4();

        let req = test::TestRequest::post()
            .uri("/enterprises")
            .set_json(json!({ "name": "Mapo Galbi" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::put()
            .uri(&format!("/enterprises/{}/hours", id))
            .set_json(json!({ "hours": [] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri(&format!("/enterprises/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
