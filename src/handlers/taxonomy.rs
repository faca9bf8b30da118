// src/handlers/taxonomy.rs
// DOCUMENTATION: Category and city endpoints
// PURPOSE: Identical surfaces under /categories and /cities, one set of handlers
// parameterised by TaxonomyKind

use crate::errors::DirectoryError;
use crate::middleware::AdminUser;
use crate::models::{
    CreateTaxonRequest, ListTaxaQuery, MessageResponse, TaxonomyKind, UpdateTaxonRequest,
};
use crate::services::TaxonomyService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /{kind}
pub async fn list(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    query: web::Query<ListTaxaQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = TaxonomyService::list(&pool, **kind, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /{kind}/all
pub async fn all(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
) -> Result<impl Responder, DirectoryError> {
    let rows = TaxonomyService::all(&pool, **kind).await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /{kind}/{idOrSlug}
pub async fn get(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    path: web::Path<String>,
) -> Result<impl Responder, DirectoryError> {
    let row = TaxonomyService::get(&pool, **kind, &path).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// GET /{kind}/slug/{slug}
pub async fn get_by_slug(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    path: web::Path<String>,
) -> Result<impl Responder, DirectoryError> {
    let row = TaxonomyService::get_by_slug(&pool, **kind, &path).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// POST /{kind}
pub async fn create(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    _admin: AdminUser,
    req: web::Json<CreateTaxonRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let row = TaxonomyService::create(&pool, **kind, &req).await?;
    Ok(HttpResponse::Created().json(row))
}

/// PUT /{kind}/{id}
pub async fn update(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateTaxonRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let row = TaxonomyService::update(&pool, **kind, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(row))
}

/// DELETE /{kind}/{id}
pub async fn delete(
    pool: web::Data<PgPool>,
    kind: web::Data<TaxonomyKind>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    TaxonomyService::delete(&pool, **kind, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(format!("{} deleted", kind.label()))))
}

fn scope(path: &str, kind: TaxonomyKind) -> actix_web::Scope {
    web::scope(path)
        .app_data(web::Data::new(kind))
        .route("", web::get().to(list))
        .route("", web::post().to(create))
        .route("/all", web::get().to(all))
        .route("/slug/{slug}", web::get().to(get_by_slug))
        .route("/{id}", web::get().to(get))
        .route("/{id}", web::put().to(update))
        .route("/{id}", web::delete().to(delete))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(scope("/categories", TaxonomyKind::Category))
        .service(scope("/cities", TaxonomyKind::City));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_writes_require_admin() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/categories")
            .set_json(json!({ "name": "Cafe" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::delete()
            .uri(&format!("/cities/{}", Uuid::new_v4()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
