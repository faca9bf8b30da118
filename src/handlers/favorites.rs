// src/handlers/favorites.rs

use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::{AddFavoriteRequest, MessageResponse};
use crate::services::FavoriteService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// POST /favorites
pub async fn add_favorite(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    req: web::Json<AddFavoriteRequest>,
) -> Result<impl Responder, DirectoryError> {
    let favorite = FavoriteService::add(&pool, &auth.user, req.enterprise_id).await?;
    Ok(HttpResponse::Created().json(favorite))
}

/// DELETE /favorites/{enterpriseId}
pub async fn remove_favorite(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    FavoriteService::remove(&pool, &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Removed from favorites")))
}

/// GET /favorites
pub async fn list_favorites(
    pool: web::Data<PgPool>,
    auth: AuthUser,
) -> Result<impl Responder, DirectoryError> {
    let favorites = FavoriteService::list(&pool, &auth.user).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorites")
            .route("", web::post().to(add_favorite))
            .route("", web::get().to(list_favorites))
            .route("/{enterprise_id}", web::delete().to(remove_favorite)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_favorites_require_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/favorites")
            .set_json(json!({ "enterpriseId": Uuid::new_v4() }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
