// src/handlers/media.rs
// DOCUMENTATION: Enterprise media endpoints
// PURPOSE: Presigned uploads straight to object storage, then registration
// of the uploaded key

use crate::config::Config;
use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::{MessageResponse, PresignRequest, RegisterMediaRequest};
use crate::services::{MediaService, ObjectStorage};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /media/enterprises/{id}/presigned
pub async fn presign_upload(
    pool: web::Data<PgPool>,
    storage: web::Data<ObjectStorage>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<PresignRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let presigned =
        MediaService::presign(&pool, &storage, &auth.user, path.into_inner(), &req).await?;
    Ok(HttpResponse::Ok().json(presigned))
}

/// POST /media/enterprises/{id}/register
pub async fn register_media(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    storage: web::Data<ObjectStorage>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    req: web::Json<RegisterMediaRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let media = MediaService::register(
        &pool,
        &config,
        &storage,
        &auth.user,
        path.into_inner(),
        &req,
    )
    .await?;
    Ok(HttpResponse::Created().json(media))
}

/// GET /media/enterprises/{id}
pub async fn list_media(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    storage: web::Data<ObjectStorage>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, DirectoryError> {
    let media =
        MediaService::list(&pool, &config, &storage, &auth.user, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(media))
}

/// DELETE /media/enterprises/{id}/{mediaId}
pub async fn delete_media(
    pool: web::Data<PgPool>,
    storage: web::Data<ObjectStorage>,
    auth: AuthUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, DirectoryError> {
    let (id, media_id) = path.into_inner();
    MediaService::delete(&pool, &storage, &auth.user, id, media_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Media deleted")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/media/enterprises/{id}")
            .route("", web::get().to(list_media))
            .route("/presigned", web::post().to(presign_upload))
            .route("/register", web::post().to(register_media))
            .route("/{media_id}", web::delete().to(delete_media)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_upload_requires_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/media/enterprises/{}/presigned", Uuid::new_v4()))
            .set_json(json!({
                "fileName": "front.jpg",
                "fileType": "image/jpeg",
                "contentType": "image/jpeg",
                "fileSize": 1024,
                "mediaType": "GALLERY"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
