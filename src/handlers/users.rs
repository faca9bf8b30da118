// src/handlers/users.rs
// DOCUMENTATION: Profile endpoints for the signed-in user

use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::UpdateProfileRequest;
use crate::services::UserService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// GET /users/me
pub async fn me(auth: AuthUser) -> Result<impl Responder, DirectoryError> {
    Ok(HttpResponse::Ok().json(auth.user.to_response()))
}

/// PUT /users/me
pub async fn update_me(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    req: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let user = UserService::update_me(&pool, &auth.user, &req).await?;
    Ok(HttpResponse::Ok().json(user))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/me", web::get().to(me))
            .route("/me", web::put().to(update_me)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_me_requires_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/users/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/users/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
