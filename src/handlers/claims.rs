// src/handlers/claims.rs
// DOCUMENTATION: Ownership claim endpoints for signed-in users

use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::{ListClaimsQuery, SubmitClaimRequest};
use crate::services::{ClaimService, Mailer, RateLimiter};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /claims
pub async fn submit_claim(
    pool: web::Data<PgPool>,
    limiter: web::Data<RateLimiter>,
    mailer: web::Data<Mailer>,
    auth: AuthUser,
    req: web::Json<SubmitClaimRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let claim = ClaimService::submit(&pool, &limiter, &mailer, &auth.user, &req).await?;
    Ok(HttpResponse::Created().json(claim))
}

/// GET /claims
pub async fn my_claims(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    query: web::Query<ListClaimsQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = ClaimService::list_mine(&pool, &auth.user, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/claims")
            .route("", web::post().to(submit_claim))
            .route("", web::get().to(my_claims)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_claims_require_auth() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/claims").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }
}
