// src/handlers/auth.rs
// DOCUMENTATION: Authentication endpoints
// PURPOSE: Parse requests, call AuthService, return token pairs or messages

use crate::config::Config;
use crate::errors::DirectoryError;
use crate::middleware::AuthUser;
use crate::models::{
    EmailRequest, LoginRequest, LogoutRequest, MessageResponse, RefreshTokenRequest,
    RegisterRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use crate::services::{AuthService, JwtService, KvStore, Mailer, RateLimiter, TokenBlacklist};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// POST /auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    jwt: web::Data<JwtService>,
    store: web::Data<KvStore>,
    mailer: web::Data<Mailer>,
    req: web::Json<RegisterRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let response = AuthService::register(&pool, &config, &jwt, &store, &mailer, &req).await?;
    Ok(HttpResponse::Created().json(response))
}

/// POST /auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    jwt: web::Data<JwtService>,
    limiter: web::Data<RateLimiter>,
    req: web::Json<LoginRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let response = AuthService::login(&pool, &jwt, &limiter, &req).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/refresh
pub async fn refresh(
    pool: web::Data<PgPool>,
    jwt: web::Data<JwtService>,
    blacklist: web::Data<TokenBlacklist>,
    req: web::Json<RefreshTokenRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let response = AuthService::refresh(&pool, &jwt, &blacklist, &req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/logout
pub async fn logout(
    auth: AuthUser,
    jwt: web::Data<JwtService>,
    blacklist: web::Data<TokenBlacklist>,
    body: Option<web::Json<LogoutRequest>>,
) -> Result<impl Responder, DirectoryError> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    AuthService::logout(
        &jwt,
        &blacklist,
        &auth.token,
        &auth.claims,
        body.refresh_token.as_deref(),
    )
    .await;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out")))
}

/// POST /auth/logout-all
pub async fn logout_all(
    auth: AuthUser,
    jwt: web::Data<JwtService>,
    blacklist: web::Data<TokenBlacklist>,
) -> Result<impl Responder, DirectoryError> {
    AuthService::logout_all(&jwt, &blacklist, auth.user.id).await;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out from all devices")))
}

/// POST /auth/forgot-password
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    store: web::Data<KvStore>,
    mailer: web::Data<Mailer>,
    req: web::Json<EmailRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    AuthService::forgot_password(&pool, &store, &mailer, &req.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If the email exists, a reset link has been sent",
    )))
}

/// POST /auth/reset-password
pub async fn reset_password(
    pool: web::Data<PgPool>,
    jwt: web::Data<JwtService>,
    store: web::Data<KvStore>,
    blacklist: web::Data<TokenBlacklist>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    AuthService::reset_password(&pool, &jwt, &store, &blacklist, &req).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password has been reset")))
}

/// POST /auth/resend-verification
pub async fn resend_verification(
    pool: web::Data<PgPool>,
    store: web::Data<KvStore>,
    mailer: web::Data<Mailer>,
    req: web::Json<EmailRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    AuthService::resend_verification(&pool, &store, &mailer, &req.email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "If the account needs verification, an email has been sent",
    )))
}

/// POST /auth/verify-email
pub async fn verify_email(
    pool: web::Data<PgPool>,
    store: web::Data<KvStore>,
    req: web::Json<VerifyEmailRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    AuthService::verify_email(&pool, &store, &req.token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Email verified")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/logout-all", web::post().to(logout_all))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password))
            .route("/resend-verification", web::post().to(resend_verification))
            .route("/verify-email", web::post().to(verify_email)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_logout_requires_bearer() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        for path in ["/auth/logout", "/auth/logout-all"] {
            let req = test::TestRequest::post().uri(path).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[actix_web::test]
    async fn test_register_validation_error() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "email": "nope", "password": "short" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_reset_with_unknown_token() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/auth/reset-password")
            .set_json(json!({ "token": "does-not-exist", "password": "longenough" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
