// src/middleware/auth.rs
// DOCUMENTATION: Authentication extractors
// PURPOSE: Resolve the bearer token into an active user before handlers run
//
// Order of checks: bearer present -> not blacklisted -> signature/expiry ->
// user exists and is active -> not issued before a logout-all.

use crate::db::UserRepository;
use crate::errors::DirectoryError;
use crate::models::{User, UserRole};
use crate::services::jwt::{Claims, JwtService};
use crate::services::TokenBlacklist;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use sqlx::PgPool;
use std::future::Future;
use std::pin::Pin;

type ExtractFuture<T> = Pin<Box<dyn Future<Output = Result<T, DirectoryError>>>>;

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    /// Raw bearer token, kept for logout
    pub token: String,
    pub claims: Claims,
}

/// Caller who may be anonymous; a present but bad token still fails with 401
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

/// Authenticated caller with the ADMIN role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl AdminUser {
    pub fn user(&self) -> &User {
        &self.0.user
    }
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn app_state<T: 'static>(req: &HttpRequest) -> Result<web::Data<T>, DirectoryError> {
    req.app_data::<web::Data<T>>().cloned().ok_or_else(|| {
        log::error!("{} not registered as app data", std::any::type_name::<T>());
        DirectoryError::InternalError("Authentication is not configured".to_string())
    })
}

async fn authenticate(req: HttpRequest, token: String) -> Result<AuthUser, DirectoryError> {
    let pool = app_state::<PgPool>(&req)?;
    let jwt = app_state::<JwtService>(&req)?;
    let blacklist = app_state::<TokenBlacklist>(&req)?;

    if blacklist.is_blacklisted(&token).await {
        return Err(DirectoryError::Unauthorized("Token has been revoked".to_string()));
    }
    let claims = jwt.verify_access(&token)?;

    let user = UserRepository::find_by_id(pool.get_ref(), claims.sub)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| DirectoryError::Unauthorized("User not found or inactive".to_string()))?;

    if blacklist.is_logged_out(user.id, claims.iat).await {
        return Err(DirectoryError::Unauthorized("Session has been terminated".to_string()));
    }

    Ok(AuthUser { user, token, claims })
}

impl FromRequest for AuthUser {
    type Error = DirectoryError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let token = bearer_token(&req)
                .ok_or_else(|| DirectoryError::Unauthorized("Missing bearer token".to_string()))?;
            authenticate(req, token).await
        })
    }
}

impl FromRequest for OptionalAuthUser {
    type Error = DirectoryError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            match bearer_token(&req) {
                Some(token) => Ok(OptionalAuthUser(Some(authenticate(req, token).await?))),
                None => Ok(OptionalAuthUser(None)),
            }
        })
    }
}

impl FromRequest for AdminUser {
    type Error = DirectoryError;
    type Future = ExtractFuture<Self>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = AuthUser::from_request(req, payload);
        Box::pin(async move {
            let auth = auth.await?;
            if auth.user.role != UserRole::Admin {
                return Err(DirectoryError::Forbidden("Admin access required".to_string()));
            }
            Ok(AdminUser(auth))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer "))
            .to_http_request();
        assert!(bearer_token(&req).is_none());
    }

    #[actix_web::test]
    async fn test_missing_token_rejected_without_state() {
        // No app data registered: the header check must fail first
        let (req, mut payload) = TestRequest::default().to_http_parts();
        let err = AuthUser::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthorized(_)));

        let err = AdminUser::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthorized(_)));

        let anon = OptionalAuthUser::from_request(&req, &mut payload).await.unwrap();
        assert!(anon.0.is_none());
    }

    #[actix_web::test]
    async fn test_blacklisted_token_rejected() {
        let store = crate::services::KvStore::in_memory();
        let blacklist = TokenBlacklist::new(store);
        let jwt = JwtService::from_secrets("access", "refresh", 900, 3600);
        let pair = jwt.issue_pair(uuid::Uuid::new_v4(), "a@koreabiz.kr").unwrap();
        let claims = jwt.verify_access(&pair.access_token).unwrap();
        blacklist.blacklist(&pair.access_token, claims.exp).await;

        let (req, mut payload) = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.access_token)))
            .app_data(web::Data::new(crate::test_support::lazy_pool()))
            .app_data(web::Data::new(jwt))
            .app_data(web::Data::new(blacklist))
            .to_http_parts();

        let err = AuthUser::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthorized(_)));
    }

    #[actix_web::test]
    async fn test_refresh_token_not_accepted_as_bearer() {
        let jwt = JwtService::from_secrets("access", "refresh", 900, 3600);
        let pair = jwt.issue_pair(uuid::Uuid::new_v4(), "a@koreabiz.kr").unwrap();

        let (req, mut payload) = TestRequest::default()
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", pair.refresh_token)))
            .app_data(web::Data::new(crate::test_support::lazy_pool()))
            .app_data(web::Data::new(jwt))
            .app_data(web::Data::new(TokenBlacklist::new(crate::services::KvStore::in_memory())))
            .to_http_parts();

        let err = AuthUser::from_request(&req, &mut payload).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Unauthorized(_)));
    }
}
