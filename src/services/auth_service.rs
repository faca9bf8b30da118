// src/services/auth_service.rs
// DOCUMENTATION: Account lifecycle and token management
// PURPOSE: Register, login, refresh rotation, logout, password reset and email verification

use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::DirectoryError;
use crate::models::{
    AuthResponse, LoginRequest, RegisterRequest, ResetPasswordRequest, User, UserRole,
};
use crate::services::jwt::{Claims, JwtService, TokenPair};
use crate::services::password::{hash_password, verify_password};
use crate::services::{KvStore, Mailer, RateLimiter, TokenBlacklist, UserAction};
use rand::RngCore;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

const RESET_TOKEN_TTL: Duration = Duration::from_secs(3600);
const VERIFY_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

fn reset_key(token: &str) -> String {
    format!("password_reset:{}", token)
}

fn verify_key(token: &str) -> String {
    format!("email_verify:{}", token)
}

/// 256-bit random token, hex encoded
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Role for a new account; ADMIN only for configured admin emails
pub fn role_for_email(email: &str, admin_emails: &[String]) -> UserRole {
    if admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)) {
        UserRole::Admin
    } else {
        UserRole::User
    }
}

fn invalid_credentials() -> DirectoryError {
    DirectoryError::Unauthorized("Invalid credentials".to_string())
}

fn auth_response(pair: TokenPair, user: &User) -> AuthResponse {
    AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "Bearer",
        expires_in: pair.expires_in,
        user: user.to_response(),
    }
}

pub struct AuthService;

impl AuthService {
    pub async fn register(
        pool: &PgPool,
        config: &Config,
        jwt: &JwtService,
        store: &KvStore,
        mailer: &Mailer,
        req: &RegisterRequest,
    ) -> Result<AuthResponse, DirectoryError> {
        let email = req.email.trim().to_lowercase();
        if UserRepository::find_by_email(pool, &email).await?.is_some() {
            return Err(DirectoryError::Conflict("Email is already registered".to_string()));
        }

        let password_hash = hash_password(&req.password)?;
        let role = role_for_email(&email, &config.admin_emails);
        let user = UserRepository::create(
            pool,
            &email,
            &password_hash,
            req.display_name.as_deref().map(str::trim),
            role,
        )
        .await?;

        Self::send_verification(store, mailer, &user).await;

        let pair = jwt.issue_pair(user.id, &user.email)?;
        Ok(auth_response(pair, &user))
    }

    pub async fn login(
        pool: &PgPool,
        jwt: &JwtService,
        limiter: &RateLimiter,
        req: &LoginRequest,
    ) -> Result<AuthResponse, DirectoryError> {
        let email = req.email.trim().to_lowercase();
        limiter
            .check_user_action(&email, UserAction::LoginAttempt)
            .await?;

        let user = UserRepository::find_by_email(pool, &email)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&req.password, &user.password_hash) {
            log::warn!("Failed login for user {}", user.id);
            return Err(invalid_credentials());
        }

        log::info!("User {} logged in", user.id);
        let pair = jwt.issue_pair(user.id, &user.email)?;
        Ok(auth_response(pair, &user))
    }

    /// Rotate a refresh token: the presented one is revoked and a new pair issued
    pub async fn refresh(
        pool: &PgPool,
        jwt: &JwtService,
        blacklist: &TokenBlacklist,
        refresh_token: &str,
    ) -> Result<AuthResponse, DirectoryError> {
        if blacklist.is_blacklisted(refresh_token).await {
            return Err(DirectoryError::Unauthorized("Token has been revoked".to_string()));
        }
        let claims = jwt.verify_refresh(refresh_token)?;

        let user = UserRepository::find_by_id(pool, claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| DirectoryError::Unauthorized("User not found or inactive".to_string()))?;

        if blacklist.is_logged_out(user.id, claims.iat).await {
            return Err(DirectoryError::Unauthorized("Session has been terminated".to_string()));
        }

        blacklist.blacklist(refresh_token, claims.exp).await;
        let pair = jwt.issue_pair(user.id, &user.email)?;
        Ok(auth_response(pair, &user))
    }

    /// Revoke the bearer token and, when given and valid, the refresh token
    pub async fn logout(
        jwt: &JwtService,
        blacklist: &TokenBlacklist,
        access_token: &str,
        access_claims: &Claims,
        refresh_token: Option<&str>,
    ) {
        blacklist.blacklist(access_token, access_claims.exp).await;

        if let Some(token) = refresh_token {
            match jwt.verify_refresh(token) {
                Ok(claims) if claims.sub == access_claims.sub => {
                    blacklist.blacklist(token, claims.exp).await
                }
                Ok(_) => log::warn!("Refresh token of another user presented at logout"),
                Err(_) => log::debug!("Ignoring invalid refresh token at logout"),
            }
        }
        log::info!("User {} logged out", access_claims.sub);
    }

    pub async fn logout_all(jwt: &JwtService, blacklist: &TokenBlacklist, user_id: Uuid) {
        blacklist.logout_all(user_id, jwt.refresh_ttl_secs()).await;
    }

    /// Always succeeds so account existence is not disclosed
    pub async fn forgot_password(
        pool: &PgPool,
        store: &KvStore,
        mailer: &Mailer,
        email: &str,
    ) -> Result<(), DirectoryError> {
        let Some(user) = UserRepository::find_by_email(pool, email.trim())
            .await?
            .filter(|u| u.is_active)
        else {
            log::debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = random_token();
        store
            .set(&reset_key(&token), &user.id.to_string(), Some(RESET_TOKEN_TTL))
            .await;
        mailer.send_password_reset(&user.email, &token).await;
        Ok(())
    }

    pub async fn reset_password(
        pool: &PgPool,
        jwt: &JwtService,
        store: &KvStore,
        blacklist: &TokenBlacklist,
        req: &ResetPasswordRequest,
    ) -> Result<(), DirectoryError> {
        let key = reset_key(&req.token);
        let user_id = store
            .get(&key)
            .await
            .and_then(|v| Uuid::parse_str(&v).ok())
            .ok_or_else(|| DirectoryError::InvalidInput("Invalid or expired reset token".to_string()))?;
        store.del(&key).await;

        let password_hash = hash_password(&req.password)?;
        UserRepository::update_password(pool, user_id, &password_hash).await?;
        blacklist.logout_all(user_id, jwt.refresh_ttl_secs()).await;

        log::info!("Password reset for user {}", user_id);
        Ok(())
    }

    async fn send_verification(store: &KvStore, mailer: &Mailer, user: &User) {
        let token = random_token();
        store
            .set(&verify_key(&token), &user.id.to_string(), Some(VERIFY_TOKEN_TTL))
            .await;
        mailer.send_verification(&user.email, &token).await;
    }

    /// Always succeeds; verified or unknown accounts get nothing
    pub async fn resend_verification(
        pool: &PgPool,
        store: &KvStore,
        mailer: &Mailer,
        email: &str,
    ) -> Result<(), DirectoryError> {
        if let Some(user) = UserRepository::find_by_email(pool, email.trim()).await? {
            if !user.email_verified && user.is_active {
                Self::send_verification(store, mailer, &user).await;
            }
        }
        Ok(())
    }

    pub async fn verify_email(pool: &PgPool, store: &KvStore, token: &str) -> Result<(), DirectoryError> {
        let key = verify_key(token);
        let user_id = store
            .get(&key)
            .await
            .and_then(|v| Uuid::parse_str(&v).ok())
            .ok_or_else(|| {
                DirectoryError::InvalidInput("Invalid or expired verification token".to_string())
            })?;
        store.del(&key).await;

        UserRepository::mark_email_verified(pool, user_id).await?;
        log::info!("Email verified for user {}", user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for_email() {
        let admins = vec!["ops@koreabiz.kr".to_string()];
        assert_eq!(role_for_email("OPS@koreabiz.kr", &admins), UserRole::Admin);
        assert_eq!(role_for_email("guest@koreabiz.kr", &admins), UserRole::User);
        assert_eq!(role_for_email("ops@koreabiz.kr", &[]), UserRole::User);
    }

    #[test]
    fn test_random_tokens_are_unique() {
        let a = random_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, random_token());
    }

    #[actix_web::test]
    async fn test_reset_token_is_single_use() {
        let store = KvStore::in_memory();
        let blacklist = TokenBlacklist::new(store.clone());
        let jwt = JwtService::from_secrets("a", "r", 900, 3600);
        let pool = crate::test_support::lazy_pool();

        let req = ResetPasswordRequest {
            token: "missing".to_string(),
            password: "new-password".to_string(),
        };
        let err = AuthService::reset_password(&pool, &jwt, &store, &blacklist, &req)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn test_logout_blacklists_both_tokens() {
        let store = KvStore::in_memory();
        let blacklist = TokenBlacklist::new(store);
        let jwt = JwtService::from_secrets("access", "refresh", 900, 3600);
        let user_id = Uuid::new_v4();

        let pair = jwt.issue_pair(user_id, "a@koreabiz.kr").unwrap();
        let claims = jwt.verify_access(&pair.access_token).unwrap();

        AuthService::logout(
            &jwt,
            &blacklist,
            &pair.access_token,
            &claims,
            Some(&pair.refresh_token),
        )
        .await;

        assert!(blacklist.is_blacklisted(&pair.access_token).await);
        assert!(blacklist.is_blacklisted(&pair.refresh_token).await);
    }
}
