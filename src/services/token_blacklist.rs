// src/services/token_blacklist.rs
// DOCUMENTATION: Revoked tokens and logout-everywhere markers
// PURPOSE: Reject tokens after logout even though JWTs are stateless

use crate::services::KvStore;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

/// SHA-256 hex digest, used for token keys and privacy-preserving hashes
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn blacklist_key(token: &str) -> String {
    format!("blacklist:{}", sha256_hex(token))
}

fn logout_key(user_id: Uuid) -> String {
    format!("user_logout:{}", user_id)
}

#[derive(Clone)]
pub struct TokenBlacklist {
    store: KvStore,
}

impl TokenBlacklist {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Revoke a token until its own expiry; already-expired tokens are skipped
    pub async fn blacklist(&self, token: &str, exp: i64) {
        let remaining = exp - Utc::now().timestamp();
        if remaining <= 0 {
            return;
        }

        self.store
            .set(
                &blacklist_key(token),
                "1",
                Some(Duration::from_secs(remaining as u64)),
            )
            .await;
        log::debug!("Token blacklisted for {}s", remaining);
    }

    pub async fn is_blacklisted(&self, token: &str) -> bool {
        self.store.exists(&blacklist_key(token)).await
    }

    /// Invalidate every token issued to the user before now
    pub async fn logout_all(&self, user_id: Uuid, ttl_secs: i64) {
        let now_ms = Utc::now().timestamp_millis();
        self.store
            .set(
                &logout_key(user_id),
                &now_ms.to_string(),
                Some(Duration::from_secs(ttl_secs.max(1) as u64)),
            )
            .await;
        log::info!("User {} logged out from all sessions", user_id);
    }

    /// Whether a token issued at `iat` (seconds) predates the user's logout-all
    pub async fn is_logged_out(&self, user_id: Uuid, iat: i64) -> bool {
        match self.store.get(&logout_key(user_id)).await {
            Some(value) => value
                .parse::<i64>()
                .map(|logout_ms| iat * 1000 < logout_ms)
                .unwrap_or(false),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex("token").len(), 64);
    }

    #[tokio::test]
    async fn test_blacklist_respects_expiry() {
        let blacklist = TokenBlacklist::new(KvStore::in_memory());
        let now = Utc::now().timestamp();

        blacklist.blacklist("live-token", now + 60).await;
        blacklist.blacklist("dead-token", now - 1).await;

        assert!(blacklist.is_blacklisted("live-token").await);
        assert!(!blacklist.is_blacklisted("dead-token").await);
        assert!(!blacklist.is_blacklisted("other-token").await);
    }

    #[tokio::test]
    async fn test_logout_all_rejects_older_tokens() {
        let blacklist = TokenBlacklist::new(KvStore::in_memory());
        let user_id = Uuid::new_v4();
        let issued_before = Utc::now().timestamp() - 10;

        assert!(!blacklist.is_logged_out(user_id, issued_before).await);

        blacklist.logout_all(user_id, 3600).await;
        assert!(blacklist.is_logged_out(user_id, issued_before).await);

        let issued_after = Utc::now().timestamp() + 5;
        assert!(!blacklist.is_logged_out(user_id, issued_after).await);
        assert!(!blacklist.is_logged_out(Uuid::new_v4(), issued_before).await);
    }
}
