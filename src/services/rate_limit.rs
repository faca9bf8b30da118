// src/services/rate_limit.rs
// DOCUMENTATION: Fixed-window rate limiting on the key-value store
// PURPOSE: Per-user and per-IP action limits (reviews, claims, logins, search)

use crate::errors::DirectoryError;
use crate::services::KvStore;
use chrono::Utc;
use std::time::Duration;

/// Allowed hits per window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: i64,
    pub window_secs: u64,
}

/// Actions limited per user (or per email / IP hash for anonymous callers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ReviewCreate,
    ClaimSubmit,
    LoginAttempt,
}

impl UserAction {
    pub fn name(&self) -> &'static str {
        match self {
            UserAction::ReviewCreate => "review_create",
            UserAction::ClaimSubmit => "claim_submit",
            UserAction::LoginAttempt => "login_attempt",
        }
    }

    pub fn rule(&self) -> RateLimitRule {
        match self {
            UserAction::ReviewCreate => RateLimitRule { limit: 5, window_secs: 3600 },
            UserAction::ClaimSubmit => RateLimitRule { limit: 3, window_secs: 86400 },
            UserAction::LoginAttempt => RateLimitRule { limit: 10, window_secs: 900 },
        }
    }
}

/// Actions limited per client IP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAction {
    ApiRequest,
    Search,
}

impl IpAction {
    pub fn name(&self) -> &'static str {
        match self {
            IpAction::ApiRequest => "api_request",
            IpAction::Search => "search",
        }
    }

    pub fn rule(&self) -> RateLimitRule {
        match self {
            IpAction::ApiRequest => RateLimitRule { limit: 1000, window_secs: 3600 },
            IpAction::Search => RateLimitRule { limit: 100, window_secs: 300 },
        }
    }
}

/// Outcome of counting one hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: i64,
    /// Unix seconds at which the current window ends
    pub reset_at: i64,
}

#[derive(Clone)]
pub struct RateLimiter {
    store: KvStore,
}

impl RateLimiter {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Count a hit against `key` in the current window
    pub async fn hit(&self, key: &str, rule: RateLimitRule) -> RateLimitDecision {
        let now = Utc::now().timestamp();
        let window_secs = rule.window_secs.max(1) as i64;
        let window = now / window_secs;
        let counter_key = format!("rate_limit:{}:{}", key, window);

        let count = self.store.incr(&counter_key).await;
        if count == 1 {
            self.store
                .expire(&counter_key, Duration::from_secs(rule.window_secs.max(1)))
                .await;
        }

        RateLimitDecision {
            allowed: count <= rule.limit,
            remaining: (rule.limit - count).max(0),
            reset_at: (window + 1) * window_secs,
        }
    }

    pub async fn check_user_action(
        &self,
        subject: &str,
        action: UserAction,
    ) -> Result<(), DirectoryError> {
        let decision = self
            .hit(&format!("{}:{}", action.name(), subject), action.rule())
            .await;
        if !decision.allowed {
            log::warn!("Rate limit hit: {} for {}", action.name(), subject);
            return Err(DirectoryError::RateLimitExceeded);
        }
        Ok(())
    }

    pub async fn check_ip(&self, ip: &str, action: IpAction) -> Result<(), DirectoryError> {
        let decision = self
            .hit(&format!("{}:{}", action.name(), ip), action.rule())
            .await;
        if !decision.allowed {
            log::warn!("Rate limit hit: {} from {}", action.name(), ip);
            return Err(DirectoryError::RateLimitExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_allows_exactly_limit_hits() {
        let limiter = RateLimiter::new(KvStore::in_memory());
        let rule = RateLimitRule { limit: 3, window_secs: 3600 };

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.hit("user-1", rule).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }
        let decision = limiter.hit("user-1", rule).await;
        assert!(!decision.allowed);
        assert!(decision.reset_at > Utc::now().timestamp());

        // Other keys have their own window
        assert!(limiter.hit("user-2", rule).await.allowed);
    }

    #[tokio::test]
    async fn test_claim_submit_limit() {
        let limiter = RateLimiter::new(KvStore::in_memory());
        for _ in 0..3 {
            limiter
                .check_user_action("u1", UserAction::ClaimSubmit)
                .await
                .unwrap();
        }
        assert!(matches!(
            limiter.check_user_action("u1", UserAction::ClaimSubmit).await,
            Err(DirectoryError::RateLimitExceeded)
        ));
    }

    #[test]
    fn test_rules() {
        assert_eq!(UserAction::ReviewCreate.rule().limit, 5);
        assert_eq!(UserAction::LoginAttempt.rule().window_secs, 900);
        assert_eq!(IpAction::Search.rule(), RateLimitRule { limit: 100, window_secs: 300 });
    }
}
