// src/services/subscription_service.rs
// DOCUMENTATION: Subscription plans, status and entitlement checks

use crate::db::{AuditRepository, EnterpriseRepository, SubscriptionRepository};
use crate::errors::DirectoryError;
use crate::models::audit::{ENTITY_ENTERPRISE, SUBSCRIPTION_CHANGED};
use crate::models::subscription::{STATUS_ACTIVE, STATUS_INACTIVE};
use crate::models::{
    ChangePlanRequest, FeatureAccessResponse, PlanFeatures, Subscription, SubscriptionPlan,
    SubscriptionStatusResponse, SubscriptionTier, User,
};
use crate::services::RbacService;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Length of a billing period started by a plan change
pub const PERIOD_DAYS: i64 = 30;

/// Client-facing status; enterprises without a row are FREE/INACTIVE
pub fn status_response(
    enterprise_id: Uuid,
    subscription: Option<&Subscription>,
    now: DateTime<Utc>,
) -> SubscriptionStatusResponse {
    match subscription {
        Some(sub) => SubscriptionStatusResponse {
            enterprise_id,
            tier: sub.tier,
            status: sub.effective_status(now).to_string(),
            current_period_end: sub.current_period_end,
            features: PlanFeatures::for_tier(sub.tier),
        },
        None => SubscriptionStatusResponse {
            enterprise_id,
            tier: SubscriptionTier::Free,
            status: STATUS_INACTIVE.to_string(),
            current_period_end: None,
            features: PlanFeatures::for_tier(SubscriptionTier::Free),
        },
    }
}

/// Entitlements currently in force: the tier's while ACTIVE, FREE otherwise
pub fn effective_features(subscription: Option<&Subscription>, now: DateTime<Utc>) -> PlanFeatures {
    match subscription {
        Some(sub) if sub.effective_status(now) == STATUS_ACTIVE => PlanFeatures::for_tier(sub.tier),
        _ => PlanFeatures::for_tier(SubscriptionTier::Free),
    }
}

/// Feature check as served by GET .../feature/{feature}
/// DOCUMENTATION: Access needs an ACTIVE subscription plus an enabled flag or a
/// limit of -1 or above zero; unknown features report no access and limit 0
pub fn feature_access(status: &SubscriptionStatusResponse, feature: &str) -> FeatureAccessResponse {
    let value = status.features.get(feature);
    let active = status.status == STATUS_ACTIVE;

    FeatureAccessResponse {
        has_access: active && value.map(|v| v.grants_access()).unwrap_or(false),
        limit: match value {
            Some(v) => v.limit(),
            None => Some(0),
        },
        feature: feature.to_string(),
    }
}

pub struct SubscriptionService;

impl SubscriptionService {
    pub async fn plans(pool: &PgPool) -> Result<Vec<SubscriptionPlan>, DirectoryError> {
        SubscriptionRepository::list_plans(pool).await
    }

    /// GET /subscriptions/status: every enterprise the caller owns
    pub async fn status_for_owner(
        pool: &PgPool,
        user: &User,
    ) -> Result<Vec<SubscriptionStatusResponse>, DirectoryError> {
        let owned = EnterpriseRepository::list_owned_by(pool, user.id).await?;
        let ids: Vec<Uuid> = owned.iter().map(|e| e.id).collect();
        let subscriptions: HashMap<Uuid, Subscription> =
            SubscriptionRepository::list_for_enterprises(pool, &ids)
                .await?
                .into_iter()
                .map(|s| (s.enterprise_id, s))
                .collect();

        let now = Utc::now();
        Ok(ids
            .into_iter()
            .map(|id| status_response(id, subscriptions.get(&id), now))
            .collect())
    }

    pub async fn enterprise_status(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
    ) -> Result<SubscriptionStatusResponse, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, enterprise_id).await?;
        RbacService::require_access(pool, user, &enterprise).await?;

        let subscription = SubscriptionRepository::find_for_enterprise(pool, enterprise_id).await?;
        Ok(status_response(enterprise_id, subscription.as_ref(), Utc::now()))
    }

    pub async fn check_feature(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
        feature: &str,
    ) -> Result<FeatureAccessResponse, DirectoryError> {
        let status = Self::enterprise_status(pool, user, enterprise_id).await?;
        Ok(feature_access(&status, feature))
    }

    /// Features in force for an enterprise, without access checks
    pub async fn features_for(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<PlanFeatures, DirectoryError> {
        let subscription = SubscriptionRepository::find_for_enterprise(pool, enterprise_id).await?;
        Ok(effective_features(subscription.as_ref(), Utc::now()))
    }

    /// POST /subscriptions/enterprise/{id}/change-plan
    /// DOCUMENTATION: Applied directly (no payment provider); starts a new 30-day period
    pub async fn change_plan(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
        req: &ChangePlanRequest,
    ) -> Result<SubscriptionStatusResponse, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, enterprise_id).await?;
        RbacService::require_manage(pool, user, &enterprise).await?;

        let plan = SubscriptionRepository::find_plan(pool, req.plan_id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Plan {} not found", req.plan_id)))?;
        if let Some(tier) = req.tier {
            if tier != plan.tier {
                return Err(DirectoryError::InvalidInput(format!(
                    "Plan {} is {:?}, not {:?}",
                    plan.id, plan.tier, tier
                )));
            }
        }

        let previous = SubscriptionRepository::find_for_enterprise(pool, enterprise_id).await?;
        let now = Utc::now();
        let subscription = SubscriptionRepository::upsert(
            pool,
            enterprise_id,
            plan.id,
            plan.tier,
            now,
            now + Duration::days(PERIOD_DAYS),
        )
        .await?;

        if let Err(e) = AuditRepository::insert(
            pool,
            Some(user.id),
            SUBSCRIPTION_CHANGED,
            ENTITY_ENTERPRISE,
            Some(enterprise_id),
            &json!({
                "planId": plan.id,
                "tier": plan.tier,
                "previousTier": previous.map(|s| s.tier),
            }),
        )
        .await
        {
            log::error!("Failed to audit plan change for {}: {}", enterprise_id, e);
        }

        Ok(status_response(enterprise_id, Some(&subscription), now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::{STATUS_EXPIRED, UNLIMITED};

    fn subscription(tier: SubscriptionTier, ends_in_days: i64) -> Subscription {
        let now = Utc::now();
        Subscription {
            id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            plan_id: Some(Uuid::new_v4()),
            tier,
            status: STATUS_ACTIVE.to_string(),
            current_period_start: Some(now - Duration::days(1)),
            current_period_end: Some(now + Duration::days(ends_in_days)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_subscription_is_free_inactive() {
        let id = Uuid::new_v4();
        let status = status_response(id, None, Utc::now());
        assert_eq!(status.tier, SubscriptionTier::Free);
        assert_eq!(status.status, STATUS_INACTIVE);
        assert_eq!(status.features.gallery_images, 3);

        let access = feature_access(&status, "galleryImages");
        assert!(!access.has_access);
        assert_eq!(access.limit, Some(3));
    }

    #[test]
    fn test_active_pro_features() {
        let sub = subscription(SubscriptionTier::Pro, 10);
        let status = status_response(sub.enterprise_id, Some(&sub), Utc::now());
        assert_eq!(status.status, STATUS_ACTIVE);

        assert!(feature_access(&status, "analytics").has_access);
        assert!(!feature_access(&status, "prioritySupport").has_access);

        let unknown = feature_access(&status, "hologram");
        assert!(!unknown.has_access);
        assert_eq!(unknown.limit, Some(0));
    }

    #[test]
    fn test_expired_subscription_falls_back_to_free() {
        let sub = subscription(SubscriptionTier::Enterprise, -2);
        let now = Utc::now();
        assert_eq!(status_response(sub.enterprise_id, Some(&sub), now).status, STATUS_EXPIRED);
        assert_eq!(effective_features(Some(&sub), now).gallery_images, 3);

        let live = subscription(SubscriptionTier::Enterprise, 5);
        assert_eq!(effective_features(Some(&live), now).gallery_images, UNLIMITED);
    }
}
