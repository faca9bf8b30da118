// src/models/subscription.rs
// DOCUMENTATION: Subscription plans and entitlements
// PURPOSE: Plan/subscription rows and per-tier feature resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Plan tier
/// DOCUMENTATION: Declaration order matches the enum order in Postgres
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "subscription_tier", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Pro,
    Enterprise,
}

pub const STATUS_ACTIVE: &str = "ACTIVE";
pub const STATUS_INACTIVE: &str = "INACTIVE";
pub const STATUS_EXPIRED: &str = "EXPIRED";

/// -1 means no limit
pub const UNLIMITED: i32 = -1;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub tier: SubscriptionTier,
    pub gallery_limit: i32,
    pub featured_listing: bool,
    pub analytics: bool,
    pub priority_support: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub plan_id: Option<Uuid>,
    pub tier: SubscriptionTier,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Status as seen by clients: an ACTIVE row past its period end is EXPIRED
    pub fn effective_status(&self, now: DateTime<Utc>) -> &str {
        match self.current_period_end {
            Some(end) if self.status == STATUS_ACTIVE && end < now => STATUS_EXPIRED,
            _ => &self.status,
        }
    }
}

/// Entitlements granted by a tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFeatures {
    pub gallery_images: i32,
    pub featured_listing: bool,
    pub analytics: bool,
    pub priority_support: bool,
}

/// Value of a single named feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureValue {
    Flag(bool),
    Limit(i32),
}

impl PlanFeatures {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => PlanFeatures {
                gallery_images: 3,
                featured_listing: false,
                analytics: false,
                priority_support: false,
            },
            SubscriptionTier::Basic => PlanFeatures {
                gallery_images: 10,
                featured_listing: false,
                analytics: false,
                priority_support: false,
            },
            SubscriptionTier::Pro => PlanFeatures {
                gallery_images: 30,
                featured_listing: true,
                analytics: true,
                priority_support: false,
            },
            SubscriptionTier::Enterprise => PlanFeatures {
                gallery_images: UNLIMITED,
                featured_listing: true,
                analytics: true,
                priority_support: true,
            },
        }
    }

    /// Look up a feature by its API name
    pub fn get(&self, feature: &str) -> Option<FeatureValue> {
        match feature {
            "galleryImages" => Some(FeatureValue::Limit(self.gallery_images)),
            "featuredListing" => Some(FeatureValue::Flag(self.featured_listing)),
            "analytics" => Some(FeatureValue::Flag(self.analytics)),
            "prioritySupport" => Some(FeatureValue::Flag(self.priority_support)),
            _ => None,
        }
    }
}

impl FeatureValue {
    pub fn grants_access(&self) -> bool {
        match *self {
            FeatureValue::Flag(enabled) => enabled,
            FeatureValue::Limit(limit) => limit == UNLIMITED || limit > 0,
        }
    }

    pub fn limit(&self) -> Option<i32> {
        match *self {
            FeatureValue::Limit(limit) => Some(limit),
            FeatureValue::Flag(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub enterprise_id: Uuid,
    pub tier: SubscriptionTier,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
    pub features: PlanFeatures,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAccessResponse {
    pub has_access: bool,
    pub limit: Option<i32>,
    pub feature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_id: Uuid,
    pub tier: Option<SubscriptionTier>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_tier_features() {
        assert_eq!(PlanFeatures::for_tier(SubscriptionTier::Free).gallery_images, 3);
        assert_eq!(PlanFeatures::for_tier(SubscriptionTier::Basic).gallery_images, 10);
        let pro = PlanFeatures::for_tier(SubscriptionTier::Pro);
        assert_eq!(pro.gallery_images, 30);
        assert!(pro.analytics && pro.featured_listing && !pro.priority_support);
        assert_eq!(
            PlanFeatures::for_tier(SubscriptionTier::Enterprise).gallery_images,
            UNLIMITED
        );
    }

    #[test]
    fn test_feature_access_rules() {
        let free = PlanFeatures::for_tier(SubscriptionTier::Free);
        assert!(free.get("galleryImages").unwrap().grants_access());
        assert!(!free.get("analytics").unwrap().grants_access());
        assert!(free.get("teleport").is_none());

        let enterprise = PlanFeatures::for_tier(SubscriptionTier::Enterprise);
        let gallery = enterprise.get("galleryImages").unwrap();
        assert!(gallery.grants_access());
        assert_eq!(gallery.limit(), Some(UNLIMITED));
        assert!(!FeatureValue::Limit(0).grants_access());
    }

    #[test]
    fn test_effective_status_expiry() {
        let now = Utc::now();
        let mut sub = Subscription {
            id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            plan_id: None,
            tier: SubscriptionTier::Pro,
            status: STATUS_ACTIVE.to_string(),
            current_period_start: Some(now - Duration::days(31)),
            current_period_end: Some(now - Duration::days(1)),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(sub.effective_status(now), STATUS_EXPIRED);

        sub.current_period_end = Some(now + Duration::days(29));
        assert_eq!(sub.effective_status(now), STATUS_ACTIVE);
    }
}
