// src/db/subscription_repository.rs
// DOCUMENTATION: Database access for plans and enterprise subscriptions

use crate::errors::DirectoryError;
use crate::models::{Subscription, SubscriptionPlan, SubscriptionTier, STATUS_ACTIVE};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    /// All plans, cheapest tier first
    pub async fn list_plans(pool: &PgPool) -> Result<Vec<SubscriptionPlan>, DirectoryError> {
        sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT id, tier, gallery_limit, featured_listing, analytics, priority_support
            FROM subscription_plans
            ORDER BY tier
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list plans", e))
    }

    pub async fn find_plan(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<SubscriptionPlan>, DirectoryError> {
        sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT id, tier, gallery_limit, featured_listing, analytics, priority_support
            FROM subscription_plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch plan", e))
    }

    pub async fn find_for_enterprise(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Option<Subscription>, DirectoryError> {
        sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE enterprise_id = $1")
            .bind(enterprise_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch subscription", e))
    }

    pub async fn list_for_enterprises(
        pool: &PgPool,
        enterprise_ids: &[Uuid],
    ) -> Result<Vec<Subscription>, DirectoryError> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE enterprise_id = ANY($1)",
        )
        .bind(enterprise_ids)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch subscriptions", e))
    }

    /// Create or replace the enterprise's subscription with an active period
    pub async fn upsert(
        pool: &PgPool,
        enterprise_id: Uuid,
        plan_id: Uuid,
        tier: SubscriptionTier,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Subscription, DirectoryError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (
                enterprise_id, plan_id, tier, status, current_period_start, current_period_end
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (enterprise_id) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                tier = EXCLUDED.tier,
                status = EXCLUDED.status,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end
            RETURNING *
            "#,
        )
        .bind(enterprise_id)
        .bind(plan_id)
        .bind(tier)
        .bind(STATUS_ACTIVE)
        .bind(period_start)
        .bind(period_end)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to save subscription", e))?;

        log::info!(
            "Enterprise {} now on plan {:?} until {}",
            enterprise_id,
            tier,
            period_end
        );
        Ok(subscription)
    }
}
