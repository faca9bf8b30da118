// src/db/analytics_repository.rs
// DOCUMENTATION: Daily analytics counters
// PURPOSE: Atomic per-day increments and range reads

use crate::errors::DirectoryError;
use crate::models::{AnalyticsEventType, DailyAnalytics};
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

pub struct AnalyticsRepository;

impl AnalyticsRepository {
    /// Increment one counter for (enterprise, day), creating the row when missing
    pub async fn increment(
        pool: &PgPool,
        enterprise_id: Uuid,
        day: NaiveDate,
        event: AnalyticsEventType,
    ) -> Result<(), DirectoryError> {
        // Column name comes from a closed enum, never from input
        let column = event.column();
        let sql = format!(
            r#"
            INSERT INTO enterprise_analytics_daily (enterprise_id, day, {column})
            VALUES ($1, $2, 1)
            ON CONFLICT (enterprise_id, day)
            DO UPDATE SET {column} = enterprise_analytics_daily.{column} + 1
            "#
        );

        sqlx::query(&sql)
            .bind(enterprise_id)
            .bind(day)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to record analytics event", e))?;
        Ok(())
    }

    /// Daily rows within [start, end], newest first
    pub async fn range(
        pool: &PgPool,
        enterprise_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAnalytics>, DirectoryError> {
        sqlx::query_as::<_, DailyAnalytics>(
            r#"
            SELECT day, page_views, search_impressions, cta_clicks
            FROM enterprise_analytics_daily
            WHERE enterprise_id = $1 AND day BETWEEN $2 AND $3
            ORDER BY day DESC
            "#,
        )
        .bind(enterprise_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to read analytics", e))
    }

    pub async fn clear(pool: &PgPool, enterprise_id: Uuid) -> Result<u64, DirectoryError> {
        let result = sqlx::query("DELETE FROM enterprise_analytics_daily WHERE enterprise_id = $1")
            .bind(enterprise_id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to clear analytics", e))?;
        Ok(result.rows_affected())
    }
}
