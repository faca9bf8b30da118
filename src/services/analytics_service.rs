// src/services/analytics_service.rs
// DOCUMENTATION: Privacy-first daily analytics
// PURPOSE: Count interactions per enterprise per UTC day and report them

use crate::db::{AnalyticsRepository, EnterpriseRepository};
use crate::errors::DirectoryError;
use crate::middleware::ClientInfo;
use crate::models::{
    AnalyticsDashboard, AnalyticsPeriod, AnalyticsRangeQuery, AnalyticsReport, AnalyticsTotals,
    DailyAnalytics, DeletedCount, RecordEventRequest, User,
};
use crate::services::{IpAction, RateLimiter, RbacService};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Window used when no dates are given and for the dashboard
pub const DEFAULT_PERIOD_DAYS: i64 = 30;
/// Longest range a single report may cover
pub const MAX_PERIOD_DAYS: i64 = 366;

/// Resolve the reporting window, inclusive on both ends
pub fn resolve_period(
    query: &AnalyticsRangeQuery,
    today: NaiveDate,
) -> Result<AnalyticsPeriod, DirectoryError> {
    let end_date = query.end_date.unwrap_or(today);
    let start_date = query
        .start_date
        .unwrap_or(end_date - Duration::days(DEFAULT_PERIOD_DAYS - 1));

    if start_date > end_date {
        return Err(DirectoryError::InvalidInput(
            "startDate must not be after endDate".to_string(),
        ));
    }
    if (end_date - start_date).num_days() >= MAX_PERIOD_DAYS {
        return Err(DirectoryError::InvalidInput(format!(
            "Date range cannot exceed {} days",
            MAX_PERIOD_DAYS
        )));
    }

    Ok(AnalyticsPeriod {
        start_date,
        end_date,
    })
}

/// Sums plus the mean page views over days that recorded activity
pub fn dashboard(days: &[DailyAnalytics], period: AnalyticsPeriod) -> AnalyticsDashboard {
    let totals = AnalyticsTotals::from_days(days);
    let avg_daily_page_views = if days.is_empty() {
        0.0
    } else {
        let avg = totals.page_views as f64 / days.len() as f64;
        (avg * 100.0).round() / 100.0
    };

    AnalyticsDashboard {
        totals,
        avg_daily_page_views,
        days: days.len() as i64,
        period,
    }
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// POST /analytics/events
    pub async fn record(
        pool: &PgPool,
        limiter: &RateLimiter,
        client: &ClientInfo,
        req: &RecordEventRequest,
    ) -> Result<(), DirectoryError> {
        limiter
            .check_ip(client.ip_or_unknown(), IpAction::ApiRequest)
            .await?;

        let day = Utc::now().date_naive();
        AnalyticsRepository::increment(pool, req.enterprise_id, day, req.event_type).await?;
        log::debug!(
            "Recorded {:?} for enterprise {} on {}",
            req.event_type,
            req.enterprise_id,
            day
        );
        Ok(())
    }

    async fn authorize(pool: &PgPool, user: &User, enterprise_id: Uuid) -> Result<(), DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, enterprise_id).await?;
        RbacService::require_access(pool, user, &enterprise).await
    }

    pub async fn report(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
        query: &AnalyticsRangeQuery,
    ) -> Result<AnalyticsReport, DirectoryError> {
        Self::authorize(pool, user, enterprise_id).await?;
        let period = resolve_period(query, Utc::now().date_naive())?;

        let data =
            AnalyticsRepository::range(pool, enterprise_id, period.start_date, period.end_date)
                .await?;
        Ok(AnalyticsReport {
            totals: AnalyticsTotals::from_days(&data),
            data,
            period,
        })
    }

    pub async fn dashboard(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
    ) -> Result<AnalyticsDashboard, DirectoryError> {
        Self::authorize(pool, user, enterprise_id).await?;
        let period = resolve_period(
            &AnalyticsRangeQuery {
                start_date: None,
                end_date: None,
            },
            Utc::now().date_naive(),
        )?;

        let days =
            AnalyticsRepository::range(pool, enterprise_id, period.start_date, period.end_date)
                .await?;
        Ok(dashboard(&days, period))
    }

    pub async fn clear(pool: &PgPool, enterprise_id: Uuid) -> Result<DeletedCount, DirectoryError> {
        let deleted = AnalyticsRepository::clear(pool, enterprise_id).await?;
        log::info!("Cleared {} analytics rows for enterprise {}", deleted, enterprise_id);
        Ok(DeletedCount { deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_period_is_thirty_days() {
        let query = AnalyticsRangeQuery {
            start_date: None,
            end_date: None,
        };
        let period = resolve_period(&query, date(2024, 3, 31)).unwrap();
        assert_eq!(period.start_date, date(2024, 3, 2));
        assert_eq!(period.end_date, date(2024, 3, 31));
    }

    #[test]
    fn test_invalid_periods() {
        let inverted = AnalyticsRangeQuery {
            start_date: Some(date(2024, 5, 2)),
            end_date: Some(date(2024, 5, 1)),
        };
        assert!(resolve_period(&inverted, date(2024, 6, 1)).is_err());

        let too_long = AnalyticsRangeQuery {
            start_date: Some(date(2022, 1, 1)),
            end_date: Some(date(2024, 1, 1)),
        };
        assert!(resolve_period(&too_long, date(2024, 6, 1)).is_err());
    }

    #[test]
    fn test_dashboard_average() {
        let day = |d: u32, pv| DailyAnalytics {
            day: date(2024, 5, d),
            page_views: pv,
            search_impressions: 0,
            cta_clicks: 1,
        };
        let period = AnalyticsPeriod {
            start_date: date(2024, 4, 2),
            end_date: date(2024, 5, 1),
        };

        let stats = dashboard(&[day(1, 10), day(2, 5), day(3, 0)], period.clone());
        assert_eq!(stats.totals.page_views, 15);
        assert_eq!(stats.totals.cta_clicks, 3);
        assert_eq!(stats.avg_daily_page_views, 5.0);
        assert_eq!(stats.days, 3);

        assert_eq!(dashboard(&[], period).avg_daily_page_views, 0.0);
    }
}
