// src/models/analytics.rs
// DOCUMENTATION: Daily aggregated enterprise analytics
// PURPOSE: Privacy-first counters (no per-visitor data) and reporting DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Countable interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    PageView,
    SearchImpression,
    CtaClick,
}

impl AnalyticsEventType {
    /// Counter column incremented by this event
    pub fn column(&self) -> &'static str {
        match self {
            AnalyticsEventType::PageView => "page_views",
            AnalyticsEventType::SearchImpression => "search_impressions",
            AnalyticsEventType::CtaClick => "cta_clicks",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEventRequest {
    pub enterprise_id: Uuid,
    pub event_type: AnalyticsEventType,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyAnalytics {
    pub day: NaiveDate,
    pub page_views: i32,
    pub search_impressions: i32,
    pub cta_clicks: i32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTotals {
    pub page_views: i64,
    pub search_impressions: i64,
    pub cta_clicks: i64,
}

impl AnalyticsTotals {
    pub fn from_days(days: &[DailyAnalytics]) -> Self {
        days.iter().fold(AnalyticsTotals::default(), |mut acc, d| {
            acc.page_views += i64::from(d.page_views);
            acc.search_impressions += i64::from(d.search_impressions);
            acc.cta_clicks += i64::from(d.cta_clicks);
            acc
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub data: Vec<DailyAnalytics>,
    pub totals: AnalyticsTotals,
    pub period: AnalyticsPeriod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDashboard {
    pub totals: AnalyticsTotals,
    pub avg_daily_page_views: f64,
    pub days: i64,
    pub period: AnalyticsPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parsing() {
        let req: RecordEventRequest = serde_json::from_value(serde_json::json!({
            "enterpriseId": "7d3c6a52-43a8-4a39-8b9b-6b0e4ad4f1a1",
            "eventType": "cta_click"
        }))
        .unwrap();
        assert_eq!(req.event_type, AnalyticsEventType::CtaClick);
        assert_eq!(req.event_type.column(), "cta_clicks");
    }

    #[test]
    fn test_totals() {
        let day = |d: u32, pv| DailyAnalytics {
            day: NaiveDate::from_ymd_opt(2024, 5, d).unwrap(),
            page_views: pv,
            search_impressions: 2,
            cta_clicks: 1,
        };
        let totals = AnalyticsTotals::from_days(&[day(1, 10), day(2, 5)]);
        assert_eq!(
            totals,
            AnalyticsTotals {
                page_views: 15,
                search_impressions: 4,
                cta_clicks: 2
            }
        );
    }
}
