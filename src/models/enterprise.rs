// src/models/enterprise.rs
// DOCUMENTATION: Core data structures for enterprise listings
// PURPOSE: Database mapping for enterprises and their child tables plus API DTOs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{Category, City, MediaResponse};

/// Listing visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "enterprise_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnterpriseStatus {
    Active,
    Hidden,
    Suspended,
}

impl EnterpriseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnterpriseStatus::Active => "ACTIVE",
            EnterpriseStatus::Hidden => "HIDDEN",
            EnterpriseStatus::Suspended => "SUSPENDED",
        }
    }
}

/// Role of a staff member within one enterprise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "staff_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Manager,
    Editor,
    #[default]
    Viewer,
}

impl StaffRole {
    /// Managers and editors may change listing content
    pub fn can_edit(&self) -> bool {
        matches!(self, StaffRole::Manager | StaffRole::Editor)
    }
}

/// Complete enterprise record from the database
/// DOCUMENTATION: Maps directly to the enterprises table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enterprise {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub legal_name: Option<String>,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub verified: bool,
    pub owner_user_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Average of published review ratings, one decimal place
    pub rating_avg: f64,
    pub rating_count: i32,
    /// 1 (cheapest) to 5
    pub price_range: Option<i16>,
    pub founded_year: Option<i16>,
    pub employee_range: Option<String>,
    pub status: EnterpriseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Weekly opening hours row
/// DOCUMENTATION: day_of_week 0 = Monday .. 6 = Sunday, local Korean time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseHours {
    pub day_of_week: i16,
    pub is_closed: bool,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
}

/// Specific date on which the enterprise is closed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClosedDay {
    pub id: Uuid,
    pub closed_date: NaiveDate,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseStaff {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub user_id: Uuid,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Enterprise detail response
/// DOCUMENTATION: Used by GET /enterprises/{id}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseDetailResponse {
    #[serde(flatten)]
    pub enterprise: Enterprise,
    pub city: Option<City>,
    pub categories: Vec<Category>,
    pub hours: Vec<EnterpriseHours>,
    pub closed_days: Vec<ClosedDay>,
    pub media: Vec<MediaResponse>,
    pub is_open_now: bool,
}

/// Request to create a new enterprise
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnterpriseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 200))]
    pub legal_name: Option<String>,

    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    pub city_id: Option<Uuid>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    #[validate(range(min = 1, max = 5))]
    pub price_range: Option<i16>,

    #[validate(range(min = 1800, max = 2100))]
    pub founded_year: Option<i16>,

    #[validate(length(max = 50))]
    pub employee_range: Option<String>,

    pub category_ids: Option<Vec<Uuid>>,
}

/// Request to update an enterprise (partial update)
/// DOCUMENTATION: status is honoured for administrators only
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEnterpriseRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 200))]
    pub legal_name: Option<String>,

    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    #[validate(length(max = 10000))]
    pub description: Option<String>,

    pub city_id: Option<Uuid>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    #[validate(range(min = 1, max = 5))]
    pub price_range: Option<i16>,

    #[validate(range(min = 1800, max = 2100))]
    pub founded_year: Option<i16>,

    #[validate(length(max = 50))]
    pub employee_range: Option<String>,

    pub category_ids: Option<Vec<Uuid>>,

    pub status: Option<EnterpriseStatus>,
}

/// Query parameters for listing enterprises
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEnterprisesQuery {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub verified: Option<bool>,
    /// Admin listing only
    pub status: Option<EnterpriseStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyEnterpriseRequest {
    pub verified: bool,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: StaffRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HoursEntry {
    #[validate(range(min = 0, max = 6))]
    pub day_of_week: i16,

    #[serde(default)]
    pub is_closed: bool,

    /// "HH:MM" or "HH:MM:SS"
    pub open_time: Option<String>,
    pub close_time: Option<String>,
}

/// Full weekly schedule, replaces any existing rows
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetHoursRequest {
    #[validate]
    pub hours: Vec<HoursEntry>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddClosedDayRequest {
    pub closed_date: NaiveDate,

    #[validate(length(max = 200))]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let req: CreateEnterpriseRequest = serde_json::from_value(serde_json::json!({
            "name": "Seoul Coffee Lab",
            "priceRange": 2,
            "foundedYear": 2015,
            "latitude": 37.5665,
            "longitude": 126.978
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let req: CreateEnterpriseRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "priceRange": 6,
            "foundedYear": 1700
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("price_range"));
        assert!(fields.contains_key("founded_year"));
    }

    #[test]
    fn test_staff_role_defaults_to_viewer() {
        let req: AssignStaffRequest = serde_json::from_value(serde_json::json!({
            "userId": "7d3c6a52-43a8-4a39-8b9b-6b0e4ad4f1a1"
        }))
        .unwrap();
        assert_eq!(req.role, StaffRole::Viewer);
        assert!(!req.role.can_edit());
        assert!(StaffRole::Editor.can_edit());
    }
}
