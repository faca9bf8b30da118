// src/models/audit.rs
// DOCUMENTATION: Audit trail records
// PURPOSE: Append-only log of administrative and ownership actions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ENTERPRISE_CREATED: &str = "ENTERPRISE_CREATED";
pub const ENTERPRISE_UPDATED: &str = "ENTERPRISE_UPDATED";
pub const ENTERPRISE_VERIFIED: &str = "ENTERPRISE_VERIFIED";
pub const ENTERPRISE_DELETED: &str = "ENTERPRISE_DELETED";
pub const STAFF_ASSIGNED: &str = "STAFF_ASSIGNED";
pub const STAFF_REMOVED: &str = "STAFF_REMOVED";
pub const REVIEW_MODERATED: &str = "REVIEW_MODERATED";
pub const CLAIM_REVIEWED: &str = "CLAIM_REVIEWED";
pub const OWNERSHIP_ASSIGNED: &str = "OWNERSHIP_ASSIGNED";
pub const USER_UPDATED: &str = "USER_UPDATED";
pub const USER_DEACTIVATED: &str = "USER_DEACTIVATED";
pub const PERMISSION_GRANTED: &str = "PERMISSION_GRANTED";
pub const PERMISSION_REVOKED: &str = "PERMISSION_REVOKED";
pub const SUBSCRIPTION_CHANGED: &str = "SUBSCRIPTION_CHANGED";

pub const ENTITY_ENTERPRISE: &str = "enterprise";
pub const ENTITY_REVIEW: &str = "review";
pub const ENTITY_CLAIM: &str = "claim";
pub const ENTITY_USER: &str = "user";
pub const ENTITY_PERMISSION: &str = "permission";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: Uuid,
    pub actor_user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditLogsQuery {
    pub actor_user_id: Option<Uuid>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClearAuditLogsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedCount {
    pub deleted: u64,
}
