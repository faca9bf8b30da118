// src/models/rbac.rs
// DOCUMENTATION: Role-based access control data
// PURPOSE: Permission records, grant payloads and the built-in role mapping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UserRole;

pub const ENTERPRISE_CREATE: &str = "enterprise.create";
pub const ENTERPRISE_READ: &str = "enterprise.read";
pub const ENTERPRISE_UPDATE: &str = "enterprise.update";
pub const ENTERPRISE_DELETE: &str = "enterprise.delete";
pub const ENTERPRISE_VERIFY: &str = "enterprise.verify";
pub const REVIEW_CREATE: &str = "review.create";
pub const REVIEW_READ: &str = "review.read";
pub const REVIEW_MODERATE: &str = "review.moderate";
pub const REVIEW_DELETE: &str = "review.delete";
pub const USER_READ: &str = "user.read";
pub const USER_UPDATE: &str = "user.update";
pub const USER_DELETE: &str = "user.delete";
pub const SYSTEM_ADMIN: &str = "system.admin";

pub const ALL_PERMISSIONS: [&str; 13] = [
    ENTERPRISE_CREATE,
    ENTERPRISE_READ,
    ENTERPRISE_UPDATE,
    ENTERPRISE_DELETE,
    ENTERPRISE_VERIFY,
    REVIEW_CREATE,
    REVIEW_READ,
    REVIEW_MODERATE,
    REVIEW_DELETE,
    USER_READ,
    USER_UPDATE,
    USER_DELETE,
    SYSTEM_ADMIN,
];

impl UserRole {
    /// Built-in permission set for a role
    /// DOCUMENTATION: Mirrors the rows seeded into role_permissions; used when
    /// the table holds no grants for the role
    pub fn default_permissions(&self) -> &'static [&'static str] {
        match self {
            UserRole::Admin => &ALL_PERMISSIONS,
            UserRole::Owner => &[ENTERPRISE_READ, ENTERPRISE_UPDATE, REVIEW_READ],
            UserRole::Staff => &[ENTERPRISE_READ, REVIEW_READ],
            UserRole::User => &[ENTERPRISE_READ, REVIEW_CREATE, REVIEW_READ, USER_READ],
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// Permission together with the roles currently granted it
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PermissionWithRoles {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub roles: Vec<String>,
}

/// Body for granting or revoking a permission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionRequest {
    pub role: UserRole,
    pub permission_id: Uuid,
}

/// Caller's resolved role and permissions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyPermissionsResponse {
    pub user_id: Uuid,
    pub role: UserRole,
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_permission() {
        for name in ALL_PERMISSIONS {
            assert!(UserRole::Admin.default_permissions().contains(&name));
        }
    }

    #[test]
    fn test_default_role_mapping() {
        assert!(UserRole::Owner.default_permissions().contains(&ENTERPRISE_UPDATE));
        assert!(!UserRole::Owner.default_permissions().contains(&ENTERPRISE_DELETE));
        assert!(!UserRole::Staff.default_permissions().contains(&ENTERPRISE_UPDATE));
        assert!(UserRole::User.default_permissions().contains(&REVIEW_CREATE));
        assert!(!UserRole::User.default_permissions().contains(&REVIEW_MODERATE));
    }
}
