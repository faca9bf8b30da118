// src/services/rbac_service.rs
// DOCUMENTATION: Role-based access control
// PURPOSE: Permission resolution and enterprise-level access checks

use crate::db::{EnterpriseRepository, RbacRepository};
use crate::errors::DirectoryError;
use crate::models::audit::{ENTITY_PERMISSION, PERMISSION_GRANTED, PERMISSION_REVOKED};
use crate::models::rbac::SYSTEM_ADMIN;
use crate::models::{
    Enterprise, EnterpriseStaff, MyPermissionsResponse, PermissionWithRoles, RolePermissionRequest,
    User, UserRole,
};
use crate::services::AuditService;
use serde_json::json;
use sqlx::PgPool;

/// Stored grants for a role, or the built-in mapping when none are stored
pub fn resolve_permissions(role: UserRole, stored: Vec<String>) -> Vec<String> {
    if stored.is_empty() {
        role.default_permissions()
            .iter()
            .map(|p| p.to_string())
            .collect()
    } else {
        stored
    }
}

/// Staff membership check; `manage` additionally requires MANAGER or EDITOR
pub fn staff_allows(staff: Option<&EnterpriseStaff>, manage: bool) -> bool {
    match staff {
        Some(member) => !manage || member.role.can_edit(),
        None => false,
    }
}

pub struct RbacService;

impl RbacService {
    pub fn is_admin(user: &User) -> bool {
        user.role == UserRole::Admin
    }

    pub fn is_owner(user: &User, enterprise: &Enterprise) -> bool {
        enterprise.owner_user_id == Some(user.id)
    }

    pub async fn permissions_for_role(
        pool: &PgPool,
        role: UserRole,
    ) -> Result<Vec<String>, DirectoryError> {
        let stored = RbacRepository::permission_names_for_role(pool, role).await?;
        Ok(resolve_permissions(role, stored))
    }

    pub async fn has_permission(
        pool: &PgPool,
        user: &User,
        permission: &str,
    ) -> Result<bool, DirectoryError> {
        let permissions = Self::permissions_for_role(pool, user.role).await?;
        Ok(permissions
            .iter()
            .any(|p| p == permission || p == SYSTEM_ADMIN))
    }

    pub async fn require_permission(
        pool: &PgPool,
        user: &User,
        permission: &str,
    ) -> Result<(), DirectoryError> {
        if Self::has_permission(pool, user, permission).await? {
            return Ok(());
        }
        log::warn!("User {} lacks permission {}", user.id, permission);
        Err(DirectoryError::Forbidden(format!(
            "Missing permission: {}",
            permission
        )))
    }

    /// ADMIN, owner, or any staff member
    pub async fn can_access_enterprise(
        pool: &PgPool,
        user: &User,
        enterprise: &Enterprise,
    ) -> Result<bool, DirectoryError> {
        if Self::is_admin(user) || Self::is_owner(user, enterprise) {
            return Ok(true);
        }
        let staff = EnterpriseRepository::find_staff(pool, enterprise.id, user.id).await?;
        Ok(staff_allows(staff.as_ref(), false))
    }

    /// ADMIN, owner, or staff with MANAGER/EDITOR role
    pub async fn can_manage_enterprise(
        pool: &PgPool,
        user: &User,
        enterprise: &Enterprise,
    ) -> Result<bool, DirectoryError> {
        if Self::is_admin(user) || Self::is_owner(user, enterprise) {
            return Ok(true);
        }
        let staff = EnterpriseRepository::find_staff(pool, enterprise.id, user.id).await?;
        Ok(staff_allows(staff.as_ref(), true))
    }

    pub async fn require_access(
        pool: &PgPool,
        user: &User,
        enterprise: &Enterprise,
    ) -> Result<(), DirectoryError> {
        if Self::can_access_enterprise(pool, user, enterprise).await? {
            Ok(())
        } else {
            Err(DirectoryError::Forbidden(
                "You do not have access to this enterprise".to_string(),
            ))
        }
    }

    pub async fn require_manage(
        pool: &PgPool,
        user: &User,
        enterprise: &Enterprise,
    ) -> Result<(), DirectoryError> {
        if Self::can_manage_enterprise(pool, user, enterprise).await? {
            Ok(())
        } else {
            Err(DirectoryError::Forbidden(
                "You cannot manage this enterprise".to_string(),
            ))
        }
    }

    pub async fn list_permissions(pool: &PgPool) -> Result<Vec<PermissionWithRoles>, DirectoryError> {
        RbacRepository::list_with_roles(pool).await
    }

    pub async fn my_permissions(
        pool: &PgPool,
        user: &User,
    ) -> Result<MyPermissionsResponse, DirectoryError> {
        Ok(MyPermissionsResponse {
            user_id: user.id,
            role: user.role,
            permissions: Self::permissions_for_role(pool, user.role).await?,
        })
    }

    /// Grant a permission to a role (idempotent)
    pub async fn grant(
        pool: &PgPool,
        actor: &User,
        req: &RolePermissionRequest,
    ) -> Result<bool, DirectoryError> {
        let permission = RbacRepository::find_permission(pool, req.permission_id)
            .await?
            .ok_or_else(|| {
                DirectoryError::NotFound(format!("Permission {} not found", req.permission_id))
            })?;

        let created = RbacRepository::grant(pool, req.role, permission.id).await?;
        if created {
            log::info!("Granted {} to {}", permission.name, req.role.as_str());
            AuditService::log(
                pool,
                Some(actor.id),
                PERMISSION_GRANTED,
                ENTITY_PERMISSION,
                Some(permission.id),
                json!({ "role": req.role, "permission": permission.name }),
            )
            .await;
        }
        Ok(created)
    }

    pub async fn revoke(
        pool: &PgPool,
        actor: &User,
        req: &RolePermissionRequest,
    ) -> Result<(), DirectoryError> {
        if !RbacRepository::revoke(pool, req.role, req.permission_id).await? {
            return Err(DirectoryError::NotFound(format!(
                "Role {} does not hold permission {}",
                req.role.as_str(),
                req.permission_id
            )));
        }

        log::info!("Revoked {} from {}", req.permission_id, req.role.as_str());
        AuditService::log(
            pool,
            Some(actor.id),
            PERMISSION_REVOKED,
            ENTITY_PERMISSION,
            Some(req.permission_id),
            json!({ "role": req.role }),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffRole;
    use crate::test_support;
    use chrono::Utc;
    use uuid::Uuid;

    fn staff(role: StaffRole) -> EnterpriseStaff {
        EnterpriseStaff {
            id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolve_permissions_falls_back_to_defaults() {
        let defaults = resolve_permissions(UserRole::Owner, Vec::new());
        assert_eq!(
            defaults,
            vec!["enterprise.read", "enterprise.update", "review.read"]
        );

        let stored = resolve_permissions(UserRole::Owner, vec!["review.moderate".to_string()]);
        assert_eq!(stored, vec!["review.moderate"]);

        assert_eq!(resolve_permissions(UserRole::Admin, Vec::new()).len(), 13);
    }

    #[test]
    fn test_staff_allows() {
        assert!(staff_allows(Some(&staff(StaffRole::Viewer)), false));
        assert!(!staff_allows(Some(&staff(StaffRole::Viewer)), true));
        assert!(staff_allows(Some(&staff(StaffRole::Editor)), true));
        assert!(staff_allows(Some(&staff(StaffRole::Manager)), true));
        assert!(!staff_allows(None, false));
    }

    #[test]
    fn test_admin_and_owner() {
        let owner = test_support::user(UserRole::Owner);
        let admin = test_support::user(UserRole::Admin);
        let enterprise = test_support::enterprise(Some(owner.id));

        assert!(RbacService::is_owner(&owner, &enterprise));
        assert!(!RbacService::is_owner(&admin, &enterprise));
        assert!(RbacService::is_admin(&admin));
        assert!(!RbacService::is_admin(&owner));
    }
}
