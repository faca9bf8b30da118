// src/db/rbac_repository.rs
// DOCUMENTATION: Permission catalogue and role grants

use crate::errors::DirectoryError;
use crate::models::{Permission, PermissionWithRoles, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

pub struct RbacRepository;

impl RbacRepository {
    /// Permission names granted to a role
    pub async fn permission_names_for_role(
        pool: &PgPool,
        role: UserRole,
    ) -> Result<Vec<String>, DirectoryError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role = $1
            ORDER BY p.name
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to load role permissions", e))
    }

    pub async fn list_with_roles(pool: &PgPool) -> Result<Vec<PermissionWithRoles>, DirectoryError> {
        sqlx::query_as::<_, PermissionWithRoles>(
            r#"
            SELECT p.id, p.name, p.description, p.resource, p.action,
                   COALESCE(
                       array_agg(rp.role::text ORDER BY rp.role) FILTER (WHERE rp.role IS NOT NULL),
                       ARRAY[]::text[]
                   ) AS roles
            FROM permissions p
            LEFT JOIN role_permissions rp ON rp.permission_id = p.id
            GROUP BY p.id
            ORDER BY p.resource, p.name
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list permissions", e))
    }

    pub async fn find_permission(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<Permission>, DirectoryError> {
        sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch permission", e))
    }

    /// Grant is idempotent; returns whether a new row was written
    pub async fn grant(
        pool: &PgPool,
        role: UserRole,
        permission_id: Uuid,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role, permission_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role)
        .bind(permission_id)
        .execute(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to grant permission", e))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke(
        pool: &PgPool,
        role: UserRole,
        permission_id: Uuid,
    ) -> Result<bool, DirectoryError> {
        let result =
            sqlx::query("DELETE FROM role_permissions WHERE role = $1 AND permission_id = $2")
                .bind(role)
                .bind(permission_id)
                .execute(pool)
                .await
                .map_err(|e| DirectoryError::database("Failed to revoke permission", e))?;
        Ok(result.rows_affected() > 0)
    }
}
