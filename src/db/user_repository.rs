// src/db/user_repository.rs
// DOCUMENTATION: Database access for user accounts
// PURPOSE: All SQL touching the users table

use crate::db::like_pattern;
use crate::errors::DirectoryError;
use crate::models::{AdminUpdateUserRequest, ListUsersQuery, Pagination, User, UserRole};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct UserRepository;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListUsersQuery) {
    qb.push(" WHERE deleted_at IS NULL");

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR display_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = query.role {
        qb.push(" AND role = ").push_bind(role);
    }
    if let Some(is_active) = query.is_active {
        qb.push(" AND is_active = ").push_bind(is_active);
    }
}

impl UserRepository {
    /// Insert a new user
    /// DOCUMENTATION: Unique violation on email surfaces as DuplicateEntry (409)
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        display_name: Option<&str>,
        role: UserRole,
    ) -> Result<User, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, display_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to create user", e))?;

        log::info!("Created user {} with role {}", user.id, user.role.as_str());
        Ok(user)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DirectoryError> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch user by email", e))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, DirectoryError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch user", e))
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<User, DirectoryError> {
        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("User {} not found", id)))
    }

    pub async fn list(
        pool: &PgPool,
        query: &ListUsersQuery,
        pagination: Pagination,
    ) -> Result<(Vec<User>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count users", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM users");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let users = qb
            .build_query_as::<User>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list users", e))?;

        Ok((users, total))
    }

    pub async fn update_display_name(
        pool: &PgPool,
        id: Uuid,
        display_name: Option<&str>,
    ) -> Result<User, DirectoryError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET display_name = COALESCE($2, display_name)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(display_name)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to update profile", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("User {} not found", id)))
    }

    pub async fn admin_update(
        pool: &PgPool,
        id: Uuid,
        req: &AdminUpdateUserRequest,
    ) -> Result<User, DirectoryError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                display_name = COALESCE($2, display_name),
                role = COALESCE($3, role),
                is_active = COALESCE($4, is_active),
                email_verified = COALESCE($5, email_verified)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.display_name)
        .bind(req.role)
        .bind(req.is_active)
        .bind(req.email_verified)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to update user", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("User {} not found", id)))
    }

    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to update password", e))?;
        Ok(())
    }

    pub async fn mark_email_verified(pool: &PgPool, id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE users SET email_verified = true WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to verify email", e))?;
        Ok(())
    }

    /// Promote a plain USER to OWNER; other roles are left untouched
    pub async fn promote_to_owner<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query("UPDATE users SET role = 'OWNER' WHERE id = $1 AND role = 'USER'")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| DirectoryError::database("Failed to promote user", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft delete: the account can no longer authenticate
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<User, DirectoryError> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET is_active = false WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to deactivate user", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("User {} not found", id)))
    }
}
