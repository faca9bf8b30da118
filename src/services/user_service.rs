// src/services/user_service.rs

use crate::db::UserRepository;
use crate::errors::DirectoryError;
use crate::models::audit::{ENTITY_USER, USER_DEACTIVATED, USER_UPDATED};
use crate::models::{
    AdminUpdateUserRequest, ListUsersQuery, Paginated, Pagination, UpdateProfileRequest, User,
    UserResponse,
};
use crate::services::AuditService;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserService;

impl UserService {
    pub async fn update_me(
        pool: &PgPool,
        user: &User,
        req: &UpdateProfileRequest,
    ) -> Result<UserResponse, DirectoryError> {
        let display_name = req.display_name.as_deref().map(str::trim);
        let updated = UserRepository::update_display_name(pool, user.id, display_name).await?;
        Ok(updated.to_response())
    }

    pub async fn list(
        pool: &PgPool,
        query: &ListUsersQuery,
    ) -> Result<Paginated<UserResponse>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (users, total) = UserRepository::list(pool, query, pagination).await?;
        let data = users.iter().map(User::to_response).collect();
        Ok(Paginated::new(data, total, pagination))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<UserResponse, DirectoryError> {
        Ok(UserRepository::get_by_id(pool, id).await?.to_response())
    }

    pub async fn admin_update(
        pool: &PgPool,
        admin: &User,
        id: Uuid,
        req: &AdminUpdateUserRequest,
    ) -> Result<UserResponse, DirectoryError> {
        if admin.id == id && (req.is_active == Some(false) || req.role.is_some_and(|r| r != admin.role)) {
            return Err(DirectoryError::InvalidInput(
                "Admins cannot change their own role or deactivate themselves".to_string(),
            ));
        }

        let before = UserRepository::get_by_id(pool, id).await?;
        let updated = UserRepository::admin_update(pool, id, req).await?;

        AuditService::log(
            pool,
            Some(admin.id),
            USER_UPDATED,
            ENTITY_USER,
            Some(id),
            json!({
                "role": { "from": before.role, "to": updated.role },
                "isActive": { "from": before.is_active, "to": updated.is_active },
                "emailVerified": updated.email_verified,
            }),
        )
        .await;
        Ok(updated.to_response())
    }

    pub async fn deactivate(pool: &PgPool, admin: &User, id: Uuid) -> Result<UserResponse, DirectoryError> {
        if admin.id == id {
            return Err(DirectoryError::InvalidInput(
                "Admins cannot deactivate themselves".to_string(),
            ));
        }

        let user = UserRepository::deactivate(pool, id).await?;
        log::info!("User {} deactivated by {}", id, admin.id);
        AuditService::log(
            pool,
            Some(admin.id),
            USER_DEACTIVATED,
            ENTITY_USER,
            Some(id),
            json!({ "email": user.email }),
        )
        .await;
        Ok(user.to_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::test_support;

    #[actix_web::test]
    async fn test_admin_cannot_lock_themselves_out() {
        let pool = test_support::lazy_pool();
        let admin = test_support::user(UserRole::Admin);

        let demote = AdminUpdateUserRequest {
            display_name: None,
            role: Some(UserRole::User),
            is_active: None,
            email_verified: None,
        };
        let err = UserService::admin_update(&pool, &admin, admin.id, &demote)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidInput(_)));

        let err = UserService::deactivate(&pool, &admin, admin.id).await.unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidInput(_)));
    }
}
