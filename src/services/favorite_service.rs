// src/services/favorite_service.rs

use crate::db::{EnterpriseRepository, FavoriteRepository};
use crate::errors::DirectoryError;
use crate::models::{FavoriteResponse, User};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FavoriteService;

impl FavoriteService {
    /// Bookmark an enterprise; duplicates surface as 409 from the primary key
    pub async fn add(
        pool: &PgPool,
        user: &User,
        enterprise_id: Uuid,
    ) -> Result<FavoriteResponse, DirectoryError> {
        let enterprise = EnterpriseRepository::find_by_id(pool, enterprise_id)
            .await?
            .ok_or_else(|| DirectoryError::InvalidReference("enterprise".to_string()))?;

        let created_at = FavoriteRepository::add(pool, user.id, enterprise_id).await?;
        Ok(FavoriteResponse {
            enterprise_id,
            created_at,
            enterprise,
        })
    }

    pub async fn remove(pool: &PgPool, user: &User, enterprise_id: Uuid) -> Result<(), DirectoryError> {
        if !FavoriteRepository::remove(pool, user.id, enterprise_id).await? {
            return Err(DirectoryError::NotFound(format!(
                "Enterprise {} is not in your favorites",
                enterprise_id
            )));
        }
        Ok(())
    }

    /// Newest first
    pub async fn list(pool: &PgPool, user: &User) -> Result<Vec<FavoriteResponse>, DirectoryError> {
        let rows = FavoriteRepository::list_for_user(pool, user.id).await?;
        Ok(rows
            .into_iter()
            .map(|(created_at, enterprise)| FavoriteResponse {
                enterprise_id: enterprise.id,
                created_at,
                enterprise,
            })
            .collect())
    }
}
