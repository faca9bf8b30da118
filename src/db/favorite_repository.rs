// src/db/favorite_repository.rs

use crate::errors::DirectoryError;
use crate::models::Enterprise;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Insert a favorite; the composite primary key rejects duplicates with 409
    pub async fn add(
        pool: &PgPool,
        user_id: Uuid,
        enterprise_id: Uuid,
    ) -> Result<DateTime<Utc>, DirectoryError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            INSERT INTO favorites (user_id, enterprise_id)
            VALUES ($1, $2)
            RETURNING created_at
            "#,
        )
        .bind(user_id)
        .bind(enterprise_id)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to add favorite", e))
    }

    pub async fn remove(
        pool: &PgPool,
        user_id: Uuid,
        enterprise_id: Uuid,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND enterprise_id = $2")
            .bind(user_id)
            .bind(enterprise_id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to remove favorite", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Favorite timestamps with their enterprises, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<(DateTime<Utc>, Enterprise)>, DirectoryError> {
        let created: Vec<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT f.enterprise_id, f.created_at
            FROM favorites f
            JOIN enterprises e ON e.id = f.enterprise_id
            WHERE f.user_id = $1 AND e.deleted_at IS NULL
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list favorites", e))?;

        let ids: Vec<Uuid> = created.iter().map(|(id, _)| *id).collect();
        let enterprises = sqlx::query_as::<_, Enterprise>(
            "SELECT * FROM enterprises WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to load favorite enterprises", e))?;

        Ok(created
            .into_iter()
            .filter_map(|(id, at)| {
                enterprises
                    .iter()
                    .find(|e| e.id == id)
                    .map(|e| (at, e.clone()))
            })
            .collect())
    }
}
