// src/db/media_repository.rs
// DOCUMENTATION: Enterprise media metadata
// PURPOSE: Rows pointing at objects in S3-compatible storage

use crate::errors::DirectoryError;
use crate::models::{EnterpriseMedia, MediaKind};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Values for registering an uploaded object
pub struct NewMedia<'a> {
    pub enterprise_id: Uuid,
    pub kind: MediaKind,
    pub storage_key: &'a str,
    pub content_type: Option<&'a str>,
    pub bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: i32,
}

pub struct MediaRepository;

impl MediaRepository {
    pub async fn create(pool: &PgPool, new: NewMedia<'_>) -> Result<EnterpriseMedia, DirectoryError> {
        let media = sqlx::query_as::<_, EnterpriseMedia>(
            r#"
            INSERT INTO enterprise_media (
                enterprise_id, kind, storage_key, content_type, bytes, width, height, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.enterprise_id)
        .bind(new.kind)
        .bind(new.storage_key)
        .bind(new.content_type)
        .bind(new.bytes)
        .bind(new.width)
        .bind(new.height)
        .bind(new.sort_order)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to register media", e))?;

        log::info!("Registered media {} for enterprise {}", media.id, media.enterprise_id);
        Ok(media)
    }

    /// Live media ordered for display
    pub async fn list_for_enterprise(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Vec<EnterpriseMedia>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseMedia>(
            r#"
            SELECT * FROM enterprise_media
            WHERE enterprise_id = $1 AND deleted_at IS NULL
            ORDER BY kind, sort_order, created_at
            "#,
        )
        .bind(enterprise_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list media", e))
    }

    pub async fn count_kind(
        pool: &PgPool,
        enterprise_id: Uuid,
        kind: MediaKind,
    ) -> Result<i64, DirectoryError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM enterprise_media
            WHERE enterprise_id = $1 AND kind = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(enterprise_id)
        .bind(kind)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to count media", e))
    }

    pub async fn find(
        pool: &PgPool,
        enterprise_id: Uuid,
        media_id: Uuid,
    ) -> Result<Option<EnterpriseMedia>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseMedia>(
            r#"
            SELECT * FROM enterprise_media
            WHERE id = $1 AND enterprise_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(media_id)
        .bind(enterprise_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch media", e))
    }

    pub async fn soft_delete(pool: &PgPool, media_id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE enterprise_media SET deleted_at = now() WHERE id = $1")
            .bind(media_id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to delete media", e))?;
        Ok(())
    }

    /// Rows soft-deleted before the cutoff, candidates for purging
    pub async fn deleted_before(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<EnterpriseMedia>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseMedia>(
            "SELECT * FROM enterprise_media WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list deleted media", e))
    }

    pub async fn purge(pool: &PgPool, media_id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("DELETE FROM enterprise_media WHERE id = $1")
            .bind(media_id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to purge media", e))?;
        Ok(())
    }
}
