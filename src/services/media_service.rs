// src/services/media_service.rs
// DOCUMENTATION: Enterprise media uploads
// PURPOSE: Presign direct uploads, register uploaded objects, delete and purge them

use crate::config::Config;
use crate::db::{EnterpriseRepository, MediaRepository, NewMedia};
use crate::errors::DirectoryError;
use crate::models::subscription::UNLIMITED;
use crate::models::{
    MediaKind, MediaResponse, PresignRequest, PresignResponse, RegisterMediaRequest, User,
    ALLOWED_EXTENSIONS, MAX_MEDIA_BYTES,
};
use crate::services::object_storage::{ObjectStorage, PRESIGN_EXPIRES_SECS};
use crate::services::{RbacService, SubscriptionService};
use chrono::{Duration as ChronoDuration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Soft-deleted media older than this is purged
pub const PURGE_AFTER_DAYS: i64 = 7;

/// Lowercased extension from the type hint or the file name, if allowed
pub fn resolve_extension(file_type: Option<&str>, file_name: &str) -> Result<String, DirectoryError> {
    let raw = match file_type.map(str::trim).filter(|t| !t.is_empty()) {
        Some(hint) => hint.rsplit('/').next().unwrap_or(hint),
        None => file_name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or(""),
    };
    let ext = raw.trim_start_matches('.').to_ascii_lowercase();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(DirectoryError::InvalidInput(format!(
            "File type must be one of: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

pub fn check_size(bytes: i64) -> Result<(), DirectoryError> {
    if bytes > MAX_MEDIA_BYTES {
        log::warn!("Rejected {} byte upload, limit is {}", bytes, MAX_MEDIA_BYTES);
        return Err(DirectoryError::PayloadTooLarge);
    }
    Ok(())
}

/// `limit` of -1 means unlimited
pub fn check_gallery_limit(current: i64, limit: i32) -> Result<(), DirectoryError> {
    if limit != UNLIMITED && current >= i64::from(limit) {
        return Err(DirectoryError::InvalidInput(format!(
            "Gallery limit of {} images reached for the current plan",
            limit
        )));
    }
    Ok(())
}

pub fn object_key(enterprise_id: Uuid, kind: MediaKind, ext: &str) -> String {
    format!(
        "enterprises/{}/{}/{}.{}",
        enterprise_id,
        kind.key_segment(),
        Uuid::new_v4(),
        ext
    )
}

/// Registered keys must sit under the enterprise's own prefix
pub fn check_key_prefix(enterprise_id: Uuid, key: &str) -> Result<(), DirectoryError> {
    let prefix = format!("enterprises/{}/", enterprise_id);
    if !key.starts_with(&prefix) || key.contains("..") || key.len() == prefix.len() {
        return Err(DirectoryError::InvalidInput(
            "Key does not belong to this enterprise".to_string(),
        ));
    }
    Ok(())
}

pub struct MediaService;

impl MediaService {
    async fn authorize_manage(pool: &PgPool, user: &User, enterprise_id: Uuid) -> Result<(), DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, enterprise_id).await?;
        RbacService::require_manage(pool, user, &enterprise).await
    }

    pub async fn presign(
        pool: &PgPool,
        storage: &ObjectStorage,
        user: &User,
        enterprise_id: Uuid,
        req: &PresignRequest,
    ) -> Result<PresignResponse, DirectoryError> {
        Self::authorize_manage(pool, user, enterprise_id).await?;

        let ext = resolve_extension(req.file_type.as_deref(), &req.file_name)?;
        check_size(req.file_size)?;

        if req.media_type == MediaKind::Gallery {
            let features = SubscriptionService::features_for(pool, enterprise_id).await?;
            let current = MediaRepository::count_kind(pool, enterprise_id, MediaKind::Gallery).await?;
            check_gallery_limit(current, features.gallery_images)?;
        }

        let key = object_key(enterprise_id, req.media_type, &ext);
        let upload_url = storage.presign_put(&key);
        log::debug!("Presigned upload {} for enterprise {}", key, enterprise_id);

        Ok(PresignResponse {
            upload_url,
            key,
            expires_in: PRESIGN_EXPIRES_SECS,
        })
    }

    pub async fn register(
        pool: &PgPool,
        config: &Config,
        storage: &ObjectStorage,
        user: &User,
        enterprise_id: Uuid,
        req: &RegisterMediaRequest,
    ) -> Result<MediaResponse, DirectoryError> {
        Self::authorize_manage(pool, user, enterprise_id).await?;
        check_key_prefix(enterprise_id, &req.key)?;
        if let Some(bytes) = req.file_size {
            check_size(bytes)?;
        }

        let media = MediaRepository::create(
            pool,
            NewMedia {
                enterprise_id,
                kind: req.media_type,
                storage_key: &req.key,
                content_type: req.content_type.as_deref(),
                bytes: req.file_size,
                width: req.width,
                height: req.height,
                sort_order: req.sort_order.unwrap_or(0),
            },
        )
        .await?;

        Ok(media.to_response(config.media_base_url(), storage.bucket()))
    }

    pub async fn list(
        pool: &PgPool,
        config: &Config,
        storage: &ObjectStorage,
        user: &User,
        enterprise_id: Uuid,
    ) -> Result<Vec<MediaResponse>, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, enterprise_id).await?;
        RbacService::require_access(pool, user, &enterprise).await?;

        let media = MediaRepository::list_for_enterprise(pool, enterprise_id).await?;
        Ok(media
            .iter()
            .map(|m| m.to_response(config.media_base_url(), storage.bucket()))
            .collect())
    }

    pub async fn delete(
        pool: &PgPool,
        storage: &ObjectStorage,
        user: &User,
        enterprise_id: Uuid,
        media_id: Uuid,
    ) -> Result<(), DirectoryError> {
        Self::authorize_manage(pool, user, enterprise_id).await?;

        let media = MediaRepository::find(pool, enterprise_id, media_id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Media {} not found", media_id)))?;

        if let Err(e) = storage.delete_object(&media.storage_key).await {
            log::warn!("Object for media {} not deleted: {}", media_id, e);
        }
        MediaRepository::soft_delete(pool, media_id).await
    }

    /// Purge soft-deleted rows; rows whose object delete fails are kept for the next run
    pub async fn cleanup(pool: &PgPool, storage: &ObjectStorage) -> Result<usize, DirectoryError> {
        let cutoff = Utc::now() - ChronoDuration::days(PURGE_AFTER_DAYS);
        let stale = MediaRepository::deleted_before(pool, cutoff).await?;

        let mut purged = 0;
        for media in stale {
            if let Err(e) = storage.delete_object(&media.storage_key).await {
                log::warn!("Skipping purge of media {}: {}", media.id, e);
                continue;
            }
            MediaRepository::purge(pool, media.id).await?;
            purged += 1;
        }

        if purged > 0 {
            log::info!("Purged {} deleted media rows", purged);
        }
        Ok(purged)
    }
}

/// Start background task to purge deleted media periodically
pub fn start_media_cleanup_task(pool: PgPool, storage: Arc<ObjectStorage>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            if let Err(e) = MediaService::cleanup(&pool, &storage).await {
                log::error!("Media cleanup failed: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_extension() {
        assert_eq!(resolve_extension(Some("PNG"), "x.gif").unwrap(), "png");
        assert_eq!(resolve_extension(Some("image/webp"), "x").unwrap(), "webp");
        assert_eq!(resolve_extension(None, "storefront.JPeG").unwrap(), "jpeg");
        assert!(resolve_extension(None, "menu.pdf").is_err());
        assert!(resolve_extension(Some(""), "noext").is_err());
    }

    #[test]
    fn test_size_limit() {
        assert!(check_size(MAX_MEDIA_BYTES).is_ok());
        assert!(matches!(
            check_size(MAX_MEDIA_BYTES + 1),
            Err(DirectoryError::PayloadTooLarge)
        ));
    }

    #[test]
    fn test_gallery_limit() {
        assert!(check_gallery_limit(2, 3).is_ok());
        assert!(check_gallery_limit(3, 3).is_err());
        assert!(check_gallery_limit(500, UNLIMITED).is_ok());
    }

    #[test]
    fn test_object_keys() {
        let id = Uuid::new_v4();
        let key = object_key(id, MediaKind::Gallery, "png");
        assert!(key.starts_with(&format!("enterprises/{}/gallery/", id)));
        assert!(key.ends_with(".png"));
        assert!(check_key_prefix(id, &key).is_ok());

        assert!(check_key_prefix(id, &format!("enterprises/{}/", Uuid::new_v4())).is_err());
        assert!(check_key_prefix(id, &format!("enterprises/{}/../other.png", id)).is_err());
        assert!(check_key_prefix(id, &format!("enterprises/{}/", id)).is_err());
    }
}
