// src/services/audit_service.rs
// DOCUMENTATION: Audit trail recording and administration

use crate::db::AuditRepository;
use crate::errors::DirectoryError;
use crate::models::{
    AuditLog, ClearAuditLogsQuery, DeletedCount, ListAuditLogsQuery, Paginated, Pagination,
};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Default retention for DELETE /audit/logs
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

pub struct AuditService;

impl AuditService {
    /// Record an action
    /// DOCUMENTATION: Audit failures are logged and never fail the caller's request
    pub async fn log(
        pool: &PgPool,
        actor_user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        metadata: serde_json::Value,
    ) {
        match AuditRepository::insert(pool, actor_user_id, action, entity_type, entity_id, &metadata)
            .await
        {
            Ok(entry) => log::debug!("Audit {} on {} {:?} ({})", action, entity_type, entity_id, entry.id),
            Err(e) => log::error!("Failed to record audit {} on {}: {}", action, entity_type, e),
        }
    }

    pub async fn list(
        pool: &PgPool,
        query: &ListAuditLogsQuery,
    ) -> Result<Paginated<AuditLog>, DirectoryError> {
        let pagination = Pagination::with_default(query.page, query.limit, 50);
        let (logs, total) = AuditRepository::list(pool, query, pagination).await?;
        Ok(Paginated::new(logs, total, pagination))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<AuditLog, DirectoryError> {
        AuditRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Audit log {} not found", id)))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DirectoryError> {
        if !AuditRepository::delete(pool, id).await? {
            return Err(DirectoryError::NotFound(format!("Audit log {} not found", id)));
        }
        Ok(())
    }

    /// Remove entries older than `days` (default 90)
    pub async fn clear_older_than(
        pool: &PgPool,
        query: &ClearAuditLogsQuery,
    ) -> Result<DeletedCount, DirectoryError> {
        let days = query.days.unwrap_or(DEFAULT_RETENTION_DAYS);
        if days < 1 {
            return Err(DirectoryError::InvalidInput("days must be at least 1".to_string()));
        }

        let cutoff = Utc::now() - Duration::days(days);
        let deleted = AuditRepository::delete_older_than(pool, cutoff).await?;
        log::info!("Pruned {} audit entries older than {} days", deleted, days);
        Ok(DeletedCount { deleted })
    }
}
