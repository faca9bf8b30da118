// src/db/audit_repository.rs
// DOCUMENTATION: Audit log persistence
// PURPOSE: Append, query and prune audit entries

use crate::errors::DirectoryError;
use crate::models::{AuditLog, ListAuditLogsQuery, Pagination};
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct AuditRepository;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListAuditLogsQuery) {
    qb.push(" WHERE 1 = 1");

    if let Some(actor) = query.actor_user_id {
        qb.push(" AND actor_user_id = ").push_bind(actor);
    }
    if let Some(action) = query.action.as_deref().filter(|a| !a.is_empty()) {
        qb.push(" AND action = ").push_bind(action.to_string());
    }
    if let Some(entity_type) = query.entity_type.as_deref().filter(|t| !t.is_empty()) {
        qb.push(" AND entity_type = ").push_bind(entity_type.to_string());
    }
    if let Some(entity_id) = query.entity_id {
        qb.push(" AND entity_id = ").push_bind(entity_id);
    }
    if let Some(start) = query.start_date {
        qb.push(" AND created_at >= ").push_bind(start);
    }
    if let Some(end) = query.end_date {
        qb.push(" AND created_at <= ").push_bind(end);
    }
}

impl AuditRepository {
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        actor_user_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Option<Uuid>,
        metadata: &serde_json::Value,
    ) -> Result<AuditLog, DirectoryError> {
        sqlx::query_as::<_, AuditLog>(
            r#"
            INSERT INTO audit_log (actor_user_id, action, entity_type, entity_id, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(actor_user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(metadata)
        .fetch_one(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to write audit log", e))
    }

    pub async fn list(
        pool: &PgPool,
        query: &ListAuditLogsQuery,
        pagination: Pagination,
    ) -> Result<(Vec<AuditLog>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_log");
        push_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count audit logs", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM audit_log");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let logs = qb
            .build_query_as::<AuditLog>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list audit logs", e))?;

        Ok((logs, total))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AuditLog>, DirectoryError> {
        sqlx::query_as::<_, AuditLog>("SELECT * FROM audit_log WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch audit log", e))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, DirectoryError> {
        let result = sqlx::query("DELETE FROM audit_log WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to delete audit log", e))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_older_than(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DirectoryError> {
        let result = sqlx::query("DELETE FROM audit_log WHERE created_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to prune audit logs", e))?;
        Ok(result.rows_affected())
    }
}
