// src/db/claim_repository.rs
// DOCUMENTATION: Database access for ownership claims
// PURPOSE: Claim inserts, listings and status updates

use crate::errors::DirectoryError;
use crate::models::{Claim, ClaimStatus, ListClaimsQuery, Pagination, SubmitClaimRequest};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct ClaimRepository;

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    query: &ListClaimsQuery,
    requester: Option<Uuid>,
) {
    qb.push(" WHERE deleted_at IS NULL");

    if let Some(user_id) = requester {
        qb.push(" AND requester_user_id = ").push_bind(user_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(enterprise_id) = query.enterprise_id {
        qb.push(" AND enterprise_id = ").push_bind(enterprise_id);
    }
}

impl ClaimRepository {
    pub async fn create(
        pool: &PgPool,
        requester_user_id: Uuid,
        req: &SubmitClaimRequest,
    ) -> Result<Claim, DirectoryError> {
        let claim = sqlx::query_as::<_, Claim>(
            r#"
            INSERT INTO claims (
                enterprise_id, requester_user_id, requester_name, requester_email,
                requester_phone, position, proof_of_ownership
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(req.enterprise_id)
        .bind(requester_user_id)
        .bind(&req.requester_name)
        .bind(&req.requester_email)
        .bind(&req.requester_phone)
        .bind(&req.position)
        .bind(&req.proof_of_ownership)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to create claim", e))?;

        log::info!(
            "Claim {} submitted for enterprise {} by {}",
            claim.id,
            claim.enterprise_id,
            requester_user_id
        );
        Ok(claim)
    }

    /// Whether the user already has a SUBMITTED or IN_REVIEW claim on the enterprise
    pub async fn has_open_claim(
        pool: &PgPool,
        enterprise_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DirectoryError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM claims
                WHERE enterprise_id = $1 AND requester_user_id = $2
                  AND status IN ('SUBMITTED', 'IN_REVIEW') AND deleted_at IS NULL
            )
            "#,
        )
        .bind(enterprise_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to check open claims", e))
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Claim>, DirectoryError> {
        sqlx::query_as::<_, Claim>("SELECT * FROM claims WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch claim", e))
    }

    /// List claims newest first, optionally restricted to one requester
    pub async fn list(
        pool: &PgPool,
        query: &ListClaimsQuery,
        requester: Option<Uuid>,
        pagination: Pagination,
    ) -> Result<(Vec<Claim>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM claims");
        push_filters(&mut count_qb, query, requester);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count claims", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM claims");
        push_filters(&mut qb, query, requester);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let claims = qb
            .build_query_as::<Claim>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list claims", e))?;

        Ok((claims, total))
    }

    /// Move a claim to its next state
    /// DOCUMENTATION: Guarded on the expected current status so concurrent reviews
    /// cannot both apply; returns None when the claim changed underneath
    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        expected: ClaimStatus,
        next: ClaimStatus,
        reviewer_id: Uuid,
        review_notes: Option<&str>,
    ) -> Result<Option<Claim>, DirectoryError> {
        sqlx::query_as::<_, Claim>(
            r#"
            UPDATE claims SET
                status = $3,
                reviewed_by_user_id = $4,
                review_notes = COALESCE($5, review_notes)
            WHERE id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .bind(reviewer_id)
        .bind(review_notes)
        .fetch_optional(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to update claim", e))
    }
}
