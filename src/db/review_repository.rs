// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Handle review CRUD, moderation updates and rating aggregation

use crate::errors::DirectoryError;
use crate::models::{ListReviewsQuery, Pagination, Review, ReviewStatus};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Values for a review insert
pub struct NewReview<'a> {
    pub enterprise_id: Uuid,
    pub author_user_id: Option<Uuid>,
    pub author_name: Option<&'a str>,
    pub rating: i16,
    pub comment: Option<&'a str>,
    pub status: ReviewStatus,
    pub ip_hash: Option<String>,
    pub user_agent_hash: Option<String>,
}

pub struct ReviewRepository;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ListReviewsQuery) {
    qb.push(" WHERE deleted_at IS NULL");

    if let Some(enterprise_id) = query.enterprise_id {
        qb.push(" AND enterprise_id = ").push_bind(enterprise_id);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(rating) = query.rating {
        qb.push(" AND rating = ").push_bind(rating);
    }
}

impl ReviewRepository {
    /// Create a new review
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        new: NewReview<'_>,
    ) -> Result<Review, DirectoryError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (
                enterprise_id, author_user_id, author_name, rating, comment,
                status, ip_hash, user_agent_hash
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.enterprise_id)
        .bind(new.author_user_id)
        .bind(new.author_name)
        .bind(new.rating)
        .bind(new.comment)
        .bind(new.status)
        .bind(new.ip_hash)
        .bind(new.user_agent_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to create review", e))?;

        log::info!(
            "Created review {} for enterprise {} ({:?})",
            review.id,
            review.enterprise_id,
            review.status
        );
        Ok(review)
    }

    /// Fetch and row-lock a review until the surrounding transaction ends
    pub async fn find_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<Option<Review>, DirectoryError> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to lock review", e))
    }

    /// List reviews newest first
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        query: &ListReviewsQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Review>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reviews");
        push_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count reviews", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM reviews");
        push_filters(&mut qb, query);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let reviews = qb
            .build_query_as::<Review>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list reviews", e))?;

        Ok((reviews, total))
    }

    pub async fn set_status<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        status: ReviewStatus,
        moderation_notes: Option<&str>,
        moderator_id: Uuid,
    ) -> Result<Review, DirectoryError> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews SET
                status = $2,
                moderation_notes = COALESCE($3, moderation_notes),
                moderated_by_user_id = $4
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(moderation_notes)
        .bind(moderator_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to moderate review", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("Review {} not found", id)))
    }

    /// Average and count of published reviews for an enterprise
    /// DOCUMENTATION: Average is None when there are no published reviews
    pub async fn rating_stats<'e, E: PgExecutor<'e>>(
        executor: E,
        enterprise_id: Uuid,
    ) -> Result<(Option<f64>, i64), DirectoryError> {
        sqlx::query_as::<_, (Option<f64>, i64)>(
            r#"
            SELECT AVG(rating)::float8, COUNT(*)
            FROM reviews
            WHERE enterprise_id = $1 AND status = 'PUBLISHED' AND deleted_at IS NULL
            "#,
        )
        .bind(enterprise_id)
        .fetch_one(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to aggregate ratings", e))
    }
}
