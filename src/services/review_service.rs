// src/services/review_service.rs
// DOCUMENTATION: Review submission, listing and moderation
// PURPOSE: Keeps enterprise rating_avg/rating_count in step with published reviews

use crate::db::{EnterpriseRepository, NewReview, ReviewRepository};
use crate::errors::DirectoryError;
use crate::middleware::ClientInfo;
use crate::models::audit::{ENTITY_REVIEW, REVIEW_MODERATED};
use crate::models::rbac::REVIEW_MODERATE;
use crate::models::{
    round_rating, CreateReviewRequest, ListReviewsQuery, ModerateReviewRequest, Paginated,
    Pagination, Review, ReviewStatus, User,
};
use crate::services::search_index::SearchIndex;
use crate::services::{
    sha256_hex, AuditService, RateLimiter, RbacService, SearchService, UserAction,
};
use crate::services::enterprise_service::sanitize_name;
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Rounded average and count written back to the enterprise
pub fn rating_summary(avg: Option<f64>, count: i64) -> (f64, i32) {
    let count = i32::try_from(count).unwrap_or(i32::MAX);
    match avg {
        Some(avg) if count > 0 => (round_rating(avg), count),
        _ => (0.0, 0),
    }
}

/// Initial moderation state: signed-in authors publish immediately
pub fn initial_status(authenticated: bool) -> ReviewStatus {
    if authenticated {
        ReviewStatus::Published
    } else {
        ReviewStatus::Pending
    }
}

/// Resolve the display name stored with the review
fn author_name(author: Option<&User>, requested: Option<&str>) -> Result<Option<String>, DirectoryError> {
    let requested = requested
        .map(sanitize_name)
        .filter(|name| !name.is_empty());

    match author {
        Some(user) => Ok(requested.or_else(|| user.display_name.clone())),
        None => requested.map(Some).ok_or_else(|| {
            DirectoryError::InvalidInput("authorName is required for anonymous reviews".to_string())
        }),
    }
}

pub struct ReviewService;

impl ReviewService {
    /// Recompute the aggregate inside the caller's transaction
    /// DOCUMENTATION: The enterprise row is locked first so concurrent
    /// moderation of the same enterprise serializes
    async fn recompute_rating(
        conn: &mut PgConnection,
        enterprise_id: Uuid,
    ) -> Result<(f64, i32), DirectoryError> {
        EnterpriseRepository::lock_for_update(&mut *conn, enterprise_id).await?;
        let (avg, count) = ReviewRepository::rating_stats(&mut *conn, enterprise_id).await?;
        let (rating_avg, rating_count) = rating_summary(avg, count);
        EnterpriseRepository::set_rating(&mut *conn, enterprise_id, rating_avg, rating_count).await?;

        log::debug!(
            "Enterprise {} rating now {} from {} reviews",
            enterprise_id,
            rating_avg,
            rating_count
        );
        Ok((rating_avg, rating_count))
    }

    async fn reindex(pool: &PgPool, index: &SearchIndex, enterprise_id: Uuid) {
        if let Ok(enterprise) = EnterpriseRepository::get_by_id(pool, enterprise_id).await {
            SearchService::index_enterprise(pool, index, &enterprise).await;
        }
    }

    /// POST /reviews
    pub async fn create(
        pool: &PgPool,
        index: &SearchIndex,
        limiter: &RateLimiter,
        author: Option<&User>,
        client: &ClientInfo,
        req: &CreateReviewRequest,
    ) -> Result<Review, DirectoryError> {
        let enterprise = EnterpriseRepository::get_active(pool, req.enterprise_id).await?;

        let ip_hash = client.ip.as_deref().map(sha256_hex);
        let user_agent_hash = client.user_agent.as_deref().map(sha256_hex);
        let subject = match (author, ip_hash.as_deref()) {
            (Some(user), _) => user.id.to_string(),
            (None, Some(hash)) => hash.to_string(),
            (None, None) => "anonymous".to_string(),
        };
        limiter
            .check_user_action(&subject, UserAction::ReviewCreate)
            .await?;

        let name = author_name(author, req.author_name.as_deref())?;
        let comment = req
            .comment
            .as_deref()
            .map(sanitize_name)
            .filter(|c| !c.is_empty());
        let status = initial_status(author.is_some());

        let new = NewReview {
            enterprise_id: enterprise.id,
            author_user_id: author.map(|u| u.id),
            author_name: name.as_deref(),
            rating: req.rating,
            comment: comment.as_deref(),
            status,
            ip_hash,
            user_agent_hash,
        };

        if status != ReviewStatus::Published {
            return ReviewRepository::create(pool, new).await;
        }

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;
        let review = ReviewRepository::create(&mut *tx, new).await?;
        Self::recompute_rating(&mut tx, enterprise.id).await?;
        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit review", e))?;

        Self::reindex(pool, index, enterprise.id).await;
        Ok(review)
    }

    /// Public listing: only published reviews are visible
    pub async fn list_public(
        pool: &PgPool,
        query: &ListReviewsQuery,
    ) -> Result<Paginated<Review>, DirectoryError> {
        let query = ListReviewsQuery {
            status: Some(ReviewStatus::Published),
            ..query.clone()
        };
        Self::list(pool, &query).await
    }

    pub async fn list_for_enterprise(
        pool: &PgPool,
        enterprise_id: Uuid,
        query: &ListReviewsQuery,
    ) -> Result<Paginated<Review>, DirectoryError> {
        let query = ListReviewsQuery {
            enterprise_id: Some(enterprise_id),
            ..query.clone()
        };
        Self::list_public(pool, &query).await
    }

    /// Any status; used by the admin surface
    pub async fn list(
        pool: &PgPool,
        query: &ListReviewsQuery,
    ) -> Result<Paginated<Review>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (reviews, total) = ReviewRepository::list(pool, query, pagination).await?;
        Ok(Paginated::new(reviews, total, pagination))
    }

    /// PATCH /admin/reviews/{id}/moderate
    pub async fn moderate(
        pool: &PgPool,
        index: &SearchIndex,
        moderator: &User,
        id: Uuid,
        req: &ModerateReviewRequest,
    ) -> Result<Review, DirectoryError> {
        RbacService::require_permission(pool, moderator, REVIEW_MODERATE).await?;

        let notes = req.moderation_notes.as_deref();

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;

        // The status read here is the one the transition is decided on; a
        // concurrent moderation of the same review waits for this commit.
        let current = ReviewRepository::find_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Review {} not found", id)))?;
        let rating_changes = ReviewStatus::affects_rating(current.status, req.status);

        let review =
            ReviewRepository::set_status(&mut *tx, id, req.status, notes, moderator.id).await?;
        if rating_changes {
            Self::recompute_rating(&mut tx, review.enterprise_id).await?;
        }
        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit moderation", e))?;

        if rating_changes {
            Self::reindex(pool, index, review.enterprise_id).await;
        }

        log::info!(
            "Review {} moderated {:?} -> {:?} by {}",
            id,
            current.status,
            review.status,
            moderator.id
        );
        AuditService::log(
            pool,
            Some(moderator.id),
            REVIEW_MODERATED,
            ENTITY_REVIEW,
            Some(id),
            json!({
                "enterpriseId": review.enterprise_id,
                "from": current.status,
                "to": review.status,
                "notes": notes,
            }),
        )
        .await;
        Ok(review)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::test_support;

    #[test]
    fn test_rating_summary() {
        assert_eq!(rating_summary(Some(11.0 / 3.0), 3), (3.7, 3));
        assert_eq!(rating_summary(Some(4.25), 4), (4.3, 4));
        assert_eq!(rating_summary(None, 0), (0.0, 0));
    }

    #[test]
    fn test_initial_status() {
        assert_eq!(initial_status(true), ReviewStatus::Published);
        assert_eq!(initial_status(false), ReviewStatus::Pending);
    }

    #[test]
    fn test_author_name_resolution() {
        let user = test_support::user(UserRole::User);
        assert_eq!(
            author_name(Some(&user), None).unwrap().as_deref(),
            Some("Test User")
        );
        assert_eq!(
            author_name(Some(&user), Some("<b>Jiho</b>")).unwrap().as_deref(),
            Some("Jiho")
        );
        assert_eq!(
            author_name(None, Some("Guest")).unwrap().as_deref(),
            Some("Guest")
        );
        assert!(author_name(None, None).is_err());
        assert!(author_name(None, Some("<i></i>")).is_err());
    }

    /// Publish and reject racing on one pending review must leave the
    /// enterprise rating matching whichever status committed last
    #[tokio::test]
    async fn test_concurrent_moderation_keeps_rating_in_step() {
        let Some(pool) = test_support::database_pool().await else {
            return;
        };
        let index = SearchIndex::disabled();
        let admin: User = sqlx::query_as(
            "INSERT INTO users (email, password_hash, role) VALUES ($1, 'x', 'ADMIN') RETURNING *",
        )
        .bind(format!("moderator-{}@koreabiz.test", Uuid::new_v4()))
        .fetch_one(&pool)
        .await
        .unwrap();

        let publish = ModerateReviewRequest {
            status: ReviewStatus::Published,
            moderation_notes: None,
        };
        let reject = ModerateReviewRequest {
            status: ReviewStatus::Rejected,
            moderation_notes: Some("spam".to_string()),
        };

        for _ in 0..20 {
            let enterprise_id: Uuid = sqlx::query_scalar(
                "INSERT INTO enterprises (slug, name) VALUES ($1, 'Moderation Race') RETURNING id",
            )
            .bind(format!("moderation-race-{}", Uuid::new_v4()))
            .fetch_one(&pool)
            .await
            .unwrap();
            let review_id: Uuid = sqlx::query_scalar(
                "INSERT INTO reviews (enterprise_id, author_name, rating, status) \
                 VALUES ($1, 'Guest', 5, 'PENDING') RETURNING id",
            )
            .bind(enterprise_id)
            .fetch_one(&pool)
            .await
            .unwrap();

            let (a, b) = tokio::join!(
                ReviewService::moderate(&pool, &index, &admin, review_id, &publish),
                ReviewService::moderate(&pool, &index, &admin, review_id, &reject),
            );
            a.unwrap();
            b.unwrap();

            let (rating_count, published): (i32, i64) = sqlx::query_as(
                r#"
                SELECT e.rating_count,
                       (SELECT COUNT(*) FROM reviews r
                        WHERE r.enterprise_id = e.id AND r.status = 'PUBLISHED')
                FROM enterprises e WHERE e.id = $1
                "#,
            )
            .bind(enterprise_id)
            .fetch_one(&pool)
            .await
            .unwrap();
            assert_eq!(i64::from(rating_count), published);
        }
    }
}
