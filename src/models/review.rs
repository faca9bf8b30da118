// src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Moderation state of a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "review_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Published,
    Rejected,
}

impl ReviewStatus {
    /// Only transitions into or out of PUBLISHED change the enterprise rating
    pub fn affects_rating(from: ReviewStatus, to: ReviewStatus) -> bool {
        from != to && (from == ReviewStatus::Published || to == ReviewStatus::Published)
    }
}

/// Enterprise review
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub author_user_id: Option<Uuid>,
    pub author_name: Option<String>,
    pub rating: i16,
    pub comment: Option<String>,
    pub status: ReviewStatus,
    pub moderation_notes: Option<String>,
    pub moderated_by_user_id: Option<Uuid>,
    #[serde(skip_serializing)]
    pub ip_hash: Option<String>,
    #[serde(skip_serializing)]
    pub user_agent_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new review
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub enterprise_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub author_name: Option<String>,

    #[validate(range(min = 1, max = 5))]
    pub rating: i16,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReviewsQuery {
    pub enterprise_id: Option<Uuid>,
    pub status: Option<ReviewStatus>,
    pub rating: Option<i16>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ModerateReviewRequest {
    pub status: ReviewStatus,

    #[validate(length(max = 1000))]
    pub moderation_notes: Option<String>,
}

/// Round an average rating to one decimal place
pub fn round_rating(avg: f64) -> f64 {
    (avg * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affects_rating() {
        use ReviewStatus::*;
        assert!(ReviewStatus::affects_rating(Pending, Published));
        assert!(ReviewStatus::affects_rating(Published, Rejected));
        assert!(!ReviewStatus::affects_rating(Pending, Rejected));
        assert!(!ReviewStatus::affects_rating(Published, Published));
    }

    #[test]
    fn test_round_rating() {
        assert_eq!(round_rating(4.0), 4.0);
        assert_eq!(round_rating(11.0 / 3.0), 3.7);
        assert_eq!(round_rating(4.25), 4.3);
        assert_eq!(round_rating(0.0), 0.0);
    }

    #[test]
    fn test_rating_bounds() {
        let req = CreateReviewRequest {
            enterprise_id: Uuid::new_v4(),
            author_name: Some("Minseo".to_string()),
            rating: 6,
            comment: None,
        };
        assert!(req.validate().is_err());
    }
}
