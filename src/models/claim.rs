// src/models/claim.rs
// DOCUMENTATION: Ownership claim workflow
// PURPOSE: Claim records, state transitions and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Claim workflow state
/// DOCUMENTATION: SUBMITTED -> IN_REVIEW -> APPROVED | REJECTED.
/// A submitted claim may also be decided directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "claim_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Submitted,
    InReview,
    Approved,
    Rejected,
}

impl ClaimStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Approved | ClaimStatus::Rejected)
    }

    pub fn is_open(&self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(&self, next: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (Submitted, InReview) | (Submitted, Approved) | (Submitted, Rejected)
                | (InReview, Approved)
                | (InReview, Rejected)
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub requester_user_id: Option<Uuid>,
    pub requester_name: Option<String>,
    pub requester_email: Option<String>,
    pub requester_phone: Option<String>,
    pub position: Option<String>,
    pub proof_of_ownership: Option<String>,
    pub status: ClaimStatus,
    pub reviewed_by_user_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    pub enterprise_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub requester_name: String,

    #[validate(email)]
    pub requester_email: String,

    #[validate(length(min = 5, max = 30))]
    pub requester_phone: String,

    #[validate(length(min = 1, max = 100))]
    pub position: String,

    #[validate(length(max = 2000))]
    pub proof_of_ownership: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClaimsQuery {
    pub status: Option<ClaimStatus>,
    pub enterprise_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewClaimRequest {
    pub status: ClaimStatus,

    #[validate(length(max = 2000))]
    pub review_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ClaimStatus::*;

    #[test]
    fn test_claim_transitions() {
        assert!(Submitted.can_transition_to(InReview));
        assert!(Submitted.can_transition_to(Approved));
        assert!(InReview.can_transition_to(Rejected));
        assert!(!InReview.can_transition_to(Submitted));
        assert!(!Submitted.can_transition_to(Submitted));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
    }

    #[test]
    fn test_open_states() {
        assert!(Submitted.is_open());
        assert!(InReview.is_open());
        assert!(Approved.is_terminal());
    }
}
