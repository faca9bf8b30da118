// src/services/claim_service.rs
// DOCUMENTATION: Ownership claim workflow
// PURPOSE: Submission, review transitions and ownership transfer on approval

use crate::db::{AuditRepository, ClaimRepository, EnterpriseRepository, UserRepository};
use crate::errors::DirectoryError;
use crate::models::audit::{CLAIM_REVIEWED, ENTITY_CLAIM, ENTITY_ENTERPRISE, OWNERSHIP_ASSIGNED};
use crate::models::{
    Claim, ClaimStatus, ListClaimsQuery, Paginated, Pagination, ReviewClaimRequest,
    SubmitClaimRequest, User,
};
use crate::services::search_index::SearchIndex;
use crate::services::{AuditService, Mailer, RateLimiter, SearchService, UserAction};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// Terminal claims cannot move (409); other illegal moves are bad requests
pub fn check_transition(from: ClaimStatus, to: ClaimStatus) -> Result<(), DirectoryError> {
    if from.is_terminal() {
        return Err(DirectoryError::Conflict(format!(
            "Claim is already {:?} and cannot be changed",
            from
        )));
    }
    if !from.can_transition_to(to) {
        return Err(DirectoryError::InvalidInput(format!(
            "Cannot move claim from {:?} to {:?}",
            from, to
        )));
    }
    Ok(())
}

pub struct ClaimService;

impl ClaimService {
    /// POST /claims
    pub async fn submit(
        pool: &PgPool,
        limiter: &RateLimiter,
        mailer: &Mailer,
        user: &User,
        req: &SubmitClaimRequest,
    ) -> Result<Claim, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, req.enterprise_id).await?;

        if ClaimRepository::has_open_claim(pool, enterprise.id, user.id).await? {
            return Err(DirectoryError::Conflict(
                "You already have an open claim for this enterprise".to_string(),
            ));
        }
        limiter
            .check_user_action(&user.id.to_string(), UserAction::ClaimSubmit)
            .await?;

        let claim = ClaimRepository::create(pool, user.id, req).await?;
        mailer
            .notify_claim_submitted(&enterprise.name, &req.requester_name, &req.requester_email)
            .await;
        Ok(claim)
    }

    /// GET /claims: the caller's own claims
    pub async fn list_mine(
        pool: &PgPool,
        user: &User,
        query: &ListClaimsQuery,
    ) -> Result<Paginated<Claim>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (claims, total) = ClaimRepository::list(pool, query, Some(user.id), pagination).await?;
        Ok(Paginated::new(claims, total, pagination))
    }

    pub async fn admin_list(
        pool: &PgPool,
        query: &ListClaimsQuery,
    ) -> Result<Paginated<Claim>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (claims, total) = ClaimRepository::list(pool, query, None, pagination).await?;
        Ok(Paginated::new(claims, total, pagination))
    }

    /// PATCH /admin/claims/{id}/review
    /// DOCUMENTATION: Approval with a known requester transfers ownership,
    /// verifies the listing and promotes the requester in one transaction
    pub async fn review(
        pool: &PgPool,
        index: &SearchIndex,
        mailer: &Mailer,
        admin: &User,
        id: Uuid,
        req: &ReviewClaimRequest,
    ) -> Result<Claim, DirectoryError> {
        let claim = ClaimRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("Claim {} not found", id)))?;
        check_transition(claim.status, req.status)?;

        let notes = req.review_notes.as_deref();
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;

        let updated =
            ClaimRepository::set_status(&mut *tx, id, claim.status, req.status, admin.id, notes)
                .await?
                .ok_or_else(|| {
                    DirectoryError::Conflict("Claim was reviewed concurrently".to_string())
                })?;

        let mut new_owner = None;
        if updated.status == ClaimStatus::Approved {
            if let Some(requester_id) = updated.requester_user_id {
                let enterprise =
                    EnterpriseRepository::assign_owner(&mut *tx, updated.enterprise_id, requester_id)
                        .await?;
                let promoted = UserRepository::promote_to_owner(&mut *tx, requester_id).await?;
                AuditRepository::insert(
                    &mut *tx,
                    Some(admin.id),
                    OWNERSHIP_ASSIGNED,
                    ENTITY_ENTERPRISE,
                    Some(enterprise.id),
                    &json!({
                        "claimId": id,
                        "ownerUserId": requester_id,
                        "promotedToOwner": promoted,
                    }),
                )
                .await?;
                new_owner = Some(enterprise);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit claim review", e))?;

        log::info!(
            "Claim {} moved {:?} -> {:?} by {}",
            id,
            claim.status,
            updated.status,
            admin.id
        );
        AuditService::log(
            pool,
            Some(admin.id),
            CLAIM_REVIEWED,
            ENTITY_CLAIM,
            Some(id),
            json!({
                "enterpriseId": updated.enterprise_id,
                "from": claim.status,
                "to": updated.status,
                "notes": notes,
            }),
        )
        .await;

        let enterprise = match new_owner {
            Some(enterprise) => {
                SearchService::index_enterprise(pool, index, &enterprise).await;
                Some(enterprise)
            }
            None => EnterpriseRepository::find_by_id(pool, updated.enterprise_id).await?,
        };

        if updated.status.is_terminal() {
            if let (Some(to), Some(enterprise)) = (updated.requester_email.as_deref(), enterprise) {
                mailer
                    .send_claim_decision(to, &enterprise.name, updated.status, notes)
                    .await;
            }
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClaimStatus::*;

    #[test]
    fn test_terminal_claims_conflict() {
        assert!(matches!(
            check_transition(Approved, Rejected),
            Err(DirectoryError::Conflict(_))
        ));
        assert!(matches!(
            check_transition(Rejected, InReview),
            Err(DirectoryError::Conflict(_))
        ));
    }

    #[test]
    fn test_open_claim_transitions() {
        assert!(check_transition(Submitted, InReview).is_ok());
        assert!(check_transition(Submitted, Approved).is_ok());
        assert!(check_transition(InReview, Rejected).is_ok());
        assert!(matches!(
            check_transition(InReview, Submitted),
            Err(DirectoryError::InvalidInput(_))
        ));
        assert!(matches!(
            check_transition(InReview, InReview),
            Err(DirectoryError::InvalidInput(_))
        ));
    }
}
