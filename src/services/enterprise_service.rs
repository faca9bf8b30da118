// src/services/enterprise_service.rs
// DOCUMENTATION: Business logic for enterprise listings
// PURPOSE: Intermediary between handlers and repository; slugs, access checks, audit and indexing

use crate::config::Config;
use crate::db::{
    EnterpriseRepository, MediaRepository, NewEnterprise, TaxonomyRepository, UserRepository,
};
use crate::errors::DirectoryError;
use crate::models::audit::{
    ENTERPRISE_CREATED, ENTERPRISE_DELETED, ENTERPRISE_UPDATED, ENTERPRISE_VERIFIED,
    ENTITY_ENTERPRISE, STAFF_ASSIGNED, STAFF_REMOVED,
};
use crate::models::{
    AddClosedDayRequest, AssignStaffRequest, ClosedDay, CreateEnterpriseRequest, Enterprise,
    EnterpriseDetailResponse, EnterpriseHours, EnterpriseStaff, EnterpriseStatus,
    ListEnterprisesQuery, Paginated, Pagination, SetHoursRequest, TaxonomyKind,
    UpdateEnterpriseRequest, User,
};
use crate::services::search_index::SearchIndex;
use crate::services::{geo, opening_hours, AuditService, RbacService, SearchService};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("Invalid tag regex"));

const SLUG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Strip HTML tags from user-supplied text
pub fn sanitize_name(text: &str) -> String {
    HTML_TAG.replace_all(text, "").trim().to_string()
}

/// Lowercase, drop punctuation, join words with single hyphens
/// DOCUMENTATION: Hangul and other letters are kept; `fallback` is returned
/// when nothing alphanumeric survives
pub fn slugify(text: &str, fallback: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Five random base36 characters
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..5)
        .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

pub fn enterprise_slug(name: &str) -> String {
    format!("{}-{}", slugify(name, "enterprise"), random_suffix())
}

/// Latitude and longitude travel together and must be in range
pub fn check_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), DirectoryError> {
    match (lat, lng) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) if geo::valid_coordinates(lat, lng) => Ok(()),
        (Some(_), Some(_)) => Err(DirectoryError::InvalidInput(
            "latitude must be within -90..90 and longitude within -180..180".to_string(),
        )),
        _ => Err(DirectoryError::InvalidInput(
            "latitude and longitude must be provided together".to_string(),
        )),
    }
}

/// Names of the fields present in a partial update, for audit metadata
pub fn changed_fields(req: &UpdateEnterpriseRequest) -> Vec<&'static str> {
    let mut fields = Vec::new();
    let mut mark = |present: bool, name: &'static str| {
        if present {
            fields.push(name);
        }
    };
    mark(req.name.is_some(), "name");
    mark(req.legal_name.is_some(), "legalName");
    mark(req.short_description.is_some(), "shortDescription");
    mark(req.description.is_some(), "description");
    mark(req.city_id.is_some(), "cityId");
    mark(req.latitude.is_some(), "latitude");
    mark(req.longitude.is_some(), "longitude");
    mark(req.price_range.is_some(), "priceRange");
    mark(req.founded_year.is_some(), "foundedYear");
    mark(req.employee_range.is_some(), "employeeRange");
    mark(req.category_ids.is_some(), "categoryIds");
    mark(req.status.is_some(), "status");
    fields
}

fn clean_name(name: &str) -> Result<String, DirectoryError> {
    let name = sanitize_name(name);
    if name.is_empty() {
        return Err(DirectoryError::InvalidInput(
            "name must contain text".to_string(),
        ));
    }
    Ok(name)
}

pub struct EnterpriseService;

impl EnterpriseService {
    /// Insert the row and its category links in one transaction
    async fn insert(
        pool: &PgPool,
        req: &CreateEnterpriseRequest,
        owner_user_id: Option<Uuid>,
    ) -> Result<Enterprise, DirectoryError> {
        check_coordinates(req.latitude, req.longitude)?;
        let name = clean_name(&req.name)?;
        let slug = enterprise_slug(&name);

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;

        let enterprise = EnterpriseRepository::create(
            &mut *tx,
            NewEnterprise {
                slug: &slug,
                name: &name,
                owner_user_id,
                req,
            },
        )
        .await?;

        if let Some(category_ids) = req.category_ids.as_deref() {
            EnterpriseRepository::set_categories(&mut tx, enterprise.id, category_ids).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit enterprise", e))?;
        Ok(enterprise)
    }

    /// POST /enterprises: the caller becomes the owner
    pub async fn create(
        pool: &PgPool,
        index: &SearchIndex,
        owner: &User,
        req: &CreateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        let enterprise = Self::insert(pool, req, Some(owner.id)).await?;
        SearchService::index_enterprise(pool, index, &enterprise).await;
        Ok(enterprise)
    }

    /// POST /admin/enterprises: unowned listing
    pub async fn admin_create(
        pool: &PgPool,
        index: &SearchIndex,
        admin: &User,
        req: &CreateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        let enterprise = Self::insert(pool, req, None).await?;
        SearchService::index_enterprise(pool, index, &enterprise).await;

        AuditService::log(
            pool,
            Some(admin.id),
            ENTERPRISE_CREATED,
            ENTITY_ENTERPRISE,
            Some(enterprise.id),
            json!({ "name": enterprise.name, "slug": enterprise.slug }),
        )
        .await;
        Ok(enterprise)
    }

    pub async fn list(
        pool: &PgPool,
        query: &ListEnterprisesQuery,
    ) -> Result<Paginated<Enterprise>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) = EnterpriseRepository::list(pool, query, pagination, true).await?;
        Ok(Paginated::new(rows, total, pagination))
    }

    /// Any status, optional status filter
    pub async fn admin_list(
        pool: &PgPool,
        query: &ListEnterprisesQuery,
    ) -> Result<Paginated<Enterprise>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) = EnterpriseRepository::list(pool, query, pagination, false).await?;
        Ok(Paginated::new(rows, total, pagination))
    }

    /// Public detail view of an ACTIVE enterprise
    pub async fn get_detail(
        pool: &PgPool,
        config: &Config,
        id: Uuid,
    ) -> Result<EnterpriseDetailResponse, DirectoryError> {
        let enterprise = EnterpriseRepository::get_active(pool, id).await?;

        let city = match enterprise.city_id {
            Some(city_id) => TaxonomyRepository::find_by_id(pool, TaxonomyKind::City, city_id).await?,
            None => None,
        };
        let categories = EnterpriseRepository::categories_for(pool, id).await?;
        let hours = EnterpriseRepository::hours_for(pool, id).await?;
        let closed_days = EnterpriseRepository::closed_days_for(pool, id).await?;
        let media = MediaRepository::list_for_enterprise(pool, id)
            .await?
            .iter()
            .map(|m| m.to_response(config.media_base_url(), &config.s3_bucket_name))
            .collect();
        let is_open_now = opening_hours::is_open_now(&hours, &closed_days);

        Ok(EnterpriseDetailResponse {
            enterprise,
            city,
            categories,
            hours,
            closed_days,
            media,
            is_open_now,
        })
    }

    async fn apply_update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        check_coordinates(req.latitude, req.longitude)?;
        let name = req.name.as_deref().map(clean_name).transpose()?;

        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;

        let enterprise = EnterpriseRepository::update(&mut *tx, id, name.as_deref(), req).await?;
        if let Some(category_ids) = req.category_ids.as_deref() {
            EnterpriseRepository::set_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit enterprise update", e))?;
        Ok(enterprise)
    }

    /// PUT /enterprises/{id}: owner, admin or editing staff; status is admin-only
    pub async fn update(
        pool: &PgPool,
        index: &SearchIndex,
        user: &User,
        id: Uuid,
        mut req: UpdateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        let existing = EnterpriseRepository::get_by_id(pool, id).await?;
        RbacService::require_manage(pool, user, &existing).await?;

        if !RbacService::is_admin(user) {
            req.status = None;
        }

        let enterprise = Self::apply_update(pool, id, &req).await?;
        SearchService::index_enterprise(pool, index, &enterprise).await;
        Ok(enterprise)
    }

    pub async fn admin_update(
        pool: &PgPool,
        index: &SearchIndex,
        admin: &User,
        id: Uuid,
        req: UpdateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        let enterprise = Self::apply_update(pool, id, &req).await?;
        SearchService::index_enterprise(pool, index, &enterprise).await;

        AuditService::log(
            pool,
            Some(admin.id),
            ENTERPRISE_UPDATED,
            ENTITY_ENTERPRISE,
            Some(id),
            json!({ "fields": changed_fields(&req), "status": enterprise.status }),
        )
        .await;
        Ok(enterprise)
    }

    pub async fn verify(
        pool: &PgPool,
        index: &SearchIndex,
        admin: &User,
        id: Uuid,
        verified: bool,
        notes: Option<&str>,
    ) -> Result<Enterprise, DirectoryError> {
        let enterprise = EnterpriseRepository::set_verified(pool, id, verified).await?;
        SearchService::index_enterprise(pool, index, &enterprise).await;

        log::info!("Enterprise {} verified={} by {}", id, verified, admin.id);
        AuditService::log(
            pool,
            Some(admin.id),
            ENTERPRISE_VERIFIED,
            ENTITY_ENTERPRISE,
            Some(id),
            json!({ "verified": verified, "notes": notes }),
        )
        .await;
        Ok(enterprise)
    }

    /// Soft delete: hidden, stamped, and dropped from the index
    pub async fn delete(
        pool: &PgPool,
        index: &SearchIndex,
        admin: &User,
        id: Uuid,
    ) -> Result<(), DirectoryError> {
        EnterpriseRepository::soft_delete(pool, id).await?;
        SearchService::remove_enterprise(index, id).await;

        AuditService::log(
            pool,
            Some(admin.id),
            ENTERPRISE_DELETED,
            ENTITY_ENTERPRISE,
            Some(id),
            json!({ "status": EnterpriseStatus::Hidden }),
        )
        .await;
        Ok(())
    }

    async fn managed(pool: &PgPool, user: &User, id: Uuid) -> Result<Enterprise, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, id).await?;
        RbacService::require_manage(pool, user, &enterprise).await?;
        Ok(enterprise)
    }

    pub async fn list_staff(
        pool: &PgPool,
        user: &User,
        id: Uuid,
    ) -> Result<Vec<EnterpriseStaff>, DirectoryError> {
        let enterprise = EnterpriseRepository::get_by_id(pool, id).await?;
        RbacService::require_access(pool, user, &enterprise).await?;
        EnterpriseRepository::list_staff(pool, id).await
    }

    pub async fn assign_staff(
        pool: &PgPool,
        actor: &User,
        id: Uuid,
        req: &AssignStaffRequest,
    ) -> Result<EnterpriseStaff, DirectoryError> {
        Self::managed(pool, actor, id).await?;
        UserRepository::get_by_id(pool, req.user_id).await?;

        let staff = EnterpriseRepository::upsert_staff(pool, id, req.user_id, req.role).await?;
        AuditService::log(
            pool,
            Some(actor.id),
            STAFF_ASSIGNED,
            ENTITY_ENTERPRISE,
            Some(id),
            json!({ "userId": req.user_id, "role": req.role }),
        )
        .await;
        Ok(staff)
    }

    pub async fn remove_staff(
        pool: &PgPool,
        actor: &User,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DirectoryError> {
        Self::managed(pool, actor, id).await?;

        if !EnterpriseRepository::remove_staff(pool, id, user_id).await? {
            return Err(DirectoryError::NotFound(format!(
                "User {} is not staff of enterprise {}",
                user_id, id
            )));
        }

        AuditService::log(
            pool,
            Some(actor.id),
            STAFF_REMOVED,
            ENTITY_ENTERPRISE,
            Some(id),
            json!({ "userId": user_id }),
        )
        .await;
        Ok(())
    }

    /// Replace the weekly schedule
    pub async fn set_hours(
        pool: &PgPool,
        user: &User,
        id: Uuid,
        req: &SetHoursRequest,
    ) -> Result<Vec<EnterpriseHours>, DirectoryError> {
        Self::managed(pool, user, id).await?;
        let rows = opening_hours::validate_schedule(&req.hours)?;
        EnterpriseRepository::replace_hours(pool, id, &rows).await?;
        EnterpriseRepository::hours_for(pool, id).await
    }

    pub async fn add_closed_day(
        pool: &PgPool,
        user: &User,
        id: Uuid,
        req: &AddClosedDayRequest,
    ) -> Result<ClosedDay, DirectoryError> {
        Self::managed(pool, user, id).await?;
        EnterpriseRepository::add_closed_day(pool, id, req.closed_date, req.note.as_deref()).await
    }

    pub async fn remove_closed_day(
        pool: &PgPool,
        user: &User,
        id: Uuid,
        date: NaiveDate,
    ) -> Result<(), DirectoryError> {
        Self::managed(pool, user, id).await?;
        if !EnterpriseRepository::remove_closed_day(pool, id, date).await? {
            return Err(DirectoryError::NotFound(format!(
                "No closed day on {} for enterprise {}",
                date, id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(sanitize_name("<b>Seoul</b> Coffee"), "Seoul Coffee");
        assert_eq!(sanitize_name("<script>alert(1)</script>Cafe"), "alert(1)Cafe");
        assert_eq!(sanitize_name("Kimbap <img src=x"), "Kimbap");
        assert_eq!(sanitize_name("  Plain  "), "Plain");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Seoul Coffee Lab", "x"), "seoul-coffee-lab");
        assert_eq!(slugify("  Kim's  BBQ & Grill! ", "x"), "kims-bbq-grill");
        assert_eq!(slugify("snake_case--name", "x"), "snake-case-name");
        assert_eq!(slugify("명동 교자", "x"), "명동-교자");
        assert_eq!(slugify("!!!", "enterprise"), "enterprise");
        assert_eq!(slugify("", "city"), "city");
    }

    #[test]
    fn test_enterprise_slug_suffix() {
        let slug = enterprise_slug("Busan Fish Market");
        let (base, suffix) = slug.rsplit_once('-').unwrap();
        assert_eq!(base, "busan-fish-market");
        assert_eq!(suffix.len(), 5);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_check_coordinates() {
        assert!(check_coordinates(None, None).is_ok());
        assert!(check_coordinates(Some(37.56), Some(126.97)).is_ok());
        assert!(check_coordinates(Some(37.56), None).is_err());
        assert!(check_coordinates(Some(-95.0), Some(126.97)).is_err());
        assert!(check_coordinates(Some(37.0), Some(181.0)).is_err());
    }

    #[test]
    fn test_changed_fields() {
        let req = UpdateEnterpriseRequest {
            name: Some("New".to_string()),
            price_range: Some(3),
            status: Some(EnterpriseStatus::Suspended),
            ..Default::default()
        };
        assert_eq!(changed_fields(&req), vec!["name", "priceRange", "status"]);
        assert!(changed_fields(&UpdateEnterpriseRequest::default()).is_empty());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(clean_name("<p></p>").is_err());
        assert_eq!(clean_name("<i>Gimbap</i> Heaven").unwrap(), "Gimbap Heaven");
    }
}
