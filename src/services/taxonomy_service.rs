// src/services/taxonomy_service.rs
// DOCUMENTATION: Categories and cities
// PURPOSE: Shared lookup-table logic; handlers pick the TaxonomyKind

use crate::db::TaxonomyRepository;
use crate::errors::DirectoryError;
use crate::models::{
    CreateTaxonRequest, ListTaxaQuery, Paginated, Pagination, Taxon, TaxonomyKind,
    UpdateTaxonRequest,
};
use crate::services::enterprise_service::{random_suffix, sanitize_name, slugify};
use sqlx::PgPool;
use uuid::Uuid;

/// Explicit slug normalised, or derived from the name
/// DOCUMENTATION: Names with no letters or digits get "<kind>-<suffix>"
pub fn taxon_slug(kind: TaxonomyKind, name: &str, slug: Option<&str>) -> String {
    let source = slug.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(name);
    let slug = slugify(source, "");
    if slug.is_empty() {
        format!("{}-{}", kind.label().to_lowercase(), random_suffix())
    } else {
        slug
    }
}

pub struct TaxonomyService;

impl TaxonomyService {
    pub async fn list(
        pool: &PgPool,
        kind: TaxonomyKind,
        query: &ListTaxaQuery,
    ) -> Result<Paginated<Taxon>, DirectoryError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) =
            TaxonomyRepository::list(pool, kind, query.search.as_deref(), pagination).await?;
        Ok(Paginated::new(rows, total, pagination))
    }

    pub async fn all(pool: &PgPool, kind: TaxonomyKind) -> Result<Vec<Taxon>, DirectoryError> {
        TaxonomyRepository::all(pool, kind).await
    }

    /// UUID-shaped identifiers are looked up by id, anything else by slug
    pub async fn get(pool: &PgPool, kind: TaxonomyKind, id_or_slug: &str) -> Result<Taxon, DirectoryError> {
        let found = match Uuid::parse_str(id_or_slug) {
            Ok(id) => TaxonomyRepository::find_by_id(pool, kind, id).await?,
            Err(_) => TaxonomyRepository::find_by_slug(pool, kind, id_or_slug).await?,
        };
        found.ok_or_else(|| DirectoryError::NotFound(format!("{} {} not found", kind.label(), id_or_slug)))
    }

    pub async fn get_by_slug(pool: &PgPool, kind: TaxonomyKind, slug: &str) -> Result<Taxon, DirectoryError> {
        TaxonomyRepository::find_by_slug(pool, kind, slug)
            .await?
            .ok_or_else(|| DirectoryError::NotFound(format!("{} {} not found", kind.label(), slug)))
    }

    pub async fn create(
        pool: &PgPool,
        kind: TaxonomyKind,
        req: &CreateTaxonRequest,
    ) -> Result<Taxon, DirectoryError> {
        let name = sanitize_name(&req.name);
        if name.is_empty() {
            return Err(DirectoryError::InvalidInput("name must not be empty".to_string()));
        }
        let slug = taxon_slug(kind, &name, req.slug.as_deref());
        TaxonomyRepository::create(pool, kind, &slug, &name).await
    }

    pub async fn update(
        pool: &PgPool,
        kind: TaxonomyKind,
        id: Uuid,
        req: &UpdateTaxonRequest,
    ) -> Result<Taxon, DirectoryError> {
        let name = req.name.as_deref().map(sanitize_name).filter(|n| !n.is_empty());
        let slug = req
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| slugify(s, ""));
        if slug.as_deref() == Some("") {
            return Err(DirectoryError::InvalidInput(
                "slug must contain letters or digits".to_string(),
            ));
        }
        TaxonomyRepository::update(pool, kind, id, slug.as_deref(), name.as_deref()).await
    }

    pub async fn delete(pool: &PgPool, kind: TaxonomyKind, id: Uuid) -> Result<(), DirectoryError> {
        TaxonomyRepository::delete(pool, kind, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_slug() {
        let category = TaxonomyKind::Category;
        assert_eq!(taxon_slug(category, "Korean BBQ", None), "korean-bbq");
        assert_eq!(taxon_slug(category, "Korean BBQ", Some("  ")), "korean-bbq");
        assert_eq!(
            taxon_slug(TaxonomyKind::City, "Seoul", Some("Seoul Special City")),
            "seoul-special-city"
        );
    }

    #[test]
    fn test_taxon_slug_fallback_names_the_kind() {
        let city = taxon_slug(TaxonomyKind::City, "!!!", None);
        let (base, suffix) = city.rsplit_once('-').unwrap();
        assert_eq!(base, "city");
        assert_eq!(suffix.len(), 5);

        let category = taxon_slug(TaxonomyKind::Category, "★", Some("?"));
        assert!(category.starts_with("category-"));
        assert!(!category.contains("enterprise"));

        // Two symbol-only cities do not share a slug
        assert_ne!(city, taxon_slug(TaxonomyKind::City, "???", None));
    }
}
