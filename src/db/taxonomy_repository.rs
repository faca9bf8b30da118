// src/db/taxonomy_repository.rs
// DOCUMENTATION: Database access for categories and cities
// PURPOSE: One implementation serves both lookup tables, selected by TaxonomyKind

use crate::db::like_pattern;
use crate::errors::DirectoryError;
use crate::models::{Pagination, Taxon, TaxonomyKind};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

pub struct TaxonomyRepository;

impl TaxonomyRepository {
    pub async fn list(
        pool: &PgPool,
        kind: TaxonomyKind,
        search: Option<&str>,
        pagination: Pagination,
    ) -> Result<(Vec<Taxon>, i64), DirectoryError> {
        let search = search.filter(|s| !s.trim().is_empty()).map(like_pattern);

        let mut count_qb =
            QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", kind.table()));
        if let Some(pattern) = &search {
            count_qb.push(" WHERE name ILIKE ").push_bind(pattern.clone());
        }
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count taxonomy rows", e))?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", kind.table()));
        if let Some(pattern) = search {
            qb.push(" WHERE name ILIKE ").push_bind(pattern);
        }
        qb.push(" ORDER BY name LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<Taxon>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list taxonomy rows", e))?;

        Ok((rows, total))
    }

    pub async fn all(pool: &PgPool, kind: TaxonomyKind) -> Result<Vec<Taxon>, DirectoryError> {
        sqlx::query_as::<_, Taxon>(&format!("SELECT * FROM {} ORDER BY name", kind.table()))
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list taxonomy rows", e))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> Result<Option<Taxon>, DirectoryError> {
        sqlx::query_as::<_, Taxon>(&format!("SELECT * FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch taxonomy row", e))
    }

    pub async fn find_by_slug(
        pool: &PgPool,
        kind: TaxonomyKind,
        slug: &str,
    ) -> Result<Option<Taxon>, DirectoryError> {
        sqlx::query_as::<_, Taxon>(&format!("SELECT * FROM {} WHERE slug = $1", kind.table()))
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to fetch taxonomy row", e))
    }

    pub async fn create(
        pool: &PgPool,
        kind: TaxonomyKind,
        slug: &str,
        name: &str,
    ) -> Result<Taxon, DirectoryError> {
        let row = sqlx::query_as::<_, Taxon>(&format!(
            "INSERT INTO {} (slug, name) VALUES ($1, $2) RETURNING *",
            kind.table()
        ))
        .bind(slug)
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to create taxonomy row", e))?;

        log::info!("Created {} {} ({})", kind.label(), row.id, row.slug);
        Ok(row)
    }

    pub async fn update(
        pool: &PgPool,
        kind: TaxonomyKind,
        id: Uuid,
        slug: Option<&str>,
        name: Option<&str>,
    ) -> Result<Taxon, DirectoryError> {
        sqlx::query_as::<_, Taxon>(&format!(
            r#"
            UPDATE {} SET slug = COALESCE($2, slug), name = COALESCE($3, name)
            WHERE id = $1
            RETURNING *
            "#,
            kind.table()
        ))
        .bind(id)
        .bind(slug)
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to update taxonomy row", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("{} {} not found", kind.label(), id)))
    }

    /// Hard delete; rows still referenced by enterprises fail with InvalidReference
    pub async fn delete(pool: &PgPool, kind: TaxonomyKind, id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to delete taxonomy row", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(format!(
                "{} {} not found",
                kind.label(),
                id
            )));
        }
        Ok(())
    }
}
