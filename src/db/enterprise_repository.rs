// src/db/enterprise_repository.rs
// DOCUMENTATION: Database access layer for enterprises and their child tables
// PURPOSE: Abstract enterprise SQL (listing, detail joins, staff, hours) from business logic

use crate::db::like_pattern;
use crate::errors::DirectoryError;
use crate::models::*;
use crate::services::geo::BoundingBox;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Validated values for an enterprise insert
/// DOCUMENTATION: The service computes slug and sanitized name before calling create
pub struct NewEnterprise<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub owner_user_id: Option<Uuid>,
    pub req: &'a CreateEnterpriseRequest,
}

/// A weekly hours row ready for insert
pub struct HoursRow {
    pub day_of_week: i16,
    pub is_closed: bool,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
}

/// EnterpriseRepository: All database operations for enterprises
pub struct EnterpriseRepository;

fn push_list_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    query: &ListEnterprisesQuery,
    active_only: bool,
) {
    qb.push(" WHERE e.deleted_at IS NULL");

    if active_only {
        qb.push(" AND e.status = 'ACTIVE'");
    } else if let Some(status) = query.status {
        qb.push(" AND e.status = ").push_bind(status);
    }

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (e.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.short_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = query.category_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM enterprise_categories ec WHERE ec.enterprise_id = e.id AND ec.category_id = ",
        )
        .push_bind(category_id)
        .push(")");
    }
    if let Some(city_id) = query.city_id {
        qb.push(" AND e.city_id = ").push_bind(city_id);
    }
    if let Some(verified) = query.verified {
        qb.push(" AND e.verified = ").push_bind(verified);
    }
}

fn push_search_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &SearchEnterprisesQuery) {
    qb.push(
        " FROM enterprises e LEFT JOIN cities c ON c.id = e.city_id \
         WHERE e.deleted_at IS NULL AND e.status = 'ACTIVE'",
    );

    if let Some(text) = query.text() {
        let pattern = like_pattern(text);
        qb.push(" AND (e.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR e.short_description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    // Category and city names match whole names, case-insensitively, as the index does
    if let Some(category) = query.category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM enterprise_categories ec JOIN categories cat ON cat.id = ec.category_id \
             WHERE ec.enterprise_id = e.id AND lower(cat.name) = lower(",
        )
        .push_bind(category.to_string())
        .push("))");
    }
    if let Some(category_id) = query.category_id {
        qb.push(
            " AND EXISTS (SELECT 1 FROM enterprise_categories ec WHERE ec.enterprise_id = e.id AND ec.category_id = ",
        )
        .push_bind(category_id)
        .push(")");
    }
    if let Some(city) = query.city.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        qb.push(" AND lower(c.name) = lower(")
            .push_bind(city.to_string())
            .push(")");
    }
    if let Some(city_id) = query.city_id {
        qb.push(" AND e.city_id = ").push_bind(city_id);
    }
    if let Some(price_range) = query.price_range {
        qb.push(" AND e.price_range = ").push_bind(price_range);
    }
    if let Some(min_price) = query.min_price {
        qb.push(" AND e.price_range >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        qb.push(" AND e.price_range <= ").push_bind(max_price);
    }
    if let Some(verified) = query.verified {
        qb.push(" AND e.verified = ").push_bind(verified);
    }
    if let (Some((lat, lng)), Some(radius)) = (query.origin(), query.radius) {
        let bbox = BoundingBox::around(crate::services::geo::point(lat, lng), radius);
        qb.push(" AND e.latitude BETWEEN ")
            .push_bind(bbox.min_lat)
            .push(" AND ")
            .push_bind(bbox.max_lat)
            .push(" AND e.longitude BETWEEN ")
            .push_bind(bbox.min_lng)
            .push(" AND ")
            .push_bind(bbox.max_lng);
    }
}

impl EnterpriseRepository {
    /// Create new enterprise
    /// DOCUMENTATION: Inserts the row; categories are linked separately in the same transaction
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        new: NewEnterprise<'_>,
    ) -> Result<Enterprise, DirectoryError> {
        let req = new.req;
        let enterprise = sqlx::query_as::<_, Enterprise>(
            r#"
            INSERT INTO enterprises (
                slug, name, legal_name, short_description, description,
                owner_user_id, city_id, latitude, longitude,
                price_range, founded_year, employee_range
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(new.slug) // $1
        .bind(new.name) // $2
        .bind(&req.legal_name) // $3
        .bind(&req.short_description) // $4
        .bind(&req.description) // $5
        .bind(new.owner_user_id) // $6
        .bind(req.city_id) // $7
        .bind(req.latitude) // $8
        .bind(req.longitude) // $9
        .bind(req.price_range) // $10
        .bind(req.founded_year) // $11
        .bind(&req.employee_range) // $12
        .fetch_one(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to create enterprise", e))?;

        log::info!("Created enterprise {} ({})", enterprise.id, enterprise.slug);
        Ok(enterprise)
    }

    /// Replace the category links of an enterprise
    pub async fn set_categories(
        tx: &mut sqlx::PgConnection,
        enterprise_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<(), DirectoryError> {
        sqlx::query("DELETE FROM enterprise_categories WHERE enterprise_id = $1")
            .bind(enterprise_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DirectoryError::database("Failed to clear enterprise categories", e))?;

        if category_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO enterprise_categories (enterprise_id, category_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(enterprise_id)
        .bind(category_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| DirectoryError::database("Failed to link enterprise categories", e))?;

        Ok(())
    }

    /// Retrieve enterprise by ID regardless of status (soft-deleted rows excluded)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            "SELECT * FROM enterprises WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch enterprise", e))
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Enterprise, DirectoryError> {
        Self::find_by_id(pool, id).await?.ok_or_else(|| {
            log::warn!("Enterprise not found: {}", id);
            DirectoryError::NotFound(format!("Enterprise {} not found", id))
        })
    }

    /// Retrieve a publicly visible (ACTIVE) enterprise
    pub async fn get_active(pool: &PgPool, id: Uuid) -> Result<Enterprise, DirectoryError> {
        Self::find_by_id(pool, id)
            .await?
            .filter(|e| e.status == EnterpriseStatus::Active)
            .ok_or_else(|| DirectoryError::NotFound(format!("Enterprise {} not found", id)))
    }

    /// List enterprises with filters
    /// DOCUMENTATION: Returns tuple (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        query: &ListEnterprisesQuery,
        pagination: Pagination,
        active_only: bool,
    ) -> Result<(Vec<Enterprise>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM enterprises e");
        push_list_filters(&mut count_qb, query, active_only);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count enterprises", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT e.* FROM enterprises e");
        push_list_filters(&mut qb, query, active_only);
        qb.push(" ORDER BY e.verified DESC, e.rating_avg DESC, e.created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let enterprises = qb
            .build_query_as::<Enterprise>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to list enterprises", e))?;

        Ok((enterprises, total))
    }

    /// SQL search used when the search index is unavailable
    /// DOCUMENTATION: ILIKE text matching, taxonomy filters and a bounding-box radius filter
    pub async fn search(
        pool: &PgPool,
        query: &SearchEnterprisesQuery,
        pagination: Pagination,
    ) -> Result<(Vec<Enterprise>, i64), DirectoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_search_filters(&mut count_qb, query);
        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to count search results", e))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT e.*");
        push_search_filters(&mut qb, query);

        match query.sort_by {
            Some(sort_by) => {
                let order = query.sort_order.unwrap_or_default();
                qb.push(format!(" ORDER BY {} {}", sort_by.column(), order.sql()));
            }
            None => {
                qb.push(" ORDER BY e.verified DESC, e.rating_avg DESC");
            }
        }
        qb.push(", e.id LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let enterprises = qb
            .build_query_as::<Enterprise>()
            .fetch_all(pool)
            .await
            .map_err(|e| DirectoryError::database("Failed to search enterprises", e))?;

        Ok((enterprises, total))
    }

    /// Active enterprises for the given IDs (order not guaranteed)
    pub async fn list_active_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            SELECT * FROM enterprises
            WHERE id = ANY($1) AND deleted_at IS NULL AND status = 'ACTIVE'
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch enterprises by id", e))
    }

    pub async fn list_all_active(pool: &PgPool) -> Result<Vec<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            "SELECT * FROM enterprises WHERE deleted_at IS NULL AND status = 'ACTIVE' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list active enterprises", e))
    }

    pub async fn list_owned_by(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            SELECT * FROM enterprises
            WHERE owner_user_id = $1 AND deleted_at IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list owned enterprises", e))
    }

    /// Highest-rated active enterprises
    pub async fn popular(pool: &PgPool, limit: i64) -> Result<Vec<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            SELECT * FROM enterprises
            WHERE deleted_at IS NULL AND status = 'ACTIVE'
            ORDER BY rating_avg DESC, rating_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch popular enterprises", e))
    }

    /// Recently updated verified enterprises
    pub async fn featured(pool: &PgPool, limit: i64) -> Result<Vec<Enterprise>, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            SELECT * FROM enterprises
            WHERE deleted_at IS NULL AND status = 'ACTIVE' AND verified = true
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch featured enterprises", e))
    }

    /// Partial update
    /// DOCUMENTATION: NULL parameters keep the current column value
    pub async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        name: Option<&str>,
        req: &UpdateEnterpriseRequest,
    ) -> Result<Enterprise, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            UPDATE enterprises SET
                name = COALESCE($2, name),
                legal_name = COALESCE($3, legal_name),
                short_description = COALESCE($4, short_description),
                description = COALESCE($5, description),
                city_id = COALESCE($6, city_id),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                price_range = COALESCE($9, price_range),
                founded_year = COALESCE($10, founded_year),
                employee_range = COALESCE($11, employee_range),
                status = COALESCE($12, status)
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&req.legal_name)
        .bind(&req.short_description)
        .bind(&req.description)
        .bind(req.city_id)
        .bind(req.latitude)
        .bind(req.longitude)
        .bind(req.price_range)
        .bind(req.founded_year)
        .bind(&req.employee_range)
        .bind(req.status)
        .fetch_optional(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to update enterprise", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("Enterprise {} not found", id)))
    }

    pub async fn set_verified(
        pool: &PgPool,
        id: Uuid,
        verified: bool,
    ) -> Result<Enterprise, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            "UPDATE enterprises SET verified = $2 WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(verified)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to verify enterprise", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("Enterprise {} not found", id)))
    }

    /// Transfer ownership and mark the listing verified
    pub async fn assign_owner<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        owner_user_id: Uuid,
    ) -> Result<Enterprise, DirectoryError> {
        sqlx::query_as::<_, Enterprise>(
            r#"
            UPDATE enterprises SET owner_user_id = $2, verified = true
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_user_id)
        .fetch_optional(executor)
        .await
        .map_err(|e| DirectoryError::database("Failed to assign enterprise owner", e))?
        .ok_or_else(|| DirectoryError::NotFound(format!("Enterprise {} not found", id)))
    }

    /// Row lock held until the surrounding transaction ends
    pub async fn lock_for_update<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
    ) -> Result<(), DirectoryError> {
        sqlx::query("SELECT id FROM enterprises WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| DirectoryError::database("Failed to lock enterprise", e))?
            .ok_or_else(|| DirectoryError::NotFound(format!("Enterprise {} not found", id)))?;
        Ok(())
    }

    pub async fn set_rating<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Uuid,
        rating_avg: f64,
        rating_count: i32,
    ) -> Result<(), DirectoryError> {
        sqlx::query("UPDATE enterprises SET rating_avg = $2, rating_count = $3 WHERE id = $1")
            .bind(id)
            .bind(rating_avg)
            .bind(rating_count)
            .execute(executor)
            .await
            .map_err(|e| DirectoryError::database("Failed to update enterprise rating", e))?;
        Ok(())
    }

    /// Soft delete: hidden from every listing and flagged deleted
    pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), DirectoryError> {
        let result = sqlx::query(
            r#"
            UPDATE enterprises SET status = 'HIDDEN', deleted_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to delete enterprise", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(format!("Enterprise {} not found", id)));
        }
        log::info!("Soft deleted enterprise {}", id);
        Ok(())
    }

    pub async fn categories_for(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Vec<Category>, DirectoryError> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT c.* FROM categories c
            JOIN enterprise_categories ec ON ec.category_id = c.id
            WHERE ec.enterprise_id = $1
            ORDER BY c.name
            "#,
        )
        .bind(enterprise_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch enterprise categories", e))
    }

    pub async fn hours_for(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Vec<EnterpriseHours>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseHours>(
            r#"
            SELECT day_of_week, is_closed, open_time, close_time
            FROM enterprise_hours
            WHERE enterprise_id = $1
            ORDER BY day_of_week
            "#,
        )
        .bind(enterprise_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch enterprise hours", e))
    }

    /// Replace the weekly schedule
    pub async fn replace_hours(
        pool: &PgPool,
        enterprise_id: Uuid,
        rows: &[HoursRow],
    ) -> Result<(), DirectoryError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| DirectoryError::database("Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM enterprise_hours WHERE enterprise_id = $1")
            .bind(enterprise_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DirectoryError::database("Failed to clear enterprise hours", e))?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO enterprise_hours (enterprise_id, day_of_week, is_closed, open_time, close_time)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(enterprise_id)
            .bind(row.day_of_week)
            .bind(row.is_closed)
            .bind(row.open_time)
            .bind(row.close_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| DirectoryError::database("Failed to insert enterprise hours", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| DirectoryError::database("Failed to commit enterprise hours", e))?;
        Ok(())
    }

    pub async fn closed_days_for(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Vec<ClosedDay>, DirectoryError> {
        sqlx::query_as::<_, ClosedDay>(
            r#"
            SELECT id, closed_date, note FROM enterprise_closed_days
            WHERE enterprise_id = $1
            ORDER BY closed_date
            "#,
        )
        .bind(enterprise_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch closed days", e))
    }

    pub async fn add_closed_day(
        pool: &PgPool,
        enterprise_id: Uuid,
        closed_date: NaiveDate,
        note: Option<&str>,
    ) -> Result<ClosedDay, DirectoryError> {
        sqlx::query_as::<_, ClosedDay>(
            r#"
            INSERT INTO enterprise_closed_days (enterprise_id, closed_date, note)
            VALUES ($1, $2, $3)
            ON CONFLICT (enterprise_id, closed_date) DO UPDATE SET note = EXCLUDED.note
            RETURNING id, closed_date, note
            "#,
        )
        .bind(enterprise_id)
        .bind(closed_date)
        .bind(note)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to add closed day", e))
    }

    pub async fn remove_closed_day(
        pool: &PgPool,
        enterprise_id: Uuid,
        closed_date: NaiveDate,
    ) -> Result<bool, DirectoryError> {
        let result = sqlx::query(
            "DELETE FROM enterprise_closed_days WHERE enterprise_id = $1 AND closed_date = $2",
        )
        .bind(enterprise_id)
        .bind(closed_date)
        .execute(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to remove closed day", e))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_staff(
        pool: &PgPool,
        enterprise_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EnterpriseStaff>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseStaff>(
            "SELECT * FROM enterprise_staff WHERE enterprise_id = $1 AND user_id = $2",
        )
        .bind(enterprise_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to fetch staff assignment", e))
    }

    pub async fn list_staff(
        pool: &PgPool,
        enterprise_id: Uuid,
    ) -> Result<Vec<EnterpriseStaff>, DirectoryError> {
        sqlx::query_as::<_, EnterpriseStaff>(
            "SELECT * FROM enterprise_staff WHERE enterprise_id = $1 ORDER BY created_at",
        )
        .bind(enterprise_id)
        .fetch_all(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to list staff", e))
    }

    /// Assign or re-role a staff member
    pub async fn upsert_staff(
        pool: &PgPool,
        enterprise_id: Uuid,
        user_id: Uuid,
        role: StaffRole,
    ) -> Result<EnterpriseStaff, DirectoryError> {
        sqlx::query_as::<_, EnterpriseStaff>(
            r#"
            INSERT INTO enterprise_staff (enterprise_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (enterprise_id, user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(enterprise_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(|e| DirectoryError::database("Failed to assign staff", e))
    }

    pub async fn remove_staff(
        pool: &PgPool,
        enterprise_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, DirectoryError> {
        let result =
            sqlx::query("DELETE FROM enterprise_staff WHERE enterprise_id = $1 AND user_id = $2")
                .bind(enterprise_id)
                .bind(user_id)
                .execute(pool)
                .await
                .map_err(|e| DirectoryError::database("Failed to remove staff", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_sql(query: &SearchEnterprisesQuery) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT e.id");
        push_search_filters(&mut qb, query);
        qb.sql().to_string()
    }

    #[test]
    fn test_search_names_match_whole_names() {
        let query = SearchEnterprisesQuery {
            category: Some(" Cafe ".to_string()),
            city: Some("Seoul".to_string()),
            ..Default::default()
        };
        let sql = search_sql(&query);

        assert!(sql.contains("lower(cat.name) = lower($"));
        assert!(sql.contains("lower(c.name) = lower($"));
        assert!(!sql.contains("cat.name ILIKE"));
        assert!(!sql.contains("c.name ILIKE"));
    }

    #[test]
    fn test_blank_names_add_no_filter() {
        let query = SearchEnterprisesQuery {
            category: Some("   ".to_string()),
            city: Some(String::new()),
            ..Default::default()
        };
        let sql = search_sql(&query);

        assert!(!sql.contains("categories cat"));
        assert!(!sql.contains("lower(c.name)"));
    }
}
