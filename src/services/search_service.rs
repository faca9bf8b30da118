// src/services/search_service.rs
// DOCUMENTATION: Enterprise search and search-index maintenance
// PURPOSE: Meilisearch when available, Postgres fallback otherwise

use crate::db::{EnterpriseRepository, TaxonomyRepository};
use crate::errors::DirectoryError;
use crate::models::{
    Enterprise, EnterpriseStatus, PageMeta, Pagination, ReindexResponse, SearchEngine,
    SearchEnterprisesQuery, SearchHit, SearchResponse, TaxonomyKind,
};
use crate::services::geo;
use crate::services::search_index::{EnterpriseDocument, SearchIndex};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const POPULAR_LIMIT: i64 = 10;
const FEATURED_LIMIT: i64 = 6;
const REINDEX_BATCH: usize = 500;

/// Reorder rehydrated rows to match the ranking returned by the index
/// DOCUMENTATION: IDs missing from `rows` (deleted or hidden since indexing) are dropped
pub fn order_by_ids(ids: &[Uuid], rows: Vec<Enterprise>) -> Vec<Enterprise> {
    let mut by_id: HashMap<Uuid, Enterprise> = rows.into_iter().map(|e| (e.id, e)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Attach distanceKm when the query has an origin
pub fn to_hits(rows: Vec<Enterprise>, origin: Option<(f64, f64)>) -> Vec<SearchHit> {
    rows.into_iter()
        .map(|enterprise| {
            let distance_km = match (origin, enterprise.latitude, enterprise.longitude) {
                (Some((lat, lng)), Some(e_lat), Some(e_lng)) => {
                    let km = geo::distance_km(geo::point(lat, lng), geo::point(e_lat, e_lng));
                    Some((km * 100.0).round() / 100.0)
                }
                _ => None,
            };
            SearchHit {
                enterprise,
                distance_km,
            }
        })
        .collect()
}

fn validate_query(query: &SearchEnterprisesQuery) -> Result<(), DirectoryError> {
    match (query.lat, query.lng) {
        (Some(lat), Some(lng)) if !geo::valid_coordinates(lat, lng) => {
            return Err(DirectoryError::InvalidInput(
                "lat must be within -90..90 and lng within -180..180".to_string(),
            ))
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(DirectoryError::InvalidInput(
                "lat and lng must be provided together".to_string(),
            ))
        }
        _ => {}
    }

    if let Some(radius) = query.radius {
        if radius <= 0.0 {
            return Err(DirectoryError::InvalidInput("radius must be positive".to_string()));
        }
    }
    if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
        if min > max {
            return Err(DirectoryError::InvalidInput(
                "minPrice cannot exceed maxPrice".to_string(),
            ));
        }
    }
    Ok(())
}

pub struct SearchService;

impl SearchService {
    /// GET /search/enterprises
    pub async fn search(
        pool: &PgPool,
        index: &SearchIndex,
        query: &SearchEnterprisesQuery,
    ) -> Result<SearchResponse, DirectoryError> {
        validate_query(query)?;
        let pagination = Pagination::new(query.page, query.limit);

        if let Some(client) = index.client() {
            match client.search(query, pagination.limit, pagination.offset()).await {
                Ok((ids, total)) => {
                    let rows = EnterpriseRepository::list_active_by_ids(pool, &ids).await?;
                    return Ok(SearchResponse {
                        data: to_hits(order_by_ids(&ids, rows), query.origin()),
                        meta: PageMeta::new(total, pagination),
                        engine: SearchEngine::Meilisearch,
                    });
                }
                Err(e) => log::warn!("Search index unavailable, using SQL fallback: {}", e),
            }
        }

        let (rows, total) = EnterpriseRepository::search(pool, query, pagination).await?;
        Ok(SearchResponse {
            data: to_hits(rows, query.origin()),
            meta: PageMeta::new(total, pagination),
            engine: SearchEngine::Sql,
        })
    }

    pub async fn popular(pool: &PgPool) -> Result<Vec<Enterprise>, DirectoryError> {
        EnterpriseRepository::popular(pool, POPULAR_LIMIT).await
    }

    pub async fn featured(pool: &PgPool) -> Result<Vec<Enterprise>, DirectoryError> {
        EnterpriseRepository::featured(pool, FEATURED_LIMIT).await
    }

    async fn document(
        pool: &PgPool,
        enterprise: &Enterprise,
    ) -> Result<EnterpriseDocument, DirectoryError> {
        let city = match enterprise.city_id {
            Some(city_id) => TaxonomyRepository::find_by_id(pool, TaxonomyKind::City, city_id).await?,
            None => None,
        };
        let categories = EnterpriseRepository::categories_for(pool, enterprise.id).await?;
        Ok(EnterpriseDocument::build(enterprise, city.as_ref(), &categories))
    }

    /// Push an enterprise to the index, or drop it when it is no longer listed
    /// DOCUMENTATION: Best-effort; failures are logged and never surface to the caller
    pub async fn index_enterprise(pool: &PgPool, index: &SearchIndex, enterprise: &Enterprise) {
        let Some(client) = index.client() else {
            return;
        };

        if enterprise.status != EnterpriseStatus::Active || enterprise.deleted_at.is_some() {
            Self::remove_enterprise(index, enterprise.id).await;
            return;
        }

        let result = match Self::document(pool, enterprise).await {
            Ok(doc) => client.index_documents(&[doc]).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::warn!("Failed to index enterprise {}: {}", enterprise.id, e);
        }
    }

    pub async fn remove_enterprise(index: &SearchIndex, enterprise_id: Uuid) {
        if let Some(client) = index.client() {
            if let Err(e) = client.delete_document(enterprise_id).await {
                log::warn!("Failed to remove enterprise {} from index: {}", enterprise_id, e);
            }
        }
    }

    /// Rebuild the index from every active enterprise
    pub async fn reindex_all(
        pool: &PgPool,
        index: &SearchIndex,
    ) -> Result<ReindexResponse, DirectoryError> {
        let client = index.client().ok_or(DirectoryError::ServiceUnavailable)?;
        client.configure_index().await?;

        let enterprises = EnterpriseRepository::list_all_active(pool).await?;
        let mut indexed = 0;

        for batch in enterprises.chunks(REINDEX_BATCH) {
            let mut documents = Vec::with_capacity(batch.len());
            for enterprise in batch {
                documents.push(Self::document(pool, enterprise).await?);
            }
            client.index_documents(&documents).await?;
            indexed += documents.len();
        }

        log::info!("Reindexed {} enterprises", indexed);
        Ok(ReindexResponse { indexed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_order_by_ids_preserves_ranking() {
        let a = test_support::enterprise(None);
        let b = test_support::enterprise(None);
        let c = test_support::enterprise(None);
        let ids = vec![c.id, Uuid::new_v4(), a.id, b.id];

        let ordered = order_by_ids(&ids, vec![a.clone(), b.clone(), c.clone()]);
        let got: Vec<Uuid> = ordered.iter().map(|e| e.id).collect();
        assert_eq!(got, vec![c.id, a.id, b.id]);
    }

    #[test]
    fn test_distance_only_with_origin() {
        let mut far = test_support::enterprise(None);
        far.latitude = Some(35.1796);
        far.longitude = Some(129.0756);
        let mut unplaced = test_support::enterprise(None);
        unplaced.latitude = None;

        let hits = to_hits(vec![far.clone(), unplaced], Some((37.5665, 126.978)));
        let busan = hits[0].distance_km.unwrap();
        assert!(busan > 320.0 && busan < 330.0, "Seoul-Busan was {}", busan);
        assert!(hits[1].distance_km.is_none());

        let hits = to_hits(vec![far], None);
        assert!(hits[0].distance_km.is_none());
    }

    #[test]
    fn test_query_validation() {
        let ok = SearchEnterprisesQuery {
            lat: Some(37.5),
            lng: Some(127.0),
            radius: Some(3.0),
            ..Default::default()
        };
        assert!(validate_query(&ok).is_ok());

        let half = SearchEnterprisesQuery {
            lat: Some(37.5),
            ..Default::default()
        };
        assert!(validate_query(&half).is_err());

        let out_of_range = SearchEnterprisesQuery {
            lat: Some(91.0),
            lng: Some(127.0),
            ..Default::default()
        };
        assert!(validate_query(&out_of_range).is_err());

        let inverted = SearchEnterprisesQuery {
            min_price: Some(4),
            max_price: Some(2),
            ..Default::default()
        };
        assert!(validate_query(&inverted).is_err());
    }

    #[actix_web::test]
    async fn test_reindex_requires_index() {
        let pool = test_support::lazy_pool();
        let err = SearchService::reindex_all(&pool, &SearchIndex::disabled())
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::ServiceUnavailable));
    }
}
