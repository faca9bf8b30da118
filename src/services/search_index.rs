// src/services/search_index.rs
// DOCUMENTATION: Meilisearch HTTP client for the enterprise index
// PURPOSE: Keep a full-text/geo index of active enterprises; optional at runtime

use crate::config::Config;
use crate::errors::DirectoryError;
use crate::models::{Enterprise, SearchEnterprisesQuery, Taxon};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

pub const INDEX_UID: &str = "enterprises";

/// Geo point in Meilisearch's reserved `_geo` attribute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Document stored in the index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnterpriseDocument {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub verified: bool,
    pub rating_avg: f64,
    pub rating_count: i32,
    pub price_range: Option<i16>,
    pub city_id: Option<Uuid>,
    pub city_name: Option<String>,
    pub category_ids: Vec<Uuid>,
    pub category_names: Vec<String>,
    /// Unix seconds
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(rename = "_geo", skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl EnterpriseDocument {
    pub fn build(enterprise: &Enterprise, city: Option<&Taxon>, categories: &[Taxon]) -> Self {
        let geo = match (enterprise.latitude, enterprise.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        };

        EnterpriseDocument {
            id: enterprise.id,
            slug: enterprise.slug.clone(),
            name: enterprise.name.clone(),
            short_description: enterprise.short_description.clone(),
            description: enterprise.description.clone(),
            verified: enterprise.verified,
            rating_avg: enterprise.rating_avg,
            rating_count: enterprise.rating_count,
            price_range: enterprise.price_range,
            city_id: enterprise.city_id,
            city_name: city.map(|c| c.name.clone()),
            category_ids: categories.iter().map(|c| c.id).collect(),
            category_names: categories.iter().map(|c| c.name.clone()).collect(),
            created_at: enterprise.created_at.timestamp(),
            updated_at: enterprise.updated_at.timestamp(),
            geo,
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Translate query parameters into Meilisearch filter expressions (ANDed)
pub fn build_filters(query: &SearchEnterprisesQuery) -> Vec<String> {
    let mut filters = Vec::new();

    if let Some(id) = query.category_id {
        filters.push(format!("categoryIds = {}", quote(&id.to_string())));
    }
    if let Some(name) = query.category.as_deref().filter(|s| !s.trim().is_empty()) {
        filters.push(format!("categoryNames = {}", quote(name.trim())));
    }
    if let Some(id) = query.city_id {
        filters.push(format!("cityId = {}", quote(&id.to_string())));
    }
    if let Some(name) = query.city.as_deref().filter(|s| !s.trim().is_empty()) {
        filters.push(format!("cityName = {}", quote(name.trim())));
    }
    if let Some(price) = query.price_range {
        filters.push(format!("priceRange = {}", price));
    }
    if let Some(min) = query.min_price {
        filters.push(format!("priceRange >= {}", min));
    }
    if let Some(max) = query.max_price {
        filters.push(format!("priceRange <= {}", max));
    }
    if let Some(verified) = query.verified {
        filters.push(format!("verified = {}", verified));
    }
    if let (Some((lat, lng)), Some(radius)) = (query.origin(), query.radius) {
        filters.push(format!(
            "_geoRadius({}, {}, {})",
            lat,
            lng,
            (radius * 1000.0).round() as i64
        ));
    }

    filters
}

/// Sort expressions for the query
pub fn build_sort(query: &SearchEnterprisesQuery) -> Vec<String> {
    match (query.sort_by, query.origin()) {
        (Some(sort_by), _) => vec![format!(
            "{}:{}",
            sort_by.index_attribute(),
            query.sort_order.unwrap_or_default().index()
        )],
        (None, Some((lat, lng))) => vec![format!("_geoPoint({}, {}):asc", lat, lng)],
        (None, None) if query.text().is_none() => {
            vec!["verified:desc".to_string(), "ratingAvg:desc".to_string()]
        }
        (None, None) => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct SearchHitId {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    hits: Vec<SearchHitId>,
    estimated_total_hits: Option<i64>,
    total_hits: Option<i64>,
}

/// Meilisearch client
pub struct MeiliClient {
    client: Client,
    host: String,
    api_key: Option<String>,
}

impl MeiliClient {
    pub fn new(host: &str, api_key: Option<String>) -> Result<Self, DirectoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DirectoryError::InternalError(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.host, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn check(response: Result<Response, reqwest::Error>, action: &str) -> Result<Response, DirectoryError> {
        let response = response.map_err(|e| {
            log::error!("Meilisearch {} request failed: {}", action, e);
            DirectoryError::ExternalServiceError(format!("Search request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Meilisearch {} error {}: {}", action, status, body);
            return Err(DirectoryError::ExternalServiceError(format!(
                "Search error {}: {}",
                status, body
            )));
        }
        Ok(response)
    }

    /// Create the index and set searchable/filterable/sortable attributes
    pub async fn configure_index(&self) -> Result<(), DirectoryError> {
        // Index may already exist; Meilisearch answers with an async task either way
        let _ = self
            .request(reqwest::Method::POST, "/indexes")
            .json(&json!({ "uid": INDEX_UID, "primaryKey": "id" }))
            .send()
            .await;

        let settings = json!({
            "searchableAttributes": ["name", "shortDescription", "description", "categoryNames", "cityName"],
            "filterableAttributes": ["categoryIds", "categoryNames", "cityId", "cityName", "priceRange", "verified", "_geo"],
            "sortableAttributes": ["ratingAvg", "name", "createdAt", "updatedAt", "verified", "_geo"]
        });
        let response = self
            .request(reqwest::Method::PATCH, &format!("/indexes/{}/settings", INDEX_UID))
            .json(&settings)
            .send()
            .await;
        Self::check(response, "settings").await?;

        log::info!("Search index '{}' configured", INDEX_UID);
        Ok(())
    }

    pub async fn index_documents(&self, documents: &[EnterpriseDocument]) -> Result<(), DirectoryError> {
        if documents.is_empty() {
            return Ok(());
        }
        let response = self
            .request(reqwest::Method::POST, &format!("/indexes/{}/documents", INDEX_UID))
            .json(documents)
            .send()
            .await;
        Self::check(response, "index").await?;

        log::debug!("Queued {} documents for indexing", documents.len());
        Ok(())
    }

    pub async fn delete_document(&self, id: Uuid) -> Result<(), DirectoryError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/indexes/{}/documents/{}", INDEX_UID, id),
            )
            .send()
            .await;
        Self::check(response, "delete").await?;
        Ok(())
    }

    /// Matching IDs in ranking order plus the estimated total
    pub async fn search(
        &self,
        query: &SearchEnterprisesQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Uuid>, i64), DirectoryError> {
        let body = json!({
            "q": query.text().unwrap_or_default(),
            "filter": build_filters(query),
            "sort": build_sort(query),
            "limit": limit,
            "offset": offset,
            "attributesToRetrieve": ["id"]
        });

        let response = self
            .request(reqwest::Method::POST, &format!("/indexes/{}/search", INDEX_UID))
            .json(&body)
            .send()
            .await;
        let response = Self::check(response, "search").await?;

        let result: SearchResult = response.json().await.map_err(|e| {
            log::error!("Failed to parse Meilisearch response: {}", e);
            DirectoryError::ExternalServiceError(format!("Parse error: {}", e))
        })?;

        let total = result
            .total_hits
            .or(result.estimated_total_hits)
            .unwrap_or(result.hits.len() as i64);
        Ok((result.hits.into_iter().map(|h| h.id).collect(), total))
    }

    pub async fn health(&self) -> Result<(), DirectoryError> {
        let response = self.request(reqwest::Method::GET, "/health").send().await;
        Self::check(response, "health").await?;
        Ok(())
    }
}

/// Optional search index shared through web::Data
/// DOCUMENTATION: Every operation is a no-op (or None) when MEILISEARCH_HOST is unset
pub struct SearchIndex {
    client: Option<MeiliClient>,
}

impl SearchIndex {
    pub fn new(config: &Config) -> Self {
        let client = config.meilisearch_host.as_deref().and_then(|host| {
            MeiliClient::new(host, config.meilisearch_api_key.clone())
                .map_err(|e| log::error!("Search index disabled: {}", e))
                .ok()
        });
        if client.is_none() {
            log::warn!("MEILISEARCH_HOST not set, search uses the SQL fallback");
        }
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn client(&self) -> Option<&MeiliClient> {
        self.client.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchSortBy, SortOrder};

    #[test]
    fn test_build_filters() {
        let city_id = Uuid::new_v4();
        let query = SearchEnterprisesQuery {
            city_id: Some(city_id),
            category: Some("Cafe \"Bar\"".to_string()),
            min_price: Some(2),
            verified: Some(true),
            lat: Some(37.5),
            lng: Some(127.0),
            radius: Some(2.5),
            ..Default::default()
        };

        let filters = build_filters(&query);
        assert!(filters.contains(&format!("cityId = \"{}\"", city_id)));
        assert!(filters.contains(&"categoryNames = \"Cafe \\\"Bar\\\"\"".to_string()));
        assert!(filters.contains(&"priceRange >= 2".to_string()));
        assert!(filters.contains(&"verified = true".to_string()));
        assert!(filters.contains(&"_geoRadius(37.5, 127, 2500)".to_string()));
    }

    #[test]
    fn test_build_sort() {
        let mut query = SearchEnterprisesQuery::default();
        assert_eq!(build_sort(&query), vec!["verified:desc", "ratingAvg:desc"]);

        query.q = Some("bibimbap".to_string());
        assert!(build_sort(&query).is_empty());

        query.sort_by = Some(SearchSortBy::Name);
        query.sort_order = Some(SortOrder::Asc);
        assert_eq!(build_sort(&query), vec!["name:asc"]);
    }

    #[test]
    fn test_disabled_index() {
        let index = SearchIndex::new(&Config::for_tests());
        assert!(!index.is_configured());
        assert!(SearchIndex::disabled().client().is_none());
    }
}
