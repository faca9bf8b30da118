// src/models/search.rs
// DOCUMENTATION: Search query parameters and result envelopes
// PURPOSE: Shared between the Meilisearch client and the SQL fallback

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Enterprise, PageMeta};

/// Sortable columns for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchSortBy {
    Rating,
    Name,
    CreatedAt,
    UpdatedAt,
}

impl SearchSortBy {
    pub fn column(&self) -> &'static str {
        match self {
            SearchSortBy::Rating => "e.rating_avg",
            SearchSortBy::Name => "e.name",
            SearchSortBy::CreatedAt => "e.created_at",
            SearchSortBy::UpdatedAt => "e.updated_at",
        }
    }

    /// Sortable attribute name in the search index
    pub fn index_attribute(&self) -> &'static str {
        match self {
            SearchSortBy::Rating => "ratingAvg",
            SearchSortBy::Name => "name",
            SearchSortBy::CreatedAt => "createdAt",
            SearchSortBy::UpdatedAt => "updatedAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn index(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query parameters for GET /search/enterprises
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnterprisesQuery {
    pub q: Option<String>,
    pub query: Option<String>,
    pub category_id: Option<Uuid>,
    /// Category name, whole and case-insensitive
    pub category: Option<String>,
    pub city_id: Option<Uuid>,
    /// City name, whole and case-insensitive
    pub city: Option<String>,
    pub price_range: Option<i16>,
    pub min_price: Option<i16>,
    pub max_price: Option<i16>,
    pub verified: Option<bool>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Kilometers
    pub radius: Option<f64>,
    pub sort_by: Option<SearchSortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchEnterprisesQuery {
    /// Free-text term from either `q` or `query`
    pub fn text(&self) -> Option<&str> {
        self.q
            .as_deref()
            .or(self.query.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn origin(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Single search hit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub enterprise: Enterprise,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Meilisearch,
    Sql,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub data: Vec<SearchHit>,
    pub meta: PageMeta,
    pub engine: SearchEngine,
}

/// Result of POST /admin/search/reindex
#[derive(Debug, Serialize)]
pub struct ReindexResponse {
    pub indexed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_prefers_q() {
        let query = SearchEnterprisesQuery {
            q: Some("  bibimbap ".to_string()),
            query: Some("ignored".to_string()),
            ..Default::default()
        };
        assert_eq!(query.text(), Some("bibimbap"));

        let query = SearchEnterprisesQuery {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.text(), None);
    }

    #[test]
    fn test_sort_parsing() {
        let query: SearchEnterprisesQuery =
            serde_json::from_value(serde_json::json!({"sortBy": "createdAt", "sortOrder": "ASC"}))
                .unwrap();
        assert_eq!(query.sort_by, Some(SearchSortBy::CreatedAt));
        assert_eq!(query.sort_order.unwrap_or_default().sql(), "ASC");
    }
}
