// src/models/taxonomy.rs
// DOCUMENTATION: Categories and cities
// PURPOSE: Both are slugged lookup tables with the same shape and API surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Which lookup table a taxonomy operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Category,
    City,
}

impl TaxonomyKind {
    pub fn table(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "categories",
            TaxonomyKind::City => "cities",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaxonomyKind::Category => "Category",
            TaxonomyKind::City => "City",
        }
    }
}

/// A category or city row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Taxon {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub type Category = Taxon;
pub type City = Taxon;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTaxonRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaxonRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 120))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListTaxaQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
