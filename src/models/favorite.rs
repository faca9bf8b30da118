// src/models/favorite.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Enterprise;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub enterprise_id: Uuid,
}

/// Favorite with the enterprise it points to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub enterprise_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub enterprise: Enterprise,
}
