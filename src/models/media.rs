// src/models/media.rs
// DOCUMENTATION: Enterprise media metadata
// PURPOSE: Rows describing objects stored in S3-compatible storage plus upload DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// 10 MiB upload ceiling
pub const MAX_MEDIA_BYTES: i64 = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "media_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Logo,
    Gallery,
}

impl MediaKind {
    /// Path segment used in storage keys
    pub fn key_segment(&self) -> &'static str {
        match self {
            MediaKind::Logo => "logo",
            MediaKind::Gallery => "gallery",
        }
    }
}

/// Media row from the database
#[derive(Debug, Clone, FromRow)]
pub struct EnterpriseMedia {
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub kind: MediaKind,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Media response DTO exposed via API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub id: Uuid,
    pub kind: MediaKind,
    pub key: String,
    pub url: String,
    pub content_type: Option<String>,
    pub bytes: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl EnterpriseMedia {
    /// Convert database row into API response with its public URL
    pub fn to_response(&self, base_url: &str, bucket: &str) -> MediaResponse {
        MediaResponse {
            id: self.id,
            kind: self.kind,
            key: self.storage_key.clone(),
            url: format!("{}/{}/{}", base_url, bucket, self.storage_key),
            content_type: self.content_type.clone(),
            bytes: self.bytes,
            width: self.width,
            height: self.height,
            sort_order: self.sort_order,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    /// Extension hint, e.g. "png"; falls back to the file name's extension
    pub file_type: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub content_type: String,

    #[validate(range(min = 1))]
    pub file_size: i64,

    pub media_type: MediaKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    pub key: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMediaRequest {
    pub media_type: MediaKind,

    #[validate(length(min = 1, max = 512))]
    pub key: String,

    #[validate(length(max = 100))]
    pub content_type: Option<String>,

    #[validate(range(min = 1))]
    pub file_size: Option<i64>,

    #[validate(range(min = 1))]
    pub width: Option<i32>,

    #[validate(range(min = 1))]
    pub height: Option<i32>,

    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_url() {
        let media = EnterpriseMedia {
            id: Uuid::new_v4(),
            enterprise_id: Uuid::new_v4(),
            kind: MediaKind::Gallery,
            storage_key: "enterprises/abc/gallery/1.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: Some(1024),
            width: None,
            height: None,
            sort_order: 0,
            created_at: Utc::now(),
            deleted_at: None,
        };

        let resp = media.to_response("https://cdn.example.kr", "media");
        assert_eq!(
            resp.url,
            "https://cdn.example.kr/media/enterprises/abc/gallery/1.png"
        );
    }
}
