// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use thiserror::Error;

/// Postgres SQLSTATE for unique_violation
const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for foreign_key_violation
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Server error messages are replaced with a generic one in production
static HIDE_SERVER_ERRORS: Lazy<bool> = Lazy::new(|| {
    std::env::var("ENVIRONMENT")
        .map(|env| env.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
});

/// Application-specific error types
/// DOCUMENTATION: Comprehensive error enum for all possible failures
/// Each variant maps to appropriate HTTP status code and error response
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Referenced resource does not exist")]
    InvalidReference(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Too many requests")]
    RateLimitExceeded,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
}

impl DirectoryError {
    /// Classify a sqlx failure and log it with the caller's context
    /// DOCUMENTATION: Unique and foreign-key violations become client errors,
    /// everything else is a database error
    pub fn database(context: &str, err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return DirectoryError::NotFound(context.to_string());
        }

        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => {
                    log::warn!("{}: unique violation ({})", context, db_err.message());
                    return DirectoryError::DuplicateEntry(
                        db_err
                            .constraint()
                            .unwrap_or("resource already exists")
                            .to_string(),
                    );
                }
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    log::warn!("{}: foreign key violation ({})", context, db_err.message());
                    return DirectoryError::InvalidReference(
                        db_err.constraint().unwrap_or_default().to_string(),
                    );
                }
                _ => {}
            }
        }

        log::error!("{}: {}", context, err);
        DirectoryError::DatabaseError(err.to_string())
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::NotFound(_) => "NOT_FOUND",
            DirectoryError::Conflict(_) => "CONFLICT",
            DirectoryError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            DirectoryError::InvalidReference(_) => "INVALID_REFERENCE",
            DirectoryError::DatabaseError(_) => "DATABASE_ERROR",
            DirectoryError::InvalidInput(_) => "BAD_REQUEST",
            DirectoryError::Validation(_) => "VALIDATION_ERROR",
            DirectoryError::Unauthorized(_) => "UNAUTHORIZED",
            DirectoryError::Forbidden(_) => "FORBIDDEN",
            DirectoryError::RateLimitExceeded => "TOO_MANY_REQUESTS",
            DirectoryError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            DirectoryError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
            DirectoryError::InternalError(_) => "INTERNAL_ERROR",
            DirectoryError::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            DirectoryError::Validation(errors) => serde_json::to_value(errors).ok(),
            DirectoryError::DuplicateEntry(constraint)
            | DirectoryError::InvalidReference(constraint)
                if !constraint.is_empty() =>
            {
                Some(json!({ "constraint": constraint }))
            }
            _ => None,
        }
    }

    fn public_message(&self) -> String {
        if self.status_code().is_server_error() && *HIDE_SERVER_ERRORS {
            return "Internal server error".to_string();
        }
        self.to_string()
    }
}

/// Convert DirectoryError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for DirectoryError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("{} {}: {}", status.as_u16(), self.error_code(), self);
        } else {
            log::warn!("{} {}: {}", status.as_u16(), self.error_code(), self);
        }

        let mut error = json!({
            "code": self.error_code(),
            "message": self.public_message(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        HttpResponse::build(status).json(json!({
            "success": false,
            "error": error
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
            DirectoryError::Conflict(_) => StatusCode::CONFLICT,
            DirectoryError::DuplicateEntry(_) => StatusCode::CONFLICT,
            DirectoryError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            DirectoryError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DirectoryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
            DirectoryError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DirectoryError::Forbidden(_) => StatusCode::FORBIDDEN,
            DirectoryError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            DirectoryError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            DirectoryError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
            DirectoryError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DirectoryError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Maps JSON body extraction failures onto the error envelope
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    use actix_web::error::JsonPayloadError;

    match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            DirectoryError::PayloadTooLarge.into()
        }
        other => DirectoryError::InvalidInput(other.to_string()).into(),
    }
}

/// Maps query-string extraction failures onto the error envelope
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    DirectoryError::InvalidInput(err.to_string()).into()
}

/// Maps path extraction failures (e.g. malformed UUIDs) onto the error envelope
pub fn path_error_handler(
    err: actix_web::error::PathError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    DirectoryError::InvalidInput(err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DirectoryError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DirectoryError::DuplicateEntry("users_email_key".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            DirectoryError::InvalidReference(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DirectoryError::RateLimitExceeded.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            DirectoryError::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            DirectoryError::Unauthorized("no".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DirectoryError::database("Enterprise not found", sqlx::Error::RowNotFound);
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let resp = DirectoryError::Forbidden("Not your enterprise".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "FORBIDDEN");
        assert_eq!(value["error"]["message"], "Not your enterprise");
        assert!(value["error"]["timestamp"].is_string());
        assert!(value["error"].get("details").is_none());
    }

    #[actix_web::test]
    async fn test_duplicate_entry_details() {
        let resp = DirectoryError::DuplicateEntry("users_email_key".into()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"]["code"], "DUPLICATE_ENTRY");
        assert_eq!(value["error"]["details"]["constraint"], "users_email_key");
    }
}
