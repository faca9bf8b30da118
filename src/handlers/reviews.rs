// src/handlers/reviews.rs
// DOCUMENTATION: Public review endpoints
// PURPOSE: Submission (signed-in or anonymous) and published listings

use crate::errors::DirectoryError;
use crate::middleware::{ClientInfo, OptionalAuthUser};
use crate::models::{CreateReviewRequest, ListReviewsQuery};
use crate::services::{RateLimiter, ReviewService, SearchIndex};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// POST /reviews
/// Signed-in authors publish immediately, anonymous ones go to moderation
pub async fn create_review(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    limiter: web::Data<RateLimiter>,
    auth: OptionalAuthUser,
    client: ClientInfo,
    req: web::Json<CreateReviewRequest>,
) -> Result<impl Responder, DirectoryError> {
    req.validate()?;
    let author = auth.0.as_ref().map(|a| &a.user);
    let review = ReviewService::create(&pool, &index, &limiter, author, &client, &req).await?;
    Ok(HttpResponse::Created().json(review))
}

/// GET /reviews
pub async fn list_reviews(
    pool: web::Data<PgPool>,
    query: web::Query<ListReviewsQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = ReviewService::list_public(&pool, &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /reviews/enterprise/{enterpriseId}
pub async fn list_enterprise_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    query: web::Query<ListReviewsQuery>,
) -> Result<impl Responder, DirectoryError> {
    let page = ReviewService::list_for_enterprise(&pool, path.into_inner(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .route("", web::post().to(create_review))
            .route("", web::get().to(list_reviews))
            .route("/enterprise/{enterprise_id}", web::get().to(list_enterprise_reviews)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_rating_out_of_range() {
        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .configure(config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/reviews")
            .set_json(json!({
                "enterpriseId": Uuid::new_v4(),
                "authorName": "Jisoo",
                "rating": 6
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
