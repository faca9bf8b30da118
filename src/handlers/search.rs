// src/handlers/search.rs
// DOCUMENTATION: Public search endpoints
// PURPOSE: Full-text search with SQL fallback, popular and featured shelves

use crate::errors::DirectoryError;
use crate::middleware::ClientInfo;
use crate::models::SearchEnterprisesQuery;
use crate::services::{IpAction, RateLimiter, SearchIndex, SearchService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /search/enterprises
pub async fn search_enterprises(
    pool: web::Data<PgPool>,
    index: web::Data<SearchIndex>,
    limiter: web::Data<RateLimiter>,
    client: ClientInfo,
    query: web::Query<SearchEnterprisesQuery>,
) -> Result<impl Responder, DirectoryError> {
    limiter
        .check_ip(client.ip_or_unknown(), IpAction::Search)
        .await?;

    let response = SearchService::search(&pool, &index, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /search/popular
pub async fn popular(pool: web::Data<PgPool>) -> Result<impl Responder, DirectoryError> {
    let enterprises = SearchService::popular(&pool).await?;
    Ok(HttpResponse::Ok().json(enterprises))
}

/// GET /search/featured
pub async fn featured(pool: web::Data<PgPool>) -> Result<impl Responder, DirectoryError> {
    let enterprises = SearchService::featured(&pool).await?;
    Ok(HttpResponse::Ok().json(enterprises))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/search")
            .route("/enterprises", web::get().to(search_enterprises))
            .route("/popular", web::get().to(popular))
            .route("/featured", web::get().to(featured)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::KvStore;
    use crate::test_support;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_search_limited_per_ip() {
        let limiter = RateLimiter::new(KvStore::in_memory());
        for _ in 0..100 {
            limiter
                .check_ip("203.0.113.50", IpAction::Search)
                .await
                .unwrap();
        }

        let app = test::init_service(
            App::new()
                .configure(test_support::guard_state)
                .app_data(web::Data::new(limiter))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/search/enterprises?q=coffee")
            .insert_header(("X-Forwarded-For", "203.0.113.50"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        // Another client still reaches the search backend
        let req = test::TestRequest::get()
            .uri("/search/enterprises?q=coffee")
            .insert_header(("X-Forwarded-For", "198.51.100.7"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_ne!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
