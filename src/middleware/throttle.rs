// src/middleware/throttle.rs
// DOCUMENTATION: Global per-IP request throttle
// PURPOSE: In-process token bucket per client IP, ahead of every route

use crate::errors::DirectoryError;
use crate::middleware::ClientInfo;
use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::time::Duration;

/// Keyed GCRA limiter shared by all workers
pub struct IpThrottle {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl IpThrottle {
    pub fn new(per_second: u32, burst: u32) -> Self {
        let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(burst).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    pub fn check(&self, ip: &str) -> bool {
        self.limiter.check_key(&ip.to_string()).is_ok()
    }

    /// Drop state for clients that have fully replenished
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// `middleware::from_fn` entry point
pub async fn throttle(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if let Some(throttle) = req.app_data::<web::Data<IpThrottle>>() {
        let client = ClientInfo::from_http(req.request());
        if !throttle.check(client.ip_or_unknown()) {
            log::warn!("Throttled {} {}", client.ip_or_unknown(), req.path());
            return Err(DirectoryError::RateLimitExceeded.into());
        }
    }
    next.call(req).await
}

/// Periodically forget idle clients
pub fn start_prune_task(throttle: web::Data<IpThrottle>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            throttle.prune();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, middleware::from_fn, test as actix_test, App, HttpResponse};

    #[test]
    fn test_burst_then_reject() {
        let throttle = IpThrottle::new(1, 3);
        assert!(throttle.check("10.0.0.1"));
        assert!(throttle.check("10.0.0.1"));
        assert!(throttle.check("10.0.0.1"));
        assert!(!throttle.check("10.0.0.1"));

        // Separate bucket per IP
        assert!(throttle.check("10.0.0.2"));
    }

    #[actix_web::test]
    async fn test_middleware_returns_429() {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(IpThrottle::new(1, 1)))
                .wrap(from_fn(throttle))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_request();
        assert_eq!(actix_test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = actix_test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .to_request();
        let resp = actix_test::try_call_service(&app, req).await;
        let status = match resp {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }
}
