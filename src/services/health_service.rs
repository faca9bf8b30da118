// src/services/health_service.rs
// DOCUMENTATION: Dependency health checks
// PURPOSE: Probe Postgres, Redis and Meilisearch with response times

use crate::services::search_index::SearchIndex;
use crate::services::KvStore;
use serde::Serialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};

const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Up,
    Down,
    /// Optional dependency that is not configured
    Disabled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCheck {
    pub status: CheckStatus,
    pub response_time_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyCheck {
    fn disabled() -> Self {
        Self {
            status: CheckStatus::Disabled,
            response_time_ms: 0,
            error: None,
        }
    }

    fn from_result(result: Result<(), String>, started: Instant) -> Self {
        let response_time_ms = started.elapsed().as_millis();
        match result {
            Ok(()) => Self {
                status: CheckStatus::Up,
                response_time_ms,
                error: None,
            },
            Err(e) => Self {
                status: CheckStatus::Down,
                response_time_ms,
                error: Some(e),
            },
        }
    }

    fn is_down(&self) -> bool {
        self.status == CheckStatus::Down
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: DependencyCheck,
    pub redis: DependencyCheck,
    pub meilisearch: DependencyCheck,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

/// "ok" unless a configured dependency is down
pub fn overall_status(checks: &HealthChecks) -> &'static str {
    if checks.database.is_down() || checks.redis.is_down() || checks.meilisearch.is_down() {
        "degraded"
    } else {
        "ok"
    }
}

async fn timed<F>(check: F) -> Result<(), String>
where
    F: std::future::Future<Output = Result<(), String>>,
{
    match tokio::time::timeout(CHECK_TIMEOUT, check).await {
        Ok(result) => result,
        Err(_) => Err(format!("timed out after {}s", CHECK_TIMEOUT.as_secs())),
    }
}

pub struct HealthService;

impl HealthService {
    pub async fn check_database(pool: &PgPool) -> DependencyCheck {
        let started = Instant::now();
        let result = timed(async {
            sqlx::query("SELECT 1")
                .execute(pool)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await;
        DependencyCheck::from_result(result, started)
    }

    pub async fn check_redis(store: &KvStore) -> DependencyCheck {
        if !store.uses_redis() {
            return DependencyCheck::disabled();
        }
        let started = Instant::now();
        let result = timed(async {
            match store.ping().await {
                Ok(true) => Ok(()),
                Ok(false) => Err("unexpected PING reply".to_string()),
                Err(e) => Err(e),
            }
        })
        .await;
        DependencyCheck::from_result(result, started)
    }

    pub async fn check_search(index: &SearchIndex) -> DependencyCheck {
        let Some(client) = index.client() else {
            return DependencyCheck::disabled();
        };
        let started = Instant::now();
        let result = timed(async { client.health().await.map_err(|e| e.to_string()) }).await;
        DependencyCheck::from_result(result, started)
    }

    pub async fn report(
        pool: &PgPool,
        store: &KvStore,
        index: &SearchIndex,
        started_at: Instant,
    ) -> HealthReport {
        let (database, redis, meilisearch) = tokio::join!(
            Self::check_database(pool),
            Self::check_redis(store),
            Self::check_search(index)
        );
        let checks = HealthChecks {
            database,
            redis,
            meilisearch,
        };

        if checks.database.is_down() {
            log::warn!("Health check: database is down");
        }

        HealthReport {
            status: overall_status(&checks),
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: started_at.elapsed().as_secs(),
            checks,
        }
    }

    /// Ready when the database answers
    pub async fn is_ready(pool: &PgPool) -> bool {
        !Self::check_database(pool).await.is_down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up() -> DependencyCheck {
        DependencyCheck::from_result(Ok(()), Instant::now())
    }

    #[test]
    fn test_overall_status() {
        let mut checks = HealthChecks {
            database: up(),
            redis: DependencyCheck::disabled(),
            meilisearch: DependencyCheck::disabled(),
        };
        assert_eq!(overall_status(&checks), "ok");

        checks.redis = DependencyCheck::from_result(Err("refused".to_string()), Instant::now());
        assert_eq!(overall_status(&checks), "degraded");
    }

    #[tokio::test]
    async fn test_optional_dependencies_disabled() {
        let redis = HealthService::check_redis(&KvStore::in_memory()).await;
        assert_eq!(redis.status, CheckStatus::Disabled);

        let search = HealthService::check_search(&SearchIndex::disabled()).await;
        assert_eq!(search.status, CheckStatus::Disabled);
    }

    #[tokio::test]
    async fn test_unreachable_database_is_down() {
        let check = HealthService::check_database(&crate::test_support::lazy_pool()).await;
        assert_eq!(check.status, CheckStatus::Down);
        assert!(check.error.is_some());
    }
}
